//! Composite-key deduplication within one extraction pass

use std::collections::HashSet;

use crate::normalize::{fold_text, format_amount};
use crate::traits::DedupKey;
use crate::types::*;

/// Collapses records sharing a dedup key, keeping the first occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordDeduplicator {
    description_chars: usize,
}

impl RecordDeduplicator {
    /// Create a deduplicator keeping `description_chars` of free text in the key
    pub fn new(description_chars: usize) -> Self {
        Self { description_chars }
    }

    /// Remove duplicates, preserving input order
    pub fn dedup<T: DedupKey>(&self, records: Vec<T>) -> Vec<T> {
        let before = records.len();
        let mut seen = HashSet::with_capacity(before);
        let unique: Vec<T> = records
            .into_iter()
            .filter(|record| seen.insert(record.dedup_key(self.description_chars)))
            .collect();

        if unique.len() < before {
            tracing::debug!(
                removed = before - unique.len(),
                kept = unique.len(),
                "Collapsed duplicate records"
            );
        }
        unique
    }
}

impl Default for RecordDeduplicator {
    fn default() -> Self {
        Self::new(20)
    }
}

fn text_prefix(text: &str, chars: usize) -> String {
    fold_text(text).chars().take(chars).collect()
}

impl DedupKey for BankRecord {
    fn dedup_key(&self, description_chars: usize) -> String {
        format!(
            "{}|{}|{}|{}",
            self.posting_date_text(),
            self.value_date_text(),
            format_amount(&self.amount),
            text_prefix(&self.description, description_chars)
        )
    }
}

impl DedupKey for SupplierRecord {
    fn dedup_key(&self, description_chars: usize) -> String {
        format!(
            "{}|{}|{}|{}",
            self.date_text(),
            fold_text(&self.document_reference),
            format_amount(&self.amount),
            text_prefix(&self.name, description_chars)
        )
    }
}
