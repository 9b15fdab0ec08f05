//! Configuration for extraction and matching

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Options of the matching engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Largest magnitude difference still treated as the same amount (exclusive)
    pub amount_tolerance: BigDecimal,
    /// Also compare supplier dates against the posting (accounting) date
    pub use_accounting_date: bool,
    /// Reject nearest-date fallbacks further away than this many days
    pub max_date_distance_days: Option<i64>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            amount_tolerance: BigDecimal::from(1) / BigDecimal::from(100),
            use_accounting_date: true,
            max_date_distance_days: None,
        }
    }
}

/// Options shared by the statement and ledger extractors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionOptions {
    /// Description characters included in the dedup key
    pub description_key_chars: usize,
    /// Candidate texts up to this length are checked against the deny-list
    pub header_guard_chars: usize,
    /// Continuation lines buffered for one description before giving up
    pub max_continuation_lines: usize,
    /// Additional header/footer tokens to reject
    pub extra_deny_tokens: Vec<String>,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            description_key_chars: 20,
            header_guard_chars: 40,
            max_continuation_lines: 6,
            extra_deny_tokens: Vec::new(),
        }
    }
}

/// Complete configuration of a reconciliation session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconciliationConfig {
    pub matching: MatchOptions,
    pub extraction: ExtractionOptions,
}

impl ReconciliationConfig {
    /// Validate the configuration
    pub fn validate(&self) -> ReconciliationResult<()> {
        if self.matching.amount_tolerance < BigDecimal::from(0) {
            return Err(ReconciliationError::Configuration(
                "Amount tolerance cannot be negative".to_string(),
            ));
        }

        if let Some(days) = self.matching.max_date_distance_days {
            if days < 0 {
                return Err(ReconciliationError::Configuration(
                    "Maximum date distance cannot be negative".to_string(),
                ));
            }
        }

        if self.extraction.description_key_chars == 0 {
            return Err(ReconciliationError::Configuration(
                "Dedup key must keep at least one description character".to_string(),
            ));
        }

        Ok(())
    }
}
