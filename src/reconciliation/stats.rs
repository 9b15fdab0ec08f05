//! Summary figures of a reconciliation

use crate::types::*;

impl ReconciliationStats {
    /// Compute the figures from raw counts; 0% when there are no bank records
    pub fn compute(
        bank_record_count: usize,
        supplier_record_count: usize,
        matched_count: usize,
    ) -> Self {
        let match_percentage = if bank_record_count == 0 {
            0.0
        } else {
            matched_count as f64 / bank_record_count as f64 * 100.0
        };

        Self {
            bank_record_count,
            supplier_record_count,
            matched_count,
            unmatched_count: bank_record_count.saturating_sub(matched_count),
            match_percentage,
        }
    }

    /// Recompute the figures from annotated records, e.g. after manual overrides
    pub fn from_records(records: &[MatchedBankRecord], supplier_record_count: usize) -> Self {
        let matched = records.iter().filter(|record| record.is_matched()).count();
        Self::compute(records.len(), supplier_record_count, matched)
    }
}
