//! Matching of bank movements against supplier ledger entries
//!
//! The engine is a deterministic greedy assignment: bank records are visited
//! in input order and each one consumes at most one supplier record from a
//! shrinking pool. Ties between several candidates of the same amount are
//! broken by date, from the most to the least specific rule (see
//! [`MatchRule`](crate::MatchRule)).

pub mod engine;
pub mod overrides;
pub mod stats;

pub use engine::*;
pub use overrides::*;

use crate::config::MatchOptions;
use crate::types::*;

/// Reconcile with the given options; never fails
pub fn reconcile(
    bank_records: &[BankRecord],
    supplier_records: &[SupplierRecord],
    options: &MatchOptions,
) -> ReconciliationOutcome {
    MatchingEngine::new(options.clone()).reconcile(bank_records, supplier_records)
}

/// Reconcile, rejecting an empty side as an input error
pub fn reconcile_checked(
    bank_records: &[BankRecord],
    supplier_records: &[SupplierRecord],
    options: &MatchOptions,
) -> ReconciliationResult<ReconciliationOutcome> {
    if bank_records.is_empty() {
        return Err(ReconciliationError::ReconciliationInput(
            "No bank records to reconcile".to_string(),
        ));
    }

    if supplier_records.is_empty() {
        return Err(ReconciliationError::ReconciliationInput(
            "No supplier records to reconcile against".to_string(),
        ));
    }

    Ok(reconcile(bank_records, supplier_records, options))
}
