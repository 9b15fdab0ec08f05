//! Manual correction of matched documents after reconciliation

use crate::types::*;

/// Substitute the matched document of one record, returning a new list.
///
/// A non-empty reference marks the record matched by [`MatchRule::Manual`];
/// an empty one clears the match. The supplier name and id are cleared in
/// both cases since the operator's document no longer points at a
/// known supplier record.
pub fn override_matched_document(
    records: &[MatchedBankRecord],
    record_id: &str,
    new_document_ref: &str,
) -> ReconciliationResult<Vec<MatchedBankRecord>> {
    if !records.iter().any(|record| record.record.id == record_id) {
        return Err(ReconciliationError::RecordNotFound(record_id.to_string()));
    }

    let document = new_document_ref.trim();
    let updated = records
        .iter()
        .map(|record| {
            if record.record.id != record_id {
                return record.clone();
            }

            let mut updated = MatchedBankRecord::unmatched(record.record.clone());
            if !document.is_empty() {
                updated.matched_document = Some(document.to_string());
                updated.status = MatchStatus::Matched;
                updated.rule = Some(MatchRule::Manual);
            }
            tracing::info!(
                bank_record = record_id,
                document = document,
                "Matched document overridden"
            );
            updated
        })
        .collect();

    Ok(updated)
}

impl ReconciliationOutcome {
    /// Apply a manual override and recompute the statistics.
    ///
    /// A supplier record released by the override goes back to
    /// `unmatched_suppliers`.
    pub fn with_override(
        &self,
        record_id: &str,
        new_document_ref: &str,
    ) -> ReconciliationResult<ReconciliationOutcome> {
        let records = override_matched_document(&self.records, record_id, new_document_ref)?;
        let stats = ReconciliationStats::from_records(&records, self.stats.supplier_record_count);

        let released = self
            .records
            .iter()
            .find(|record| record.record.id == record_id)
            .and_then(|record| record.matched_supplier_id.as_deref());

        let mut unmatched_suppliers = self.unmatched_suppliers.clone();
        let mut matched_suppliers = self.matched_suppliers.clone();
        if let Some(supplier_id) = released {
            if let Some(index) = matched_suppliers.iter().position(|s| s.id == supplier_id) {
                let supplier = matched_suppliers.remove(index);
                tracing::debug!(
                    supplier_record = %supplier.id,
                    document = %supplier.document_reference,
                    "Supplier record released by override"
                );
                unmatched_suppliers.push(supplier);
            }
        }

        Ok(ReconciliationOutcome {
            records,
            stats,
            unmatched_suppliers,
            matched_suppliers,
        })
    }
}
