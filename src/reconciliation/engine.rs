//! Greedy, tiered matching engine

use chrono::NaiveDate;

use crate::config::MatchOptions;
use crate::normalize::{amounts_match, days_between, format_amount, same_month};
use crate::types::*;

/// Matches bank records to supplier records, consuming each supplier record once
#[derive(Debug, Clone, Default)]
pub struct MatchingEngine {
    options: MatchOptions,
}

impl MatchingEngine {
    /// Create a new engine
    pub fn new(options: MatchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Annotate every bank record, in input order.
    ///
    /// Empty inputs are not an error: no bank records gives an empty result
    /// with 0%, no supplier records leaves every bank record unmatched.
    pub fn reconcile(
        &self,
        bank_records: &[BankRecord],
        supplier_records: &[SupplierRecord],
    ) -> ReconciliationOutcome {
        let mut pool: Vec<&SupplierRecord> = supplier_records.iter().collect();
        let mut records = Vec::with_capacity(bank_records.len());
        let mut matched_suppliers = Vec::new();

        for record in bank_records {
            let annotated = match self.select(record, &pool) {
                Some((index, rule)) => {
                    let supplier = pool.remove(index);
                    tracing::debug!(
                        bank_record = %record.id,
                        amount = %format_amount(&record.amount),
                        document = %supplier.document_reference,
                        rule = ?rule,
                        "Matched bank record"
                    );
                    matched_suppliers.push(supplier.clone());
                    MatchedBankRecord::matched(record.clone(), supplier, rule)
                }
                None => {
                    tracing::debug!(
                        bank_record = %record.id,
                        amount = %format_amount(&record.amount),
                        "No supplier record for bank record"
                    );
                    MatchedBankRecord::unmatched(record.clone())
                }
            };
            records.push(annotated);
        }

        let stats = ReconciliationStats::from_records(&records, supplier_records.len());
        tracing::info!(
            bank_records = stats.bank_record_count,
            supplier_records = stats.supplier_record_count,
            matched = stats.matched_count,
            unmatched = stats.unmatched_count,
            match_percentage = stats.match_percentage,
            "Reconciliation completed"
        );

        ReconciliationOutcome {
            records,
            stats,
            unmatched_suppliers: pool.into_iter().cloned().collect(),
            matched_suppliers,
        }
    }

    /// Pick a pool index for one bank record
    fn select(&self, record: &BankRecord, pool: &[&SupplierRecord]) -> Option<(usize, MatchRule)> {
        let candidates: Vec<usize> = pool
            .iter()
            .enumerate()
            .filter(|(_, supplier)| {
                amounts_match(&record.amount, &supplier.amount, &self.options.amount_tolerance)
            })
            .map(|(index, _)| index)
            .collect();

        match candidates.as_slice() {
            [] => None,
            [only] => Some((*only, MatchRule::UniqueAmount)),
            _ => self.narrow(record, pool, &candidates),
        }
    }

    /// Break a tie between several amount candidates using dates
    fn narrow(
        &self,
        record: &BankRecord,
        pool: &[&SupplierRecord],
        candidates: &[usize],
    ) -> Option<(usize, MatchRule)> {
        let use_posting = self.options.use_accounting_date;
        let date_of = |index: usize| pool[index].date;

        let exact = |target: NaiveDate| candidates.iter().copied().find(|&i| date_of(i) == target);
        if let Some(index) = exact(record.value_date) {
            return Some((index, MatchRule::ExactValueDate));
        }
        if use_posting {
            if let Some(index) = exact(record.posting_date) {
                return Some((index, MatchRule::ExactPostingDate));
            }
        }

        // Nearest candidate inside the target's month; first in pool order on ties
        let same_month_nearest = |target: NaiveDate| {
            candidates
                .iter()
                .copied()
                .filter(|&i| same_month(date_of(i), target))
                .min_by_key(|&i| days_between(date_of(i), target))
        };
        if let Some(index) = same_month_nearest(record.value_date) {
            return Some((index, MatchRule::SameMonthValueDate));
        }
        if use_posting {
            if let Some(index) = same_month_nearest(record.posting_date) {
                return Some((index, MatchRule::SameMonthPostingDate));
            }
        }

        let distance = |index: usize| {
            let to_value = days_between(date_of(index), record.value_date);
            if use_posting {
                to_value.min(days_between(date_of(index), record.posting_date))
            } else {
                to_value
            }
        };
        let (index, days) = candidates
            .iter()
            .map(|&i| (i, distance(i)))
            .min_by_key(|&(_, days)| days)?;

        if let Some(max_days) = self.options.max_date_distance_days {
            if days > max_days {
                tracing::debug!(
                    bank_record = %record.id,
                    days,
                    max_days,
                    "Nearest candidate too far away"
                );
                return None;
            }
        }

        Some((index, MatchRule::NearestDate))
    }
}
