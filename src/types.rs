//! Core types and data structures for the reconciliation system

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::extraction::StatementFormat;
use crate::normalize::date::{canonical, format_date};

/// A single cell-by-cell row handed over by a tabular reader
pub type Row = Vec<String>;

/// One sheet of a workbook, in workbook order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    /// Sheet name as shown in the workbook tab
    pub name: String,
    /// Rows in sheet order
    pub rows: Vec<Row>,
}

impl Sheet {
    /// Create a new sheet
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// One parsed line item from a bank statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankRecord {
    /// Unique identifier for the record
    pub id: String,
    /// Date the operation was recorded by the bank (accounting date)
    #[serde(with = "canonical")]
    pub posting_date: NaiveDate,
    /// Date the funds actually moved
    #[serde(with = "canonical")]
    pub value_date: NaiveDate,
    /// Whitespace-normalized description, joined across physical lines
    pub description: String,
    /// Amount exactly as it appeared in the source
    pub raw_amount_text: String,
    /// Signed amount derived from `raw_amount_text`
    pub amount: BigDecimal,
    /// Running balance after the movement, when the statement prints one
    pub balance: Option<BigDecimal>,
    /// Name of the file the record was extracted from
    pub source_file_name: String,
    /// Statement format the record was extracted with
    pub source_format: StatementFormat,
}

impl BankRecord {
    /// Posting date in canonical `DD/MM/YYYY` form
    pub fn posting_date_text(&self) -> String {
        format_date(self.posting_date)
    }

    /// Value date in canonical `DD/MM/YYYY` form
    pub fn value_date_text(&self) -> String {
        format_date(self.value_date)
    }
}

/// One parsed line item from a supplier ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierRecord {
    /// Unique identifier for the record
    pub id: String,
    /// Invoice or due date of the entry
    #[serde(with = "canonical")]
    pub date: NaiveDate,
    /// Numeric supplier code
    pub code: String,
    /// Supplier display name
    pub name: String,
    /// Document reference, the key copied onto matched bank records
    pub document_reference: String,
    /// Free reference token printed next to the document
    pub reference_code: String,
    /// Ledger status token (pending, paid, ...), when present
    pub status: Option<String>,
    /// Amount exactly as it appeared in the source
    pub raw_amount_text: String,
    /// Signed amount derived from `raw_amount_text`
    pub amount: BigDecimal,
    /// Name of the file the record was extracted from
    pub source_file: String,
    /// Reporting period (sheet name) for multi-sheet ledgers
    pub period: Option<String>,
}

impl SupplierRecord {
    /// Entry date in canonical `DD/MM/YYYY` form
    pub fn date_text(&self) -> String {
        format_date(self.date)
    }
}

/// Whether a bank record found its supplier counterpart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Matched,
    Unmatched,
}

/// The rule that settled a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// Only one supplier record carried the amount
    UniqueAmount,
    /// Several candidates, one dated on the value date
    ExactValueDate,
    /// Several candidates, one dated on the posting date
    ExactPostingDate,
    /// Nearest candidate within the value date's month
    SameMonthValueDate,
    /// Nearest candidate within the posting date's month
    SameMonthPostingDate,
    /// Nearest candidate overall
    NearestDate,
    /// Set by an operator after reconciliation
    Manual,
}

/// Bank record annotated with the outcome of matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedBankRecord {
    /// The bank movement itself
    #[serde(flatten)]
    pub record: BankRecord,
    /// Document reference of the matched supplier entry
    pub matched_document: Option<String>,
    /// Display name of the matched supplier
    pub matched_supplier_name: Option<String>,
    /// Id of the consumed supplier record
    pub matched_supplier_id: Option<String>,
    /// Matched or unmatched
    pub status: MatchStatus,
    /// Rule that produced the match
    pub rule: Option<MatchRule>,
}

impl MatchedBankRecord {
    /// Annotate a bank record as matched against a supplier record
    pub fn matched(record: BankRecord, supplier: &SupplierRecord, rule: MatchRule) -> Self {
        Self {
            record,
            matched_document: Some(supplier.document_reference.clone()),
            matched_supplier_name: Some(supplier.name.clone()),
            matched_supplier_id: Some(supplier.id.clone()),
            status: MatchStatus::Matched,
            rule: Some(rule),
        }
    }

    /// Annotate a bank record as unmatched
    pub fn unmatched(record: BankRecord) -> Self {
        Self {
            record,
            matched_document: None,
            matched_supplier_name: None,
            matched_supplier_id: None,
            status: MatchStatus::Unmatched,
            rule: None,
        }
    }

    /// Check if the record found a counterpart
    pub fn is_matched(&self) -> bool {
        self.status == MatchStatus::Matched
    }
}

/// Summary figures of one reconciliation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationStats {
    pub bank_record_count: usize,
    pub supplier_record_count: usize,
    pub matched_count: usize,
    pub unmatched_count: usize,
    /// Matched share of bank records, in `[0, 100]`
    pub match_percentage: f64,
}

/// Terminal output of one reconciliation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationOutcome {
    /// One entry per bank record, in input order
    pub records: Vec<MatchedBankRecord>,
    /// Summary figures
    pub stats: ReconciliationStats,
    /// Supplier records left in the pool after matching
    pub unmatched_suppliers: Vec<SupplierRecord>,
    /// Supplier records consumed by a match, in matching order
    #[serde(default)]
    pub matched_suppliers: Vec<SupplierRecord>,
}

/// Errors that can occur while extracting or reconciling records
#[derive(Debug, thiserror::Error)]
pub enum ReconciliationError {
    #[error("Extraction error: {0}")]
    Extraction(String),
    #[error("Format mismatch: {0}")]
    FormatMismatch(String),
    #[error("Reconciliation input error: {0}")]
    ReconciliationInput(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Record not found: {0}")]
    RecordNotFound(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Failed to process '{file_name}': {source}")]
    File {
        file_name: String,
        #[source]
        source: Box<ReconciliationError>,
    },
}

impl ReconciliationError {
    /// Attach the originating file name to an error
    pub fn in_file(self, file_name: impl Into<String>) -> Self {
        ReconciliationError::File {
            file_name: file_name.into(),
            source: Box::new(self),
        }
    }

    /// Name of the file the error originated from, if known
    pub fn file_name(&self) -> Option<&str> {
        match self {
            ReconciliationError::File { file_name, .. } => Some(file_name),
            _ => None,
        }
    }

    /// The innermost error, unwrapping file context
    pub fn root(&self) -> &ReconciliationError {
        match self {
            ReconciliationError::File { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type for reconciliation operations
pub type ReconciliationResult<T> = Result<T, ReconciliationError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bank_record() -> BankRecord {
        BankRecord {
            id: "b1".to_string(),
            posting_date: NaiveDate::from_ymd_opt(2025, 12, 4).unwrap(),
            value_date: NaiveDate::from_ymd_opt(2025, 12, 5).unwrap(),
            description: "RECIBO ENDESA".to_string(),
            raw_amount_text: "-148,29".to_string(),
            amount: "-148.29".parse().unwrap(),
            balance: None,
            source_file_name: "statement.pdf".to_string(),
            source_format: StatementFormat::DualDateEuro,
        }
    }

    #[test]
    fn test_bank_record_serializes_canonical_dates() {
        let record = sample_bank_record();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["posting_date"], "04/12/2025");
        assert_eq!(json["value_date"], "05/12/2025");

        let back: BankRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_error_file_context() {
        let err = ReconciliationError::FormatMismatch("no records".to_string()).in_file("a.pdf");

        assert_eq!(err.file_name(), Some("a.pdf"));
        assert!(matches!(err.root(), ReconciliationError::FormatMismatch(_)));
        assert!(err.to_string().contains("a.pdf"));
    }
}
