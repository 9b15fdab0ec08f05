//! Traits for external capabilities and extensibility

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use std::sync::Arc;

use crate::types::*;

/// Document text extraction capability
///
/// This trait lets the core consume any document-rendering backend (PDF text
/// layer, office documents, ...) without linking it: the backend returns one
/// plain text string per page.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract the text of every page, in page order
    async fn extract_text(&self, file_bytes: &[u8]) -> ReconciliationResult<Vec<String>>;
}

/// Loader for a text extraction backend that needs initialization
///
/// Loading happens at most once per `ManagedTextExtractor`; the loader is
/// injected instead of living in process-wide state.
#[async_trait]
pub trait TextExtractorLoader: Send + Sync {
    /// Initialize the backend and hand out a ready extractor
    async fn load(&self) -> ReconciliationResult<Arc<dyn TextExtractor>>;
}

/// Spreadsheet reading capability
#[async_trait]
pub trait TabularReader: Send + Sync {
    /// Read every sheet of a workbook, in workbook order
    async fn read_sheets(&self, file_bytes: &[u8]) -> ReconciliationResult<Vec<Sheet>>;
}

/// Trait for implementing custom record acceptance rules
///
/// Extractors run every candidate record through a validator; rejected
/// records are dropped, not reported as errors.
pub trait RecordValidator: Send + Sync {
    /// Validate a bank record before it is emitted
    fn validate_bank_record(&self, record: &BankRecord) -> ReconciliationResult<()>;

    /// Validate a supplier record before it is emitted
    fn validate_supplier_record(&self, record: &SupplierRecord) -> ReconciliationResult<()>;
}

/// Default validator with the minimal acceptance rules
pub struct DefaultRecordValidator;

impl RecordValidator for DefaultRecordValidator {
    fn validate_bank_record(&self, record: &BankRecord) -> ReconciliationResult<()> {
        if record.amount == BigDecimal::from(0) {
            return Err(ReconciliationError::Validation(format!(
                "Bank record amount '{}' is zero or unparsable",
                record.raw_amount_text
            )));
        }

        Ok(())
    }

    fn validate_supplier_record(&self, record: &SupplierRecord) -> ReconciliationResult<()> {
        if record.document_reference.trim().is_empty() {
            return Err(ReconciliationError::Validation(
                "Supplier record has no document reference".to_string(),
            ));
        }

        if record.amount == BigDecimal::from(0) {
            return Err(ReconciliationError::Validation(format!(
                "Supplier record amount '{}' is zero or unparsable",
                record.raw_amount_text
            )));
        }

        Ok(())
    }
}

/// Composite key used to collapse duplicate extraction artifacts
pub trait DedupKey {
    /// Build the key, keeping the first `description_chars` characters of free text
    fn dedup_key(&self, description_chars: usize) -> String;
}
