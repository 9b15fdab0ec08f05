//! Validation utilities

use crate::normalize::{format_amount, DateNormalizer};
use crate::traits::*;
use crate::types::*;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;

/// Validate that an amount stays below a magnitude limit
pub fn validate_amount_limit(amount: &BigDecimal, limit: &BigDecimal) -> ReconciliationResult<()> {
    if amount.abs() > *limit {
        return Err(ReconciliationError::Validation(format!(
            "Amount {} exceeds the limit of {}",
            format_amount(amount),
            format_amount(limit)
        )));
    }

    Ok(())
}

/// Validate that a document reference looks like an invoice number
pub fn validate_document_reference(reference: &str) -> ReconciliationResult<()> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(ReconciliationError::Validation(
            "Document reference cannot be empty".to_string(),
        ));
    }

    if reference.chars().count() > 40 {
        return Err(ReconciliationError::Validation(
            "Document reference cannot exceed 40 characters".to_string(),
        ));
    }

    // Digits, letters and the usual separators only
    if !reference
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '/' | '-' | '_' | '.'))
    {
        return Err(ReconciliationError::Validation(format!(
            "Document reference '{}' contains invalid characters",
            reference
        )));
    }

    if !reference.chars().any(|c| c.is_ascii_digit()) {
        return Err(ReconciliationError::Validation(format!(
            "Document reference '{}' has no digits",
            reference
        )));
    }

    Ok(())
}

/// Validate that a bank description is usable
pub fn validate_description(description: &str) -> ReconciliationResult<()> {
    if description.trim().is_empty() {
        return Err(ReconciliationError::Validation(
            "Description cannot be empty".to_string(),
        ));
    }

    if description.chars().count() > 500 {
        return Err(ReconciliationError::Validation(
            "Description cannot exceed 500 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate that a supplier code is numeric when present
pub fn validate_supplier_code(code: &str) -> ReconciliationResult<()> {
    if !code.is_empty() && !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ReconciliationError::Validation(format!(
            "Supplier code '{}' must be numeric",
            code
        )));
    }

    Ok(())
}

/// Validate that the amount text still reads as the stored amount
pub fn validate_amount_text(raw: &str, amount: &BigDecimal) -> ReconciliationResult<()> {
    let reparsed = crate::normalize::parse_amount(raw);
    if reparsed != *amount {
        return Err(ReconciliationError::Validation(format!(
            "Amount text '{}' does not match amount {}",
            raw,
            format_amount(amount)
        )));
    }

    Ok(())
}

/// Strict validator with detailed checks
///
/// On top of the default rules it checks descriptions, document references,
/// supplier codes, an amount ceiling and an optional date window.
pub struct StrictRecordValidator {
    max_amount: BigDecimal,
    window: Option<(NaiveDate, NaiveDate)>,
}

impl StrictRecordValidator {
    /// Create a validator rejecting amounts above `max_amount`
    pub fn new(max_amount: BigDecimal) -> Self {
        Self {
            max_amount,
            window: None,
        }
    }

    /// Only accept records dated inside `[from, to]`
    pub fn with_date_window(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.window = Some((from, to));
        self
    }

    fn validate_date(&self, date: NaiveDate) -> ReconciliationResult<()> {
        match self.window {
            Some((from, to)) if date < from || date > to => {
                Err(ReconciliationError::Validation(format!(
                    "Date {} is outside {} - {}",
                    crate::normalize::format_date(date),
                    crate::normalize::format_date(from),
                    crate::normalize::format_date(to)
                )))
            }
            _ => Ok(()),
        }
    }
}

impl Default for StrictRecordValidator {
    fn default() -> Self {
        Self::new(BigDecimal::from(1_000_000))
    }
}

impl RecordValidator for StrictRecordValidator {
    fn validate_bank_record(&self, record: &BankRecord) -> ReconciliationResult<()> {
        // Basic validation
        DefaultRecordValidator.validate_bank_record(record)?;

        validate_description(&record.description)?;
        validate_amount_text(&record.raw_amount_text, &record.amount)?;
        validate_amount_limit(&record.amount, &self.max_amount)?;
        self.validate_date(record.posting_date)?;

        if record.value_date < record.posting_date - chrono::Duration::days(31) {
            return Err(ReconciliationError::Validation(format!(
                "Value date {} is more than a month before posting date {}",
                record.value_date_text(),
                record.posting_date_text()
            )));
        }

        Ok(())
    }

    fn validate_supplier_record(&self, record: &SupplierRecord) -> ReconciliationResult<()> {
        DefaultRecordValidator.validate_supplier_record(record)?;

        validate_document_reference(&record.document_reference)?;
        validate_supplier_code(&record.code)?;
        validate_amount_limit(&record.amount, &self.max_amount)?;
        self.validate_date(record.date)?;

        Ok(())
    }
}

/// Parse a `DD/MM/YYYY` window bound, for building validators from configuration
pub fn parse_window_date(text: &str) -> ReconciliationResult<NaiveDate> {
    DateNormalizer::default().parse(text).ok_or_else(|| {
        ReconciliationError::Configuration(format!("'{}' is not a valid date", text))
    })
}
