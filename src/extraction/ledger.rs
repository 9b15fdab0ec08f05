//! Supplier ledger formats and the ledger extractor

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::fields::{Field, RawFields};
use super::noise::{NoiseFilter, LEDGER_DENY_TOKENS};
use super::patterns;
use super::strategy::{run_strategies, LineStrategy, StrategyContext};
use super::tabular::{extract_table, ColumnSpec, HeaderMap};
use super::{
    empty_source_error, lines_from_input, no_records_error, row_blocks_from_input,
    FormatDescriptor, RecordDeduplicator, SheetSelection, SourceInput,
};
use crate::config::ExtractionOptions;
use crate::normalize::{collapse_whitespace, parse_amount, DateNormalizer, DateOrder};
use crate::traits::{DefaultRecordValidator, RecordValidator};
use crate::types::*;

/// Supported supplier ledger layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerFormat {
    /// Printed supplier listing: one entry per line, names may wrap onto
    /// the lines above
    SupplierListing,
    /// Spreadsheet ledger, one sheet per reporting period
    Tabular,
}

static SUPPLIER_LISTING: FormatDescriptor = FormatDescriptor {
    name: "supplier listing",
    date_order: DateOrder::DayFirst,
    text_field: Field::Name,
    strategies: &[
        LineStrategy::Leading {
            name: "supplier listing",
            tail: patterns::ledger_tail,
        },
        LineStrategy::SingleLine {
            name: "supplier listing loose",
            pattern: patterns::ledger_loose,
        },
    ],
    columns: &[],
    deny_tokens: LEDGER_DENY_TOKENS,
};

static TABULAR_LEDGER: FormatDescriptor = FormatDescriptor {
    name: "tabular ledger",
    date_order: DateOrder::DayFirst,
    text_field: Field::Name,
    strategies: &[],
    columns: &[
        ColumnSpec::optional(
            Field::Status,
            &["estado", "estat", "status", "situacion", "situacio"],
        ),
        ColumnSpec::required(
            Field::Document,
            &[
                "documento",
                "num. documento",
                "nº documento",
                "nº factura",
                "num factura",
                "factura",
                "document",
                "invoice",
                "doc",
            ],
        ),
        ColumnSpec::optional(Field::Reference, &["referencia", "ref", "concepto", "concepte"]),
        ColumnSpec::optional(Field::Code, &["codigo", "codi", "code", "cuenta", "compte"]),
        ColumnSpec::required(
            Field::Name,
            &[
                "proveedor",
                "proveidor",
                "nombre",
                "razon social",
                "client",
                "previsio",
                "prevision",
                "supplier",
                "nom",
                "name",
            ],
        ),
        ColumnSpec::required(
            Field::Date,
            &["fecha", "data", "date", "vencimiento", "venciment"],
        ),
        ColumnSpec::required(
            Field::Amount,
            &["importe", "import", "amount", "total", "pendiente", "pendent"],
        ),
    ],
    deny_tokens: LEDGER_DENY_TOKENS,
};

impl LedgerFormat {
    pub const ALL: [LedgerFormat; 2] = [LedgerFormat::SupplierListing, LedgerFormat::Tabular];

    /// Declarative descriptor consumed by the extraction pipeline
    pub fn descriptor(&self) -> &'static FormatDescriptor {
        match self {
            LedgerFormat::SupplierListing => &SUPPLIER_LISTING,
            LedgerFormat::Tabular => &TABULAR_LEDGER,
        }
    }

    /// Stable identifier, as used in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerFormat::SupplierListing => "supplier_listing",
            LedgerFormat::Tabular => "tabular",
        }
    }
}

impl fmt::Display for LedgerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedgerFormat {
    type Err = ReconciliationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        LedgerFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == wanted)
            .ok_or_else(|| {
                ReconciliationError::Configuration(format!("Unknown ledger format '{}'", s))
            })
    }
}

fn accept_any(_: &HeaderMap) -> bool {
    true
}

/// Extracts supplier records from one ledger
pub struct LedgerExtractor {
    format: LedgerFormat,
    options: ExtractionOptions,
    sheets: SheetSelection,
    validator: Box<dyn RecordValidator>,
}

impl LedgerExtractor {
    /// Create an extractor for a format with default options
    pub fn new(format: LedgerFormat) -> Self {
        Self {
            format,
            options: ExtractionOptions::default(),
            sheets: SheetSelection::All,
            validator: Box::new(DefaultRecordValidator),
        }
    }

    pub fn with_options(mut self, options: ExtractionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_validator(mut self, validator: Box<dyn RecordValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Choose the sheets (reporting periods) read from a workbook
    pub fn with_sheets(mut self, sheets: SheetSelection) -> Self {
        self.sheets = sheets;
        self
    }

    pub fn format(&self) -> LedgerFormat {
        self.format
    }

    /// Extract the supplier records of one source.
    ///
    /// Tabular records carry their sheet name as `period`.
    pub fn extract(
        &self,
        input: SourceInput<'_>,
        source_name: &str,
    ) -> ReconciliationResult<Vec<SupplierRecord>> {
        if !input.has_content() {
            return Err(empty_source_error(source_name));
        }

        let descriptor = self.format.descriptor();
        let noise = NoiseFilter::new(
            descriptor.deny_tokens,
            &self.options.extra_deny_tokens,
            self.options.header_guard_chars,
        );
        let dates = DateNormalizer::new(descriptor.date_order);

        let records = if descriptor.is_tabular() {
            let blocks = row_blocks_from_input(input, &self.sheets);
            extract_table(blocks, descriptor.columns, accept_any, |fields, period| {
                self.build_record(fields, period, &dates, &noise, source_name)
            })
        } else {
            let lines = lines_from_input(input, &self.sheets);
            let ctx = StrategyContext {
                text_field: descriptor.text_field,
                noise: &noise,
                max_continuation: self.options.max_continuation_lines,
            };
            run_strategies(descriptor.strategies, &lines, &ctx, |fields| {
                self.build_record(fields, None, &dates, &noise, source_name)
            })
            .map(|(strategy, records)| {
                tracing::debug!(source = source_name, strategy, "Ledger strategy selected");
                records
            })
            .unwrap_or_default()
        };

        if records.is_empty() {
            tracing::warn!(
                source = source_name,
                format = %self.format,
                "No supplier records extracted"
            );
            return Err(no_records_error(descriptor.name, source_name));
        }

        let records = RecordDeduplicator::new(self.options.description_key_chars).dedup(records);
        tracing::info!(
            source = source_name,
            format = %self.format,
            records = records.len(),
            "Extracted supplier records"
        );
        Ok(records)
    }

    fn build_record(
        &self,
        fields: RawFields,
        period: Option<&str>,
        dates: &DateNormalizer,
        noise: &NoiseFilter,
        source_name: &str,
    ) -> Option<SupplierRecord> {
        let date = dates.parse(fields.get(Field::Date)?)?;
        let document_reference = fields.get(Field::Document)?.to_string();
        let raw_amount_text = fields.get(Field::Amount)?.to_string();

        let mut name = collapse_whitespace(fields.get(Field::Name).unwrap_or_default());
        let mut status = fields.get(Field::Status).map(str::to_string);
        if status.is_none() {
            let split = patterns::status_prefix()
                .captures(&name)
                .map(|caps| (caps["status"].to_string(), caps["name"].to_string()));
            if let Some((token, rest)) = split {
                status = Some(token);
                name = rest;
            }
        }

        if noise.rejects(&name) {
            tracing::trace!(name = %name, "Rejected header or footer line");
            return None;
        }

        let record = SupplierRecord {
            id: Uuid::new_v4().to_string(),
            date,
            code: clean_code(fields.get(Field::Code).unwrap_or_default()),
            name,
            document_reference,
            reference_code: fields.get(Field::Reference).unwrap_or_default().to_string(),
            status,
            amount: parse_amount(&raw_amount_text),
            raw_amount_text,
            source_file: source_name.to_string(),
            period: period.map(str::to_string),
        };

        match self.validator.validate_supplier_record(&record) {
            Ok(()) => Some(record),
            Err(err) => {
                tracing::trace!(error = %err, "Dropped supplier record");
                None
            }
        }
    }
}

/// Spreadsheet readers render integer codes as `400123.0`
fn clean_code(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_suffix(".0").unwrap_or(trimmed).to_string()
}

/// Extract the supplier records of one ledger with default options
pub fn parse_ledger(
    input: SourceInput<'_>,
    format: LedgerFormat,
    source_name: &str,
) -> ReconciliationResult<Vec<SupplierRecord>> {
    LedgerExtractor::new(format).extract(input, source_name)
}
