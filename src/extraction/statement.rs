//! Bank statement formats and the statement extractor

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::fields::{Field, RawFields};
use super::noise::{NoiseFilter, STATEMENT_DENY_TOKENS};
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

/// Supported bank statement layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementFormat {
    /// Posting and value date, euro amounts with `€`, running balance,
    /// descriptions wrapped over several lines
    DualDateEuro,
    /// One or two dates that may spell the month (`25-nov-24`), euro amounts
    NamedMonthEuro,
    /// `MM/DD/YYYY` dates and dollar amounts
    MonthFirstDollar,
    /// Spreadsheet export with a header row
    Tabular,
}

static DUAL_DATE_EURO: FormatDescriptor = FormatDescriptor {
    name: "dual-date euro statement",
    date_order: DateOrder::DayFirst,
    text_field: Field::Description,
    strategies: &[
        LineStrategy::Trailing {
            name: "dual-date multi-line",
            head: patterns::dual_date_head,
            tail: patterns::euro_tail,
        },
        LineStrategy::SingleLine {
            name: "dual-date single-line",
            pattern: patterns::dual_date_relaxed,
        },
        LineStrategy::SingleLine {
            name: "loose",
            pattern: patterns::loose_statement_line,
        },
    ],
    columns: &[],
    deny_tokens: STATEMENT_DENY_TOKENS,
};

static NAMED_MONTH_EURO: FormatDescriptor = FormatDescriptor {
    name: "named-month euro statement",
    date_order: DateOrder::DayFirst,
    text_field: Field::Description,
    strategies: &[
        LineStrategy::Trailing {
            name: "named-month multi-line",
            head: patterns::single_date_head,
            tail: patterns::euro_tail,
        },
        LineStrategy::SingleLine {
            name: "named-month single-line",
            pattern: patterns::single_date_relaxed,
        },
        LineStrategy::SingleLine {
            name: "loose",
            pattern: patterns::loose_statement_line,
        },
    ],
    columns: &[],
    deny_tokens: STATEMENT_DENY_TOKENS,
};

static MONTH_FIRST_DOLLAR: FormatDescriptor = FormatDescriptor {
    name: "month-first dollar statement",
    date_order: DateOrder::MonthFirst,
    text_field: Field::Description,
    strategies: &[
        LineStrategy::Trailing {
            name: "month-first multi-line",
            head: patterns::month_first_head,
            tail: patterns::dollar_tail,
        },
        LineStrategy::SingleLine {
            name: "month-first single-line",
            pattern: patterns::month_first_relaxed,
        },
        LineStrategy::SingleLine {
            name: "loose",
            pattern: patterns::loose_statement_line,
        },
    ],
    columns: &[],
    deny_tokens: STATEMENT_DENY_TOKENS,
};

static TABULAR_STATEMENT: FormatDescriptor = FormatDescriptor {
    name: "tabular statement",
    date_order: DateOrder::DayFirst,
    text_field: Field::Description,
    strategies: &[],
    // Value date first so "Fecha valor" is not claimed as the posting date
    columns: &[
        ColumnSpec::optional(
            Field::ValueDate,
            &["f. valor", "fecha valor", "data valor", "value date", "valor"],
        ),
        ColumnSpec::required(
            Field::PostingDate,
            &[
                "f. operacion",
                "fecha operacion",
                "fecha contable",
                "data operacio",
                "fecha",
                "data",
                "posting date",
                "date",
            ],
        ),
        ColumnSpec::required(
            Field::Description,
            &[
                "concepto",
                "descripcion",
                "concepte",
                "descripcio",
                "description",
                "detalle",
                "movimiento",
                "details",
            ],
        ),
        ColumnSpec::optional(Field::Amount, &["importe", "import", "amount"]),
        ColumnSpec::optional(Field::Debit, &["cargo", "debe", "debit", "carrec", "reintegro"]),
        ColumnSpec::optional(
            Field::Credit,
            &["abono", "haber", "credit", "ingreso", "abonament"],
        ),
        ColumnSpec::optional(Field::Balance, &["saldo", "balance"]),
    ],
    deny_tokens: STATEMENT_DENY_TOKENS,
};

impl StatementFormat {
    pub const ALL: [StatementFormat; 4] = [
        StatementFormat::DualDateEuro,
        StatementFormat::NamedMonthEuro,
        StatementFormat::MonthFirstDollar,
        StatementFormat::Tabular,
    ];

    /// Declarative descriptor consumed by the extraction pipeline
    pub fn descriptor(&self) -> &'static FormatDescriptor {
        match self {
            StatementFormat::DualDateEuro => &DUAL_DATE_EURO,
            StatementFormat::NamedMonthEuro => &NAMED_MONTH_EURO,
            StatementFormat::MonthFirstDollar => &MONTH_FIRST_DOLLAR,
            StatementFormat::Tabular => &TABULAR_STATEMENT,
        }
    }

    /// Stable identifier, as used in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementFormat::DualDateEuro => "dual_date_euro",
            StatementFormat::NamedMonthEuro => "named_month_euro",
            StatementFormat::MonthFirstDollar => "month_first_dollar",
            StatementFormat::Tabular => "tabular",
        }
    }
}

impl fmt::Display for StatementFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementFormat {
    type Err = ReconciliationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        StatementFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == wanted)
            .ok_or_else(|| {
                ReconciliationError::Configuration(format!("Unknown statement format '{}'", s))
            })
    }
}

fn has_amount_column(header: &HeaderMap) -> bool {
    header.has(Field::Amount) || header.has(Field::Debit) || header.has(Field::Credit)
}

/// Extracts bank records from one statement
pub struct StatementExtractor {
    format: StatementFormat,
    options: ExtractionOptions,
    sheets: SheetSelection,
    validator: Box<dyn RecordValidator>,
}

impl StatementExtractor {
    /// Create an extractor for a format with default options
    pub fn new(format: StatementFormat) -> Self {
        Self {
            format,
            options: ExtractionOptions::default(),
            sheets: SheetSelection::First,
            validator: Box::new(DefaultRecordValidator),
        }
    }

    /// Use custom extraction options
    pub fn with_options(mut self, options: ExtractionOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a custom record validator
    pub fn with_validator(mut self, validator: Box<dyn RecordValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Choose the sheets read from a workbook (first sheet by default)
    pub fn with_sheets(mut self, sheets: SheetSelection) -> Self {
        self.sheets = sheets;
        self
    }

    pub fn format(&self) -> StatementFormat {
        self.format
    }

    /// Extract the bank records of one source.
    ///
    /// Fails with an extraction error when the source is blank and with a
    /// format mismatch when every strategy of the format came back empty.
    pub fn extract(
        &self,
        input: SourceInput<'_>,
        source_name: &str,
    ) -> ReconciliationResult<Vec<BankRecord>> {
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
        let build = |fields: RawFields| self.build_record(fields, &dates, &noise, source_name);

        let records = if descriptor.is_tabular() {
            let blocks = row_blocks_from_input(input, &self.sheets);
            extract_table(blocks, descriptor.columns, has_amount_column, |fields, _| {
                build(fields)
            })
        } else {
            let lines = lines_from_input(input, &self.sheets);
            let ctx = StrategyContext {
                text_field: descriptor.text_field,
                noise: &noise,
                max_continuation: self.options.max_continuation_lines,
            };
            match run_strategies(descriptor.strategies, &lines, &ctx, build) {
                Some((strategy, records)) => {
                    tracing::debug!(source = source_name, strategy, "Statement strategy selected");
                    records
                }
                None => Vec::new(),
            }
        };

        if records.is_empty() {
            tracing::warn!(
                source = source_name,
                format = %self.format,
                "No bank records extracted"
            );
            return Err(no_records_error(descriptor.name, source_name));
        }

        let records = RecordDeduplicator::new(self.options.description_key_chars).dedup(records);
        tracing::info!(
            source = source_name,
            format = %self.format,
            records = records.len(),
            "Extracted bank records"
        );
        Ok(records)
    }

    fn build_record(
        &self,
        fields: RawFields,
        dates: &DateNormalizer,
        noise: &NoiseFilter,
        source_name: &str,
    ) -> Option<BankRecord> {
        let posting_date = dates.parse(fields.get(Field::PostingDate)?)?;
        let value_date = fields
            .get(Field::ValueDate)
            .and_then(|raw| dates.parse(raw))
            .unwrap_or(posting_date);

        let description = collapse_whitespace(fields.get(Field::Description).unwrap_or_default());
        if description.is_empty() || noise.rejects(&description) {
            tracing::trace!(description = %description, "Rejected header or empty description");
            return None;
        }

        let raw_amount_text = match fields.get(Field::Amount) {
            Some(raw) => raw.to_string(),
            None => signed_from_columns(fields.get(Field::Debit), fields.get(Field::Credit))?,
        };

        let record = BankRecord {
            id: Uuid::new_v4().to_string(),
            posting_date,
            value_date,
            description,
            amount: parse_amount(&raw_amount_text),
            raw_amount_text,
            balance: fields.get(Field::Balance).map(parse_amount),
            source_file_name: source_name.to_string(),
            source_format: self.format,
        };

        match self.validator.validate_bank_record(&record) {
            Ok(()) => Some(record),
            Err(err) => {
                tracing::trace!(error = %err, "Dropped bank record");
                None
            }
        }
    }
}

/// Amount text from split debit/credit columns; debits become negative
fn signed_from_columns(debit: Option<&str>, credit: Option<&str>) -> Option<String> {
    let zero = bigdecimal::BigDecimal::from(0);
    if let Some(credit) = credit.filter(|raw| parse_amount(raw) != zero) {
        return Some(credit.to_string());
    }

    let debit = debit.filter(|raw| parse_amount(raw) != zero)?;
    if parse_amount(debit) > zero {
        Some(format!("-{}", debit))
    } else {
        Some(debit.to_string())
    }
}

/// Extract the bank records of one statement with default options
pub fn parse_statement(
    input: SourceInput<'_>,
    format: StatementFormat,
    source_name: &str,
) -> ReconciliationResult<Vec<BankRecord>> {
    StatementExtractor::new(format).extract(input, source_name)
}
