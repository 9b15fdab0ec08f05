//! Extraction of bank and supplier records from page text or spreadsheet rows
//!
//! Every format is a declarative [`FormatDescriptor`]: the numeric date
//! convention, the header/footer deny-list, an ordered list of line
//! strategies (text sources) and the column synonyms (tabular sources). One
//! shared pipeline consumes it:
//!
//! 1. tokenize the text into whitespace-normalized lines
//! 2. try the strategies in priority order, stopping at the first one that
//!    yields at least one valid record
//! 3. validate each candidate (dates, deny-list, [`RecordValidator`](crate::RecordValidator))
//! 4. collapse duplicates with the [`RecordDeduplicator`]

pub mod dedup;
pub mod fields;
pub mod ledger;
pub mod noise;
pub mod patterns;
pub mod statement;
pub mod strategy;
pub mod tabular;

pub use dedup::*;
pub use fields::*;
pub use ledger::*;
pub use noise::*;
pub use statement::*;
pub use strategy::*;
pub use tabular::*;

use serde::{Deserialize, Serialize};

use crate::normalize::DateOrder;
use crate::types::*;

/// Declarative description of one source format
#[derive(Debug, Clone, Copy)]
pub struct FormatDescriptor {
    /// Human-readable format name used in logs and error messages
    pub name: &'static str,
    /// Numeric day/month convention of the source
    pub date_order: DateOrder,
    /// Free-text field that continuation lines are attached to
    pub text_field: Field,
    /// Line strategies in priority order (text sources)
    pub strategies: &'static [LineStrategy],
    /// Column synonyms in claim order (tabular sources)
    pub columns: &'static [ColumnSpec],
    /// Header/footer tokens rejected in short candidate texts
    pub deny_tokens: &'static [&'static str],
}

impl FormatDescriptor {
    /// Check if the format reads spreadsheet rows rather than page text
    pub fn is_tabular(&self) -> bool {
        !self.columns.is_empty()
    }
}

/// Raw content handed to an extractor
#[derive(Debug, Clone, Copy)]
pub enum SourceInput<'a> {
    /// Page text, pages already joined with newlines
    Text(&'a str),
    /// Rows of a single sheet
    Rows(&'a [Row]),
    /// Every sheet of a workbook
    Sheets(&'a [Sheet]),
}

impl SourceInput<'_> {
    /// Check if the input carries any non-blank content
    pub fn has_content(&self) -> bool {
        match self {
            SourceInput::Text(text) => !text.trim().is_empty(),
            SourceInput::Rows(rows) => rows.iter().any(|row| !is_blank_row(row)),
            SourceInput::Sheets(sheets) => sheets
                .iter()
                .any(|sheet| sheet.rows.iter().any(|row| !is_blank_row(row))),
        }
    }
}

/// Which sheets of a workbook an extractor reads
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetSelection {
    /// Every sheet, in workbook order
    #[default]
    All,
    /// Only the first sheet
    First,
    /// Sheets with these names (case-insensitive), in workbook order
    Named(Vec<String>),
}

impl SheetSelection {
    /// Pick the selected sheets out of a workbook
    pub fn select<'a>(&self, sheets: &'a [Sheet]) -> Vec<&'a Sheet> {
        match self {
            SheetSelection::All => sheets.iter().collect(),
            SheetSelection::First => sheets.iter().take(1).collect(),
            SheetSelection::Named(names) => sheets
                .iter()
                .filter(|sheet| {
                    names
                        .iter()
                        .any(|name| name.trim().eq_ignore_ascii_case(sheet.name.trim()))
                })
                .collect(),
        }
    }
}

/// Turn a text source into lines for the line strategies
pub(crate) fn lines_from_input(input: SourceInput<'_>, selection: &SheetSelection) -> Vec<String> {
    match input {
        SourceInput::Text(text) => tokenize(text),
        SourceInput::Rows(rows) => lines_from_rows(rows),
        SourceInput::Sheets(sheets) => selection
            .select(sheets)
            .into_iter()
            .flat_map(|sheet| lines_from_rows(&sheet.rows))
            .collect(),
    }
}

fn lines_from_rows(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .map(|row| row.join(" "))
        .flat_map(|line| tokenize(&line))
        .collect()
}

/// Turn a source into `(period, rows)` blocks for the tabular pipeline.
///
/// Plain text is split into cells on tabs or semicolons.
pub(crate) fn row_blocks_from_input(
    input: SourceInput<'_>,
    selection: &SheetSelection,
) -> Vec<(Option<String>, Vec<Row>)> {
    match input {
        SourceInput::Text(text) => vec![(None, rows_from_text(text))],
        SourceInput::Rows(rows) => vec![(None, rows.to_vec())],
        SourceInput::Sheets(sheets) => selection
            .select(sheets)
            .into_iter()
            .map(|sheet| (Some(sheet.name.clone()), sheet.rows.clone()))
            .collect(),
    }
}

fn rows_from_text(text: &str) -> Vec<Row> {
    text.lines()
        .map(|line| {
            line.split(['\t', ';'])
                .map(|cell| cell.trim().to_string())
                .collect()
        })
        .collect()
}

/// Error raised when a source has no usable content at all
pub(crate) fn empty_source_error(source_name: &str) -> ReconciliationError {
    ReconciliationError::Extraction(format!(
        "'{}' has no extractable text; it may be a scanned image or a corrupt file",
        source_name
    ))
}

/// Error raised when every strategy of a declared format came back empty
pub(crate) fn no_records_error(format_name: &str, source_name: &str) -> ReconciliationError {
    ReconciliationError::FormatMismatch(format!(
        "No records found in '{}' using the {} format; the file may be a scanned image \
         or belong to a different bank/ledger format",
        source_name, format_name
    ))
}
