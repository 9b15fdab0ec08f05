//! Header-row location and row reading for spreadsheet sources

use super::fields::{Field, RawFields};
use crate::normalize::fold_text;
use crate::types::Row;

/// Header cells longer than this are titles or notes, never column names
const MAX_HEADER_CELL_CHARS: usize = 40;

/// Synonyms of one semantic column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub field: Field,
    /// Lowercase header labels, most specific first
    pub synonyms: &'static [&'static str],
    /// A header row missing this column is rejected
    pub required: bool,
}

impl ColumnSpec {
    pub const fn required(field: Field, synonyms: &'static [&'static str]) -> Self {
        Self {
            field,
            synonyms,
            required: true,
        }
    }

    pub const fn optional(field: Field, synonyms: &'static [&'static str]) -> Self {
        Self {
            field,
            synonyms,
            required: false,
        }
    }
}

/// Resolved header: its row index and the column of each claimed field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMap {
    pub header_row: usize,
    pub columns: Vec<(Field, usize)>,
}

impl HeaderMap {
    /// Column index of a field
    pub fn column(&self, field: Field) -> Option<usize> {
        self.columns
            .iter()
            .find(|(claimed, _)| *claimed == field)
            .map(|(_, index)| *index)
    }

    /// Check if the header carries a field
    pub fn has(&self, field: Field) -> bool {
        self.column(field).is_some()
    }

    /// Read the claimed cells of a data row
    pub fn read_row(&self, row: &Row) -> RawFields {
        let mut fields = RawFields::new();
        for (field, index) in &self.columns {
            if let Some(cell) = row.get(*index) {
                fields.set(*field, cell);
            }
        }
        fields
    }
}

/// Find the first row whose cells name every required column.
///
/// Columns are claimed in `specs` order. For each synonym an exact match of
/// the folded cell wins over a substring match, and a cell is claimed at most
/// once. `accept` can reject a complete mapping (e.g. one without any amount
/// column).
pub fn locate_header(
    rows: &[Row],
    specs: &[ColumnSpec],
    accept: impl Fn(&HeaderMap) -> bool,
) -> Option<HeaderMap> {
    rows.iter().enumerate().find_map(|(index, row)| {
        let header = map_header_row(index, row, specs)?;
        accept(&header).then_some(header)
    })
}

fn map_header_row(index: usize, row: &Row, specs: &[ColumnSpec]) -> Option<HeaderMap> {
    let cells: Vec<Option<String>> = row
        .iter()
        .map(|cell| {
            let folded = fold_text(cell.trim());
            (!folded.is_empty() && folded.chars().count() <= MAX_HEADER_CELL_CHARS)
                .then_some(folded)
        })
        .collect();

    let mut claimed = vec![false; cells.len()];
    let mut columns = Vec::new();

    for spec in specs {
        match claim_column(&cells, &claimed, spec.synonyms) {
            Some(column) => {
                claimed[column] = true;
                columns.push((spec.field, column));
            }
            None if spec.required => return None,
            None => {}
        }
    }

    Some(HeaderMap {
        header_row: index,
        columns,
    })
}

fn claim_column(cells: &[Option<String>], claimed: &[bool], synonyms: &[&str]) -> Option<usize> {
    let free = || {
        cells
            .iter()
            .enumerate()
            .filter(|(index, _)| !claimed[*index])
            .filter_map(|(index, cell)| cell.as_deref().map(|cell| (index, cell)))
    };

    synonyms.iter().find_map(|synonym| {
        let synonym = fold_text(synonym);
        free()
            .find(|(_, cell)| *cell == synonym)
            .or_else(|| free().find(|(_, cell)| cell.contains(synonym.as_str())))
            .map(|(index, _)| index)
    })
}

/// Check if every cell of a row is blank
pub fn is_blank_row(row: &Row) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

const TOTAL_LABELS: &[&str] = &["total", "totals", "totales", "subtotal", "subtotales"];

/// Check if a row is a total/subtotal line.
///
/// A bare total label always marks one. A label only opening the cell
/// ("TOTAL MES") counts when the row carries no date, so suppliers such as
/// "TOTAL LOGISTICS SL" survive.
pub fn is_total_row(row: &Row) -> bool {
    let labels: Vec<String> = row
        .iter()
        .map(|cell| fold_text(cell.trim()))
        .filter(|cell| !cell.is_empty())
        .collect();

    if labels
        .iter()
        .any(|cell| TOTAL_LABELS.contains(&cell.trim_end_matches(':')))
    {
        return true;
    }

    let opens_with_total = labels.iter().any(|cell| {
        cell.split(|c: char| !c.is_alphanumeric())
            .find(|word| !word.is_empty())
            .is_some_and(|word| TOTAL_LABELS.contains(&word))
    });
    opens_with_total && !row.iter().any(|cell| looks_like_date(cell))
}

/// `DD/MM/YYYY`-like cell: three numeric parts split by `/`, `-` or `.`
fn looks_like_date(cell: &str) -> bool {
    let parts: Vec<&str> = cell.trim().split(['/', '-', '.']).collect();
    parts.len() == 3
        && parts.iter().all(|part| {
            !part.is_empty() && part.len() <= 4 && part.chars().all(|c| c.is_ascii_digit())
        })
}

/// Read every data row below the header of each block.
///
/// Blocks without a recognizable header are skipped; blank and total rows
/// are never handed to `build`.
pub(crate) fn extract_table<T>(
    blocks: Vec<(Option<String>, Vec<Row>)>,
    specs: &[ColumnSpec],
    accept: fn(&HeaderMap) -> bool,
    mut build: impl FnMut(RawFields, Option<&str>) -> Option<T>,
) -> Vec<T> {
    let mut records = Vec::new();

    for (period, rows) in blocks {
        let Some(header) = locate_header(&rows, specs, accept) else {
            tracing::debug!(period = ?period, rows = rows.len(), "No header row found");
            continue;
        };

        tracing::debug!(
            period = ?period,
            header_row = header.header_row,
            columns = header.columns.len(),
            "Located header row"
        );

        records.extend(
            rows.iter()
                .skip(header.header_row + 1)
                .filter(|row| !is_blank_row(row) && !is_total_row(row))
                .filter_map(|row| build(header.read_row(row), period.as_deref())),
        );
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    const SPECS: &[ColumnSpec] = &[
        ColumnSpec::optional(Field::ValueDate, &["fecha valor", "valor"]),
        ColumnSpec::required(Field::PostingDate, &["fecha", "date"]),
        ColumnSpec::required(Field::Description, &["concepto", "description"]),
        ColumnSpec::optional(Field::Amount, &["importe", "amount"]),
    ];

    #[test]
    fn test_locate_header_claims_exact_before_substring() {
        let rows = vec![
            row(&["Extracto de movimientos"]),
            row(&[]),
            row(&["Fecha", "Fecha valor", "Concepto", "Importe"]),
            row(&["05/12/2025", "05/12/2025", "RECIBO", "-148,29"]),
        ];

        let header = locate_header(&rows, SPECS, |_| true).unwrap();
        assert_eq!(header.header_row, 2);
        assert_eq!(header.column(Field::ValueDate), Some(1));
        assert_eq!(header.column(Field::PostingDate), Some(0));
        assert_eq!(header.column(Field::Description), Some(2));
        assert_eq!(header.column(Field::Amount), Some(3));
    }

    #[test]
    fn test_locate_header_respects_accept() {
        let rows = vec![row(&["Date", "Description"])];

        assert!(locate_header(&rows, SPECS, |_| true).is_some());
        assert!(locate_header(&rows, SPECS, |h| h.has(Field::Amount)).is_none());
    }

    #[test]
    fn test_blank_and_total_rows() {
        assert!(is_blank_row(&row(&["", "  "])));
        assert!(!is_blank_row(&row(&["", "x"])));
        assert!(is_total_row(&row(&["", "TOTAL MES", "1.000,00"])));
        assert!(is_total_row(&row(&["", "Total:", "1.000,00"])));
        assert!(is_total_row(&row(&["31/12/2025", "SUBTOTAL", "1.000,00"])));
        assert!(!is_total_row(&row(&["TRANSPORTES", "1.000,00"])));
        assert!(!is_total_row(&row(&["05/12/2025", "TOTALENERGIES ESTACION 4411", "-60,00"])));
        assert!(!is_total_row(&row(&["TOTAL LOGISTICS SL", "05/12/2025", "99,00"])));
    }

    #[test]
    fn test_extract_table_keeps_total_named_movements() {
        let blocks = vec![(
            None,
            vec![
                row(&["Fecha", "Concepto", "Importe"]),
                row(&["05/12/2025", "TOTALENERGIES ESTACION 4411", "-60,00"]),
                row(&["06/12/2025", "RECIBO ENDESA", "-148,29"]),
                row(&["", "TOTAL MES", "-208,29"]),
            ],
        )];

        let descriptions = extract_table(blocks, SPECS, |_| true, |fields, _| {
            fields.get(Field::Description).map(str::to_string)
        });

        assert_eq!(
            descriptions,
            vec!["TOTALENERGIES ESTACION 4411".to_string(), "RECIBO ENDESA".to_string()]
        );
    }

    #[test]
    fn test_extract_table_skips_noise_rows() {
        let blocks = vec![(
            Some("Desembre".to_string()),
            vec![
                row(&["Fecha", "Concepto", "Importe"]),
                row(&["05/12/2025", "RECIBO", "-148,29"]),
                row(&["", "", ""]),
                row(&["", "Total", "-148,29"]),
            ],
        )];

        let records = extract_table(blocks, SPECS, |_| true, |fields, period| {
            Some((
                fields.get(Field::Description).map(str::to_string),
                period.map(str::to_string),
            ))
        });

        assert_eq!(
            records,
            vec![(Some("RECIBO".to_string()), Some("Desembre".to_string()))]
        );
    }
}
