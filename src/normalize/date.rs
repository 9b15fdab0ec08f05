//! Date parsing into the canonical `DD/MM/YYYY` form

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::fold_text;

/// Canonical output pattern for every date leaving the crate
pub const CANONICAL_FORMAT: &str = "%d/%m/%Y";

/// Largest value accepted as a spreadsheet serial (31/12/9999)
const MAX_SERIAL: f64 = 2_958_465.0;

/// Order of day and month in purely numeric dates of a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// `DD/MM/YYYY`, the default for European statements
    #[default]
    DayFirst,
    /// `MM/DD/YYYY`, only when a source declares it
    MonthFirst,
}

/// Month names and abbreviations (Spanish, Catalan, English), already folded
const MONTH_NAMES: &[(&str, u32)] = &[
    ("ene", 1),
    ("enero", 1),
    ("gen", 1),
    ("gener", 1),
    ("jan", 1),
    ("january", 1),
    ("feb", 2),
    ("febrero", 2),
    ("febr", 2),
    ("febrer", 2),
    ("february", 2),
    ("mar", 3),
    ("marzo", 3),
    ("marc", 3),
    ("march", 3),
    ("abr", 4),
    ("abril", 4),
    ("apr", 4),
    ("april", 4),
    ("may", 5),
    ("mayo", 5),
    ("maig", 5),
    ("jun", 6),
    ("junio", 6),
    ("juny", 6),
    ("june", 6),
    ("jul", 7),
    ("julio", 7),
    ("juliol", 7),
    ("july", 7),
    ("ago", 8),
    ("agosto", 8),
    ("ag", 8),
    ("agost", 8),
    ("aug", 8),
    ("august", 8),
    ("sep", 9),
    ("sept", 9),
    ("septiembre", 9),
    ("setiembre", 9),
    ("set", 9),
    ("setembre", 9),
    ("september", 9),
    ("oct", 10),
    ("octubre", 10),
    ("october", 10),
    ("nov", 11),
    ("noviembre", 11),
    ("novembre", 11),
    ("november", 11),
    ("dic", 12),
    ("diciembre", 12),
    ("des", 12),
    ("desembre", 12),
    ("dec", 12),
    ("december", 12),
];

/// Look up a month by (possibly accented, any case) name or abbreviation
pub fn month_from_name(name: &str) -> Option<u32> {
    let folded = fold_text(name.trim().trim_end_matches('.'));
    MONTH_NAMES
        .iter()
        .find(|(token, _)| *token == folded)
        .map(|(_, month)| *month)
}

/// Expand a two-digit year: below 50 is 20xx, otherwise 19xx
pub fn expand_two_digit_year(year: i32) -> i32 {
    if year < 50 {
        2000 + year
    } else {
        1900 + year
    }
}

/// Convert a spreadsheet serial (days since 1899-12-30) to a date
pub fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_SERIAL {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Format a date in the canonical `DD/MM/YYYY` form
pub fn format_date(date: NaiveDate) -> String {
    date.format(CANONICAL_FORMAT).to_string()
}

/// Days between two dates, ignoring direction
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (a - b).num_days().abs()
}

/// Check if two dates fall in the same calendar month of the same year
pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Date parser bound to the numeric day/month convention of one source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateNormalizer {
    order: DateOrder,
}

impl DateNormalizer {
    /// Create a normalizer for the given numeric convention
    pub fn new(order: DateOrder) -> Self {
        Self { order }
    }

    /// Numeric convention this normalizer reads
    pub fn order(&self) -> DateOrder {
        self.order
    }

    /// Parse a raw date.
    ///
    /// Accepts `DD/MM/YYYY`, `DD-MM-YY`, `DD.MM.YYYY`, `DD-monthName-YY`,
    /// `monthName DD YYYY`, ISO `YYYY-MM-DD`, spreadsheet serials and
    /// spreadsheet datetime text (`2025-12-05 00:00:00`).
    pub fn parse(&self, raw: &str) -> Option<NaiveDate> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(serial) = parse_serial(trimmed) {
            return from_serial(serial);
        }

        // Drop a trailing time component
        let date_part: String = trimmed
            .split_whitespace()
            .map(|token| match token.split_once('T') {
                Some((date, time)) if time.contains(':') => date,
                _ => token,
            })
            .filter(|token| !token.contains(':'))
            .collect::<Vec<_>>()
            .join(" ");

        let parts: Vec<&str> = date_part
            .split(|c: char| matches!(c, '/' | '-' | '.' | ',') || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .collect();
        if parts.len() != 3 {
            return None;
        }

        let (day, month, year) = if is_year(parts[0]) && parts[0].len() == 4 {
            (
                parts[2].parse().ok()?,
                parse_month(parts[1])?,
                parts[0],
            )
        } else if parts[0].chars().all(char::is_alphabetic) {
            (parts[1].parse().ok()?, month_from_name(parts[0])?, parts[2])
        } else if parts[1].chars().all(char::is_alphabetic) {
            (parts[0].parse().ok()?, month_from_name(parts[1])?, parts[2])
        } else {
            match self.order {
                DateOrder::DayFirst => (parts[0].parse().ok()?, parts[1].parse().ok()?, parts[2]),
                DateOrder::MonthFirst => (parts[1].parse().ok()?, parts[0].parse().ok()?, parts[2]),
            }
        };

        let year = parse_year(year)?;
        NaiveDate::from_ymd_opt(year, month, day)
    }

    /// Normalize a raw date to `DD/MM/YYYY`, falling back to the trimmed input
    pub fn normalize(&self, raw: &str) -> String {
        self.parse(raw)
            .map(format_date)
            .unwrap_or_else(|| raw.trim().to_string())
    }
}

fn parse_serial(text: &str) -> Option<f64> {
    let (integer, fraction) = text.split_once('.').unwrap_or((text, ""));
    let digits_only = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if integer.is_empty() || integer.len() > 7 || !digits_only(integer) || !digits_only(fraction) {
        return None;
    }
    text.parse().ok()
}

fn is_year(part: &str) -> bool {
    (part.len() == 2 || part.len() == 4) && part.chars().all(|c| c.is_ascii_digit())
}

fn parse_month(part: &str) -> Option<u32> {
    if part.chars().all(|c| c.is_ascii_digit()) {
        part.parse().ok()
    } else {
        month_from_name(part)
    }
}

fn parse_year(part: &str) -> Option<i32> {
    if !is_year(part) {
        return None;
    }
    let year: i32 = part.parse().ok()?;
    if part.len() == 2 {
        Some(expand_two_digit_year(year))
    } else {
        Some(year)
    }
}

/// Serde adapter storing dates as canonical `DD/MM/YYYY` strings
pub mod canonical {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{format_date, CANONICAL_FORMAT};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, CANONICAL_FORMAT).map_err(serde::de::Error::custom)
    }
}
