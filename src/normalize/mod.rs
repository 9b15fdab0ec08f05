//! Field-level normalizers for amounts, dates and free text
//!
//! Nothing in here returns an error: a malformed field degrades to a neutral
//! value (zero, `None`, the trimmed input) so one bad cell never aborts a file.

pub mod currency;
pub mod date;

pub use currency::*;
pub use date::*;

/// Collapse every run of whitespace (including non-breaking spaces) to a single space
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase and strip the Spanish/Catalan diacritics used by statement headers
pub fn fold_text(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter_map(|c| match c {
            'à' | 'á' | 'â' | 'ä' => Some('a'),
            'è' | 'é' | 'ê' | 'ë' => Some('e'),
            'ì' | 'í' | 'î' | 'ï' => Some('i'),
            'ò' | 'ó' | 'ô' | 'ö' => Some('o'),
            'ù' | 'ú' | 'û' | 'ü' => Some('u'),
            'ç' => Some('c'),
            'ñ' => Some('n'),
            '·' => None,
            other => Some(other),
        })
        .collect()
}
