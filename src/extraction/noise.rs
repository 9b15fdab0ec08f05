//! Header/footer deny-list applied to candidate texts

use crate::normalize::fold_text;

/// Column titles, balance lines, page footers and account labels of statements
pub const STATEMENT_DENY_TOKENS: &[&str] = &[
    "fecha",
    "f valor",
    "fecha valor",
    "fecha operacion",
    "f operacion",
    "data valor",
    "data operacio",
    "concepto",
    "concepte",
    "descripcion",
    "description",
    "importe",
    "import",
    "amount",
    "saldo",
    "balance",
    "movimientos",
    "moviments",
    "pagina",
    "page",
    "iban",
    "bic",
    "swift",
];

/// Column titles and footers of supplier ledgers
pub const LEDGER_DENY_TOKENS: &[&str] = &[
    "estado",
    "estat",
    "proveedor",
    "proveidor",
    "codigo",
    "codi",
    "fecha",
    "referencia",
    "documento",
    "importe",
    "import",
    "total",
    "saldo",
    "pagina",
    "previsio",
    "prevision",
    "iban",
];

/// Deny-list matcher working on whole words of folded text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseFilter {
    tokens: Vec<String>,
    guard_chars: usize,
}

impl NoiseFilter {
    /// Create a filter from built-in tokens plus caller-supplied ones.
    ///
    /// `guard_chars` is the longest candidate text still checked against
    /// the list.
    pub fn new(tokens: &[&str], extra_tokens: &[String], guard_chars: usize) -> Self {
        let tokens = tokens
            .iter()
            .copied()
            .chain(extra_tokens.iter().map(String::as_str))
            .map(words)
            .filter(|token| !token.is_empty())
            .collect();

        Self {
            tokens,
            guard_chars,
        }
    }

    /// Number of deny tokens appearing as whole words in `text`
    pub fn hits(&self, text: &str) -> usize {
        let padded = format!(" {} ", words(text));
        self.tokens
            .iter()
            .filter(|token| padded.contains(&format!(" {} ", token)))
            .count()
    }

    /// Check if a short candidate text is a header or footer
    pub fn rejects(&self, text: &str) -> bool {
        text.chars().count() <= self.guard_chars && self.hits(text) > 0
    }

    /// Check if a physical line is page furniture rather than record content.
    ///
    /// Short lines need one hit; any line with two or more hits (a row of
    /// column titles) is noise regardless of length.
    pub fn is_noise_line(&self, line: &str) -> bool {
        let hits = self.hits(line);
        hits >= 2 || (hits == 1 && line.chars().count() <= self.guard_chars)
    }
}

/// Folded text reduced to space-separated alphanumeric words
fn words(text: &str) -> String {
    fold_text(text)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
