//! Named fields captured by line patterns and column maps

use regex::Captures;
use std::collections::BTreeMap;

/// Semantic field of a statement or ledger line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    PostingDate,
    ValueDate,
    Description,
    Amount,
    Debit,
    Credit,
    Balance,
    Status,
    Name,
    Code,
    Date,
    Reference,
    Document,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::PostingDate,
        Field::ValueDate,
        Field::Description,
        Field::Amount,
        Field::Debit,
        Field::Credit,
        Field::Balance,
        Field::Status,
        Field::Name,
        Field::Code,
        Field::Date,
        Field::Reference,
        Field::Document,
    ];

    /// Capture group name used for this field in line patterns
    pub fn group_name(&self) -> &'static str {
        match self {
            Field::PostingDate => "post",
            Field::ValueDate => "value",
            Field::Description => "desc",
            Field::Amount => "amount",
            Field::Debit => "debit",
            Field::Credit => "credit",
            Field::Balance => "balance",
            Field::Status => "status",
            Field::Name => "name",
            Field::Code => "code",
            Field::Date => "date",
            Field::Reference => "reference",
            Field::Document => "document",
        }
    }
}

/// Raw text per field for one candidate record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
    values: BTreeMap<Field, String>,
}

impl RawFields {
    /// Create an empty field set
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every named group that participated in a match
    pub fn from_captures(captures: &Captures<'_>) -> Self {
        let mut fields = Self::new();
        for field in Field::ALL {
            if let Some(m) = captures.name(field.group_name()) {
                fields.set(field, m.as_str());
            }
        }
        fields
    }

    /// Non-empty trimmed text of a field
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values
            .get(&field)
            .map(|value| value.as_str())
            .filter(|value| !value.is_empty())
    }

    /// Set a field, replacing any previous value
    pub fn set(&mut self, field: Field, value: &str) {
        self.values.insert(field, value.trim().to_string());
    }

    /// Remove and return a field
    pub fn take(&mut self, field: Field) -> Option<String> {
        self.values.remove(&field)
    }

    /// Append text to a field, separated by a space
    pub fn append(&mut self, field: Field, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let entry = self.values.entry(field).or_default();
        if !entry.is_empty() {
            entry.push(' ');
        }
        entry.push_str(text);
    }

    /// Prepend text to a field, separated by a space
    pub fn prepend(&mut self, field: Field, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let entry = self.values.entry(field).or_default();
        *entry = if entry.is_empty() {
            text.to_string()
        } else {
            format!("{} {}", text, entry)
        };
    }

    /// Fold a closing line into this record: `text_field` is appended, every
    /// other field of `other` overwrites ours
    pub fn merge(&mut self, mut other: RawFields, text_field: Field) {
        if let Some(text) = other.take(text_field) {
            self.append(text_field, &text);
        }
        self.values.extend(other.values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_from_captures_collects_named_groups() {
        let re = Regex::new(r"^(?P<post>\S+)\s+(?P<desc>.*?)\s+(?P<amount>\S+)$").unwrap();
        let caps = re.captures("05/12/2025 RECIBO LUZ -148,29").unwrap();
        let fields = RawFields::from_captures(&caps);

        assert_eq!(fields.get(Field::PostingDate), Some("05/12/2025"));
        assert_eq!(fields.get(Field::Description), Some("RECIBO LUZ"));
        assert_eq!(fields.get(Field::Amount), Some("-148,29"));
        assert_eq!(fields.get(Field::Balance), None);
    }

    #[test]
    fn test_append_prepend_merge() {
        let mut fields = RawFields::new();
        fields.set(Field::Description, "TRANSFERENCIA");
        fields.append(Field::Description, "  A FAVOR DE ");
        fields.prepend(Field::Description, "ORDEN");
        assert_eq!(
            fields.get(Field::Description),
            Some("ORDEN TRANSFERENCIA A FAVOR DE")
        );

        let mut closing = RawFields::new();
        closing.set(Field::Description, "GARCIA SL");
        closing.set(Field::Amount, "-1.210,00");
        fields.merge(closing, Field::Description);

        assert_eq!(
            fields.get(Field::Description),
            Some("ORDEN TRANSFERENCIA A FAVOR DE GARCIA SL")
        );
        assert_eq!(fields.get(Field::Amount), Some("-1.210,00"));
    }

    #[test]
    fn test_empty_values_read_as_missing() {
        let mut fields = RawFields::new();
        fields.set(Field::Balance, "   ");
        assert_eq!(fields.get(Field::Balance), None);
    }
}
