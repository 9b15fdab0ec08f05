//! Compiled line patterns shared by the format descriptors
//!
//! Group names follow [`Field::group_name`](super::Field::group_name).

use regex::Regex;
use std::sync::OnceLock;

/// `05/12/2025`, `5-12-25`, `05.12.2025`
const NUM_DATE: &str = r"\d{1,2}[/.\-]\d{1,2}[/.\-](?:\d{4}|\d{2})";

/// `25-nov-24`, `2 des. 2025`
const NAMED_DATE: &str = r"\d{1,2}[\-\s/.][A-Za-zÀ-ÿ]{3,10}\.?[\-\s/.](?:\d{4}|\d{2})";

/// European amount: `1.234,56`, `-45,30`, `45,30-`
const EU_AMOUNT: &str = r"[-−+]?\s?\d+(?:\.\d{3})*,\d{2}-?";

/// US amount with a dollar sign: `$5.82`, `- $14.05`, `$-1,200.00`
const US_AMOUNT: &str = r"(?:-\s?)?\$\s?-?\d+(?:,\d{3})*\.\d{2}";

/// US amount, dollar sign optional
const US_AMOUNT_RELAXED: &str = r"(?:-\s?)?\$?\s?-?\d+(?:,\d{3})*\.\d{2}";

/// Any number with separators, either notation
const LOOSE_AMOUNT: &str = r"[-−+]?\s?\$?\s?\d[\d.,]*\d-?";

const EURO_MARK: &str = r"\s?(?:€|(?i:eur))";

const CURRENCY_MARK: &str = r"\s?(?:€|\$|(?i:eur|usd))";

const STATUS: &str =
    r"(?i:pendiente|pendent|pagada|pagado|pagat|cobrada|cobrat|vencida|vençuda|parcial|abierta|oberta)";

/// Document reference: digits, letters, digits (`2025/FV/118`, `25-A-0042`)
const DOCUMENT: &str = r"\d{1,6}[/\-]?[A-Za-z]{1,6}[/\-]?\d{1,8}";

macro_rules! pattern {
    ($(#[$meta:meta])* $name:ident => $source:expr) => {
        $(#[$meta])*
        pub fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new(&$source).expect("built-in pattern compiles"))
        }
    };
}

fn any_date() -> String {
    format!("(?:{}|{})", NUM_DATE, NAMED_DATE)
}

pattern! {
    /// Two leading numeric dates opening a record; the rest is description
    dual_date_head => format!(
        r"^(?P<post>{d})\s+(?P<value>{d})(?:\s+(?P<desc>.*))?$",
        d = NUM_DATE
    )
}

pattern! {
    /// One or two leading dates (numeric or with month names)
    single_date_head => format!(
        r"^(?P<post>{d})(?:\s+(?P<value>{d}))?(?:\s+(?P<desc>.*))?$",
        d = any_date()
    )
}

pattern! {
    /// One or two leading numeric dates, read month first
    month_first_head => format!(
        r"^(?P<post>{d})(?:\s+(?P<value>{d}))?(?:\s+(?P<desc>.*))?$",
        d = NUM_DATE
    )
}

pattern! {
    /// Euro amount with currency marker closing a record, optional balance
    euro_tail => format!(
        r"^(?P<desc>.*?)\s*(?P<amount>{a}){m}(?:\s+(?P<balance>{a})(?:{m})?)?\s*$",
        a = EU_AMOUNT,
        m = EURO_MARK
    )
}

pattern! {
    /// Dollar amount closing a record, optional balance
    dollar_tail => format!(
        r"^(?P<desc>.*?)\s*(?P<amount>{a})(?:\s+(?P<balance>{a}))?\s*$",
        a = US_AMOUNT
    )
}

pattern! {
    /// Whole dual-date record on one line, currency marker optional
    dual_date_relaxed => format!(
        r"^(?P<post>{d})\s+(?P<value>{d})\s+(?P<desc>.+?)\s+(?P<amount>{a})(?:{m})?(?:\s+(?P<balance>{a})(?:{m})?)?\s*$",
        d = NUM_DATE,
        a = EU_AMOUNT,
        m = EURO_MARK
    )
}

pattern! {
    /// Whole single-date record on one line, currency marker optional
    single_date_relaxed => format!(
        r"^(?P<post>{d})(?:\s+(?P<value>{d}))?\s+(?P<desc>.+?)\s+(?P<amount>{a})(?:{m})?(?:\s+(?P<balance>{a})(?:{m})?)?\s*$",
        d = any_date(),
        a = EU_AMOUNT,
        m = EURO_MARK
    )
}

pattern! {
    /// Whole month-first record on one line, dollar sign optional
    month_first_relaxed => format!(
        r"^(?P<post>{d})(?:\s+(?P<value>{d}))?\s+(?P<desc>.+?)\s+(?P<amount>{a})(?:\s+(?P<balance>{a}))?\s*$",
        d = NUM_DATE,
        a = US_AMOUNT_RELAXED
    )
}

pattern! {
    /// Last resort: dates, text, any number
    loose_statement_line => format!(
        r"^(?P<post>{d})\s+(?:(?P<value>{d})\s+)?(?P<desc>.+?)\s+(?P<amount>{a})(?:{m})?(?:\s+(?P<balance>{a})(?:{m})?)?\s*$",
        d = any_date(),
        a = LOOSE_AMOUNT,
        m = CURRENCY_MARK
    )
}

pattern! {
    /// Supplier listing line: status, name, code, date, reference, document, amount
    ledger_tail => format!(
        r"^(?:(?P<status>{s})\s+)?(?:(?P<name>.*?)\s+)?(?P<code>\d{{3,10}})\s+(?P<date>{d})\s+(?P<reference>\S+)\s+(?P<document>{doc})\s+(?P<amount>{a}){m}\s*$",
        s = STATUS,
        d = any_date(),
        doc = DOCUMENT,
        a = EU_AMOUNT,
        m = EURO_MARK
    )
}

pattern! {
    /// Supplier listing line with optional reference and any number
    ledger_loose => format!(
        r"^(?:(?P<status>{s})\s+)?(?P<name>.+?)\s+(?P<code>\d{{3,10}})\s+(?P<date>{d})\s+(?:(?P<reference>\S+)\s+)?(?P<document>\S*\d\S*)\s+(?P<amount>{a})(?:{m})?\s*$",
        s = STATUS,
        d = any_date(),
        a = LOOSE_AMOUNT,
        m = CURRENCY_MARK
    )
}

pattern! {
    /// Status token glued to the front of a supplier name
    status_prefix => format!(r"^(?P<status>{s})\s+(?P<name>.+)$", s = STATUS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dual_date_head_and_euro_tail() {
        let head = dual_date_head()
            .captures("04/12/2025 05/12/2025 RECIBO ENDESA -148,29 € 1.141,71 €")
            .unwrap();
        assert_eq!(&head["post"], "04/12/2025");
        assert_eq!(&head["value"], "05/12/2025");

        let tail = euro_tail().captures(&head["desc"]).unwrap();
        assert_eq!(tail["desc"].trim(), "RECIBO ENDESA");
        assert_eq!(&tail["amount"], "-148,29");
        assert_eq!(&tail["balance"], "1.141,71");
    }

    #[test]
    fn test_euro_tail_requires_marker() {
        assert!(euro_tail().captures("RECIBO ENDESA -148,29").is_none());
        assert!(euro_tail().captures("-1.210,00 EUR").is_some());
    }

    #[test]
    fn test_named_month_dates() {
        let caps = single_date_relaxed()
            .captures("25-nov-24 COMPRA TARJETA MERCADONA -45,30 €")
            .unwrap();
        assert_eq!(&caps["post"], "25-nov-24");
        assert_eq!(&caps["desc"], "COMPRA TARJETA MERCADONA");
        assert_eq!(&caps["amount"], "-45,30");
    }

    #[test]
    fn test_dollar_tail() {
        let caps = dollar_tail().captures("WALMART.COM - $14.05").unwrap();
        assert_eq!(caps["desc"].trim(), "WALMART.COM");
        assert_eq!(&caps["amount"], "- $14.05");
    }

    #[test]
    fn test_ledger_tail() {
        let caps = ledger_tail()
            .captures(
                "Pendiente SUMINISTROS GARCIA SL 400123 03/12/2025 ALB-5531 2025/FV/118 1.210,00 €",
            )
            .unwrap();
        assert_eq!(&caps["status"], "Pendiente");
        assert_eq!(&caps["name"], "SUMINISTROS GARCIA SL");
        assert_eq!(&caps["code"], "400123");
        assert_eq!(&caps["date"], "03/12/2025");
        assert_eq!(&caps["reference"], "ALB-5531");
        assert_eq!(&caps["document"], "2025/FV/118");
        assert_eq!(&caps["amount"], "1.210,00");
    }

    #[test]
    fn test_status_prefix() {
        let caps = status_prefix().captures("Pagada TRANSPORTES SL").unwrap();
        assert_eq!(&caps["status"], "Pagada");
        assert_eq!(&caps["name"], "TRANSPORTES SL");
    }
}
