//! Amount parsing across European and US notations

use bigdecimal::BigDecimal;
use std::str::FromStr;

/// Parse a raw amount into a signed decimal.
///
/// The notation is decided by the last separator: when the last `.` comes
/// after the last `,` the text is read as US notation (`1,234.56`), otherwise
/// as European notation (`1.234,56`). A string repeating a single separator
/// (`1.234.567`) treats it as a thousands mark. Currency symbols, codes and
/// spaces are ignored; a minus sign anywhere (leading, trailing, `- $`) or
/// surrounding parentheses make the amount negative.
///
/// Unparsable input yields zero.
pub fn parse_amount(raw: &str) -> BigDecimal {
    let negative = is_negative(raw);
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let commas = kept.matches(',').count();
    let dots = kept.matches('.').count();
    let last_comma = kept.rfind(',');
    let last_dot = kept.rfind('.');

    let decimal = match (last_comma, last_dot) {
        (None, None) => kept,
        (None, Some(_)) if dots > 1 => kept.replace('.', ""),
        (Some(_), None) if commas > 1 => kept.replace(',', ""),
        (comma, Some(dot)) if comma.is_none_or(|comma| dot > comma) => kept.replace(',', ""),
        _ => kept.replace('.', "").replace(',', "."),
    };

    let decimal = decimal.trim_end_matches('.');
    if decimal.is_empty() {
        return BigDecimal::from(0);
    }

    let decimal = if decimal.starts_with('.') {
        format!("0{}", decimal)
    } else {
        decimal.to_string()
    };

    let value = BigDecimal::from_str(&decimal).unwrap_or_else(|_| BigDecimal::from(0));
    if negative {
        -value
    } else {
        value
    }
}

fn is_negative(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.contains('-')
        || trimmed.contains('\u{2212}')
        || (trimmed.starts_with('(') && trimmed.ends_with(')'))
}

/// Format an amount in European notation with two decimals (`-1.234,56`)
pub fn format_amount(amount: &BigDecimal) -> String {
    let text = amount.round(2).with_scale(2).to_string();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (integer, fraction) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    format!("{}{},{}", sign, grouped, fraction)
}

/// Check if two amounts agree in magnitude within `tolerance`.
///
/// Signs are ignored: ledgers and statements may mirror each other's
/// debit/credit convention. Equal magnitudes always match, otherwise the
/// difference must stay strictly below the tolerance.
pub fn amounts_match(a: &BigDecimal, b: &BigDecimal, tolerance: &BigDecimal) -> bool {
    let difference = (a.abs() - b.abs()).abs();
    difference == BigDecimal::from(0) || difference < *tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_european_and_us_notation() {
        assert_eq!(parse_amount("1.234,56"), dec("1234.56"));
        assert_eq!(parse_amount("1,234.56"), dec("1234.56"));
        assert_eq!(parse_amount("-148,29 EUR"), dec("-148.29"));
        assert_eq!(parse_amount("148,29-"), dec("-148.29"));
        assert_eq!(parse_amount("- $14.05"), dec("-14.05"));
        assert_eq!(parse_amount("$5.82"), dec("5.82"));
        assert_eq!(parse_amount("1.210,00 €"), dec("1210"));
        assert_eq!(parse_amount("(250,00)"), dec("-250"));
        assert_eq!(parse_amount("1.234.567"), dec("1234567"));
        assert_eq!(parse_amount("1,234,567"), dec("1234567"));
        assert_eq!(parse_amount("1234.5"), dec("1234.5"));
    }

    #[test]
    fn test_parse_degrades_to_zero() {
        assert_eq!(parse_amount(""), BigDecimal::from(0));
        assert_eq!(parse_amount("EUR"), BigDecimal::from(0));
        assert_eq!(parse_amount("n/a"), BigDecimal::from(0));
        assert_eq!(parse_amount(".."), BigDecimal::from(0));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(&dec("1234.56")), "1.234,56");
        assert_eq!(format_amount(&dec("-148.29")), "-148,29");
        assert_eq!(format_amount(&dec("1234567.891")), "1.234.567,89");
        assert_eq!(format_amount(&dec("0.5")), "0,50");
        assert_eq!(format_amount(&dec("100")), "100,00");
    }

    #[test]
    fn test_format_then_parse_stays_within_a_cent() {
        let tolerance = dec("0.01");
        let inputs = [
            "1.234,56",
            "1,234.56",
            "-148,29 EUR",
            "- $14.05",
            "0,005",
            "12.345.678,9",
            "99.999",
            "(7,10)",
            "",
        ];

        for input in inputs {
            let parsed = parse_amount(input);
            let reparsed = parse_amount(&format_amount(&parsed));
            let difference = (&reparsed - &parsed).abs();
            assert!(
                difference <= tolerance,
                "{input}: {parsed} reparsed as {reparsed}"
            );
        }
    }

    #[test]
    fn test_amounts_match() {
        let tolerance = dec("0.01");

        assert!(amounts_match(&dec("-148.29"), &dec("148.29"), &tolerance));
        assert!(amounts_match(&dec("148.29"), &dec("148.295"), &tolerance));
        assert!(!amounts_match(&dec("148.29"), &dec("148.30"), &tolerance));
        assert!(!amounts_match(&dec("148.30"), &dec("148.29"), &tolerance));
        assert!(amounts_match(&dec("10"), &dec("10"), &BigDecimal::from(0)));
    }
}
