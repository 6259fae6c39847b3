//! Amount normalization for statement fields.

use std::str::FromStr;

use rust_decimal::Decimal;

/// Glyphs standing in for a currency sign. Some issuers' fonts map the rupee
/// sign to a backtick.
const CURRENCY_GLYPHS: [char; 3] = ['₹', '$', '`'];

const CURRENCY_PREFIXES: [&str; 3] = ["rs.", "rs", "inr"];

/// Debit/credit markers printed after balances.
const BALANCE_SUFFIXES: [&str; 2] = ["dr", "cr"];

/// Parse a raw matched amount into a plain decimal.
///
/// Strips whitespace, grouping commas (both `1,234,567.89` and `12,34,567.89`),
/// currency glyphs and prefixes, and a trailing `Dr`/`Cr`. Malformed input
/// yields `None`.
pub fn normalize_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && !CURRENCY_GLYPHS.contains(c))
        .collect();
    let lowered = cleaned.to_lowercase();

    let mut body = lowered.as_str();
    if let Some(rest) = CURRENCY_PREFIXES.iter().find_map(|p| body.strip_prefix(p)) {
        body = rest;
    }
    if let Some(rest) = BALANCE_SUFFIXES.iter().find_map(|s| body.strip_suffix(s)) {
        body = rest;
    }

    if body.is_empty() || !body.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    Decimal::from_str(body).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_grouping_and_currency_variants_agree() {
        for input in ["₹1,23,456.78", "1,23,456.78", "123456.78", " ₹ 123,456.78 "] {
            assert_eq!(normalize_amount(input), Some(dec("123456.78")), "input {:?}", input);
        }
    }

    #[test]
    fn test_prefixes_and_suffixes() {
        assert_eq!(normalize_amount("Rs.12,345.00"), Some(dec("12345.00")));
        assert_eq!(normalize_amount("rs 99.50"), Some(dec("99.50")));
        assert_eq!(normalize_amount("INR 1,000.00"), Some(dec("1000.00")));
        assert_eq!(normalize_amount("`5,120.00"), Some(dec("5120.00")));
        assert_eq!(normalize_amount("2,500.00 Dr"), Some(dec("2500.00")));
        assert_eq!(normalize_amount("$10.01"), Some(dec("10.01")));
    }

    #[test]
    fn test_malformed_is_absent() {
        assert_eq!(normalize_amount(""), None);
        assert_eq!(normalize_amount("₹"), None);
        assert_eq!(normalize_amount("Rs."), None);
        assert_eq!(normalize_amount("1.2.3"), None);
        assert_eq!(normalize_amount("twelve"), None);
    }
}
