//! Numeric coercion for currency-formatted and loosely-typed values.
//!
//! Dataset prices arrive as display strings (`"₹12,34,500"`), and request
//! fields may be JSON numbers or numeric strings. Nothing downstream trusts a
//! price to already be numeric; callers re-parse through [`parse_price`].

use serde_json::Value;

/// Symbols stripped from prices and budgets before parsing.
const CURRENCY_SYMBOLS: &[char] = &['₹', '$', '€', '£'];

/// Parse a currency-formatted price string.
///
/// Thousands separators and currency symbols are removed, surrounding
/// whitespace trimmed. Returns `None` for empty, unparseable or non-finite
/// values.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !CURRENCY_SYMBOLS.contains(c))
        .collect();
    parse_finite(cleaned.trim())
}

/// Parse a plain numeric string, rejecting NaN and infinities.
pub fn parse_finite(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce a JSON value (number or numeric string) to `f64`.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_finite(s),
        _ => None,
    }
}

/// Integer coercion used by result projection: truncates like `int(float(x))`,
/// degrading to `default` when the value does not parse.
pub fn coerce_int(raw: &str, default: i64) -> i64 {
    parse_finite(raw).map(|v| v.trunc() as i64).unwrap_or(default)
}

/// Round to two decimal places.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_indian_grouping() {
        assert_eq!(parse_price("₹12,34,500"), Some(1234500.0));
    }

    #[test]
    fn test_parse_price_variants() {
        assert_eq!(parse_price(" 45,00,000 "), Some(4500000.0));
        assert_eq!(parse_price("$1,250.50"), Some(1250.5));
        assert_eq!(parse_price("7500"), Some(7500.0));
    }

    #[test]
    fn test_parse_price_rejects_garbage() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("₹"), None);
        assert_eq!(parse_price("Price on request"), None);
        assert_eq!(parse_price("NaN"), None);
        assert_eq!(parse_price("inf"), None);
    }

    #[test]
    fn test_coerce_f64_accepts_numbers_and_strings() {
        assert_eq!(coerce_f64(&json!(2)), Some(2.0));
        assert_eq!(coerce_f64(&json!("850.5")), Some(850.5));
        assert_eq!(coerce_f64(&json!("two")), None);
        assert_eq!(coerce_f64(&json!(null)), None);
        assert_eq!(coerce_f64(&json!([1])), None);
    }

    #[test]
    fn test_coerce_int_truncates_and_defaults() {
        assert_eq!(coerce_int("3.0", 0), 3);
        assert_eq!(coerce_int("1200.9", 0), 1200);
        assert_eq!(coerce_int("", 0), 0);
        assert_eq!(coerce_int("n/a", 0), 0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(50.0), 50.0);
    }
}
