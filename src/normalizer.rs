use crate::schema::{CleanedMap, RawStatement, RawValue, ERROR_KEY, UNKNOWN_SENTINEL};
use log::warn;

/// Converts each raw field into a clean numeric value, or leaves it out.
///
/// Never fails and never produces NaN: a field whose value cannot be
/// resolved to a finite number is omitted from the result, not zeroed.
/// The reserved `error` key is skipped entirely.
pub fn normalize(raw: &RawStatement) -> CleanedMap {
    let mut cleaned = CleanedMap::new();

    for (key, value) in raw.iter() {
        if key == ERROR_KEY {
            continue;
        }

        match resolve_scalar(value) {
            Some(number) => {
                cleaned.insert(key.clone(), number);
            }
            None => {
                warn!("Field '{}' could not be resolved to a number; omitting it", key);
            }
        }
    }

    cleaned
}

fn resolve_scalar(value: &RawValue) -> Option<f64> {
    match value {
        RawValue::Numeric(n) if n.is_finite() => Some(*n),
        RawValue::Numeric(_) => None,
        RawValue::Text(s) => parse_numeric_text(s),
        RawValue::Other(_) => None,
    }
}

/// Parses a string-encoded amount, tolerating currency symbols, thousands
/// separators and trailing annotations. Accounting-style parenthesized
/// amounts are negative: "(1,000)" parses to -1000.
///
/// Returns `None` for the unknown sentinel, empty strings and anything that
/// does not contain a finite number.
pub fn parse_numeric_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == UNKNOWN_SENTINEL {
        return None;
    }

    let parenthesized = trimmed.contains('(') && trimmed.contains(')');

    // Keep digits, one decimal point and a leading minus; drop the rest.
    let mut digits = String::with_capacity(trimmed.len());
    let mut seen_point = false;
    for c in trimmed.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else if c == '.' && !seen_point {
            seen_point = true;
            digits.push(c);
        } else if c == '-' && digits.is_empty() {
            digits.push(c);
        }
    }

    let parsed: f64 = digits.parse().ok()?;
    if !parsed.is_finite() {
        return None;
    }

    Some(if parenthesized { -parsed } else { parsed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RawStatement;

    #[test]
    fn test_numeric_values_copied_unchanged() {
        let raw: RawStatement = [("Revenue", 1000.0), ("Net_Income", -250.5)]
            .into_iter()
            .collect();

        let cleaned = normalize(&raw);
        assert_eq!(cleaned.get("Revenue"), Some(&1000.0));
        assert_eq!(cleaned.get("Net_Income"), Some(&-250.5));
    }

    #[test]
    fn test_string_values_parsed() {
        assert_eq!(parse_numeric_text("1,000"), Some(1000.0));
        assert_eq!(parse_numeric_text("$12,345.67"), Some(12345.67));
        assert_eq!(parse_numeric_text("-42"), Some(-42.0));
        assert_eq!(parse_numeric_text("  1000  "), Some(1000.0));
    }

    #[test]
    fn test_parenthesized_values_are_negative() {
        assert_eq!(parse_numeric_text("(1,000)"), Some(-1000.0));
        assert_eq!(parse_numeric_text("($500.25)"), Some(-500.25));
    }

    #[test]
    fn test_unknown_sentinel_is_unresolved() {
        assert_eq!(parse_numeric_text("Unknown"), None);

        let raw: RawStatement = [("Gross_Profit", "Unknown")].into_iter().collect();
        let cleaned = normalize(&raw);
        assert!(cleaned.is_empty());
    }

    #[test]
    fn test_unparseable_strings_omitted_not_zeroed() {
        assert_eq!(parse_numeric_text("not a number"), None);
        assert_eq!(parse_numeric_text(""), None);
        assert_eq!(parse_numeric_text("N/A"), None);

        let raw: RawStatement = [("Revenue", "garbage"), ("Net_Income", "100")]
            .into_iter()
            .collect();
        let cleaned = normalize(&raw);
        assert!(!cleaned.contains_key("Revenue"));
        assert_eq!(cleaned.get("Net_Income"), Some(&100.0));
    }

    #[test]
    fn test_error_key_excluded() {
        let mut raw = RawStatement::new();
        raw.insert("error", "request failed");
        raw.insert("Revenue", 500.0);

        let cleaned = normalize(&raw);
        assert_eq!(cleaned.len(), 1);
        assert!(!cleaned.contains_key("error"));
    }

    #[test]
    fn test_non_scalar_values_unresolved() {
        let json = r#"{"Revenue": true, "Foo": [1, 2], "Bar": {"x": 1}, "Net_Income": 100}"#;
        let raw: RawStatement = serde_json::from_str(json).unwrap();

        let cleaned = normalize(&raw);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned.get("Net_Income"), Some(&100.0));
    }

    #[test]
    fn test_never_produces_nan() {
        let raw: RawStatement = [
            ("A", RawValue::Numeric(f64::NAN)),
            ("B", RawValue::Numeric(f64::INFINITY)),
            ("C", RawValue::Text("...".to_string())),
        ]
        .into_iter()
        .collect();

        let cleaned = normalize(&raw);
        assert!(cleaned.is_empty());
    }

    #[test]
    fn test_extra_decimal_points_dropped() {
        // Second point is stripped rather than failing the whole field.
        assert_eq!(parse_numeric_text("1.2.3"), Some(1.23));
    }
}
