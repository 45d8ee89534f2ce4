//! Request payloads and their conversion into domain inputs.
//!
//! Numeric fields are lenient: numbers, numeric strings and `null` are
//! accepted, anything else reads as missing.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub mod bills;
pub mod pricing;

fn decimal_from_value(value: &Value) -> Option<Decimal> {
    let raw = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .ok()
}

/// Deserialize an optional decimal, treating malformed input as missing.
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(decimal_from_value))
}

/// Deserialize an optional positive identifier, treating malformed input as missing.
pub fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(decimal_from_value)
        .filter(|id| id.fract().is_zero())
        .and_then(|id| id.to_i32())
        .filter(|id| *id > 0))
}

/// Collapse whitespace runs and strip control characters.
pub(crate) fn sanitize_inline_text(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_whitespace = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !previous_whitespace {
                sanitized.push(' ');
                previous_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            sanitized.push(ch);
            previous_whitespace = false;
        }
    }

    sanitized
}

/// Sanitized text, `None` when nothing is left.
pub(crate) fn sanitize_optional(input: Option<&str>) -> Option<String> {
    input
        .map(sanitize_inline_text)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient_decimal")]
        amount: Option<Decimal>,
        #[serde(default, deserialize_with = "lenient_id")]
        id: Option<i32>,
    }

    fn probe(json: &str) -> Probe {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        let parsed = probe(r#"{"amount": "12.50", "id": 7}"#);
        assert_eq!(parsed.amount, Some(Decimal::new(1250, 2)));
        assert_eq!(parsed.id, Some(7));

        let parsed = probe(r#"{"amount": 3.5, "id": "42"}"#);
        assert_eq!(parsed.amount, Some(Decimal::new(35, 1)));
        assert_eq!(parsed.id, Some(42));
    }

    #[test]
    fn malformed_values_read_as_missing() {
        let parsed = probe(r#"{"amount": "abc", "id": {"nested": true}}"#);
        assert_eq!(parsed.amount, None);
        assert_eq!(parsed.id, None);

        let parsed = probe(r#"{"amount": null, "id": 1.5}"#);
        assert_eq!(parsed.amount, None);
        assert_eq!(parsed.id, None);

        let parsed = probe(r#"{"id": -3}"#);
        assert_eq!(parsed.amount, None);
        assert_eq!(parsed.id, None);
    }

    #[test]
    fn sanitizes_inline_text() {
        assert_eq!(sanitize_inline_text("  Table \t 4\u{7} "), "Table 4");
        assert_eq!(sanitize_optional(Some("   ")), None);
    }
}
