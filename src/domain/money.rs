//! Decimal helpers shared by the domain, the storage layer and the totals engine.
//!
//! Monetary values are rounded to two decimal places, half away from zero.
//! Storage keeps money as integer cents and percentages as decimal text.

use std::str::FromStr;

use rust_decimal::prelude::*;

/// Number of decimal places kept for monetary values.
pub const MONEY_SCALE: u32 = 2;

/// Round a monetary value to cents, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a monetary value to integer cents.
///
/// Values outside the `i64` cent range collapse to zero; the totals engine
/// rejects such amounts before they reach storage.
pub fn to_cents(value: Decimal) -> i64 {
    round_money(value)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .unwrap_or_default()
}

/// Convert integer cents back to a monetary value.
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, MONEY_SCALE)
}

/// Parse a decimal stored as text. Malformed values read as zero.
pub fn parse_decimal(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .unwrap_or_else(|err| {
            log::warn!("Malformed decimal value {raw:?}: {err}");
            Decimal::ZERO
        })
}

/// Render a decimal for text storage without trailing zeros.
pub fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_money(Decimal::new(5, 3)), Decimal::new(1, 2));
        assert_eq!(round_money(Decimal::new(4, 3)), Decimal::ZERO);
        assert_eq!(round_money(Decimal::new(-125, 3)), Decimal::new(-13, 2));
    }

    #[test]
    fn converts_between_cents_and_decimal() {
        assert_eq!(to_cents(Decimal::new(21780, 2)), 21780);
        assert_eq!(to_cents(Decimal::new(99995, 4)), 1000);
        assert_eq!(from_cents(990), Decimal::new(99, 1));
    }

    #[test]
    fn parses_stored_percentages() {
        assert_eq!(parse_decimal("12.5"), Decimal::new(125, 1));
        assert_eq!(parse_decimal(" 5 "), Decimal::from(5));
        assert_eq!(parse_decimal("not a number"), Decimal::ZERO);
        assert_eq!(format_decimal(Decimal::new(1250, 2)), "12.5");
    }
}
