//! Money and count parsing
//!
//! Form inputs hold free text. Everything numeric goes through these helpers
//! so parsing and rounding behave the same in recompute, validation and the
//! submission payload.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::constants::MONEY_SCALE;

/// Parse a decimal amount from user input
///
/// Returns `None` for blank or non-numeric text. Accepts a leading or
/// trailing decimal point (`".5"`, `"10."`) and scientific notation.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut normalized = trimmed.to_string();
    if normalized.starts_with('.') {
        normalized.insert(0, '0');
    } else if let Some(rest) = normalized.strip_prefix("-.") {
        normalized = format!("-0.{}", rest);
    }
    if normalized.ends_with('.') {
        normalized.pop();
    }

    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()
}

/// Parse an amount where blank input counts as zero
///
/// Non-numeric text is still `None`.
pub fn parse_amount_or_zero(raw: &str) -> Option<Decimal> {
    if raw.trim().is_empty() {
        Some(Decimal::ZERO)
    } else {
        parse_amount(raw)
    }
}

/// Parse a whole session count
pub fn parse_sessions(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Round to cents, halves away from zero
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a rounded amount with exactly two decimals
pub fn format_money(amount: Decimal) -> String {
    let mut rounded = round_money(amount);
    rounded.rescale(MONEY_SCALE);
    rounded.to_string()
}

/// Numeric value for the wire, `NaN` when the text does not parse
pub fn amount_to_f64(raw: &str) -> f64 {
    parse_amount(raw)
        .and_then(|d| d.to_f64())
        .unwrap_or(f64::NAN)
}

/// Render a number received from the service back into input text
///
/// Whole values drop their fractional part (`1200.0` becomes `"1200"`).
pub fn f64_to_input(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    Decimal::from_f64(value)
        .map(|d| round_money(d).normalize().to_string())
        .unwrap_or_default()
}
