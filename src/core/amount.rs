//! Loose numeric coercion for model-extracted amounts.
//!
//! Extracted fields arrive as numbers, as text such as `"$1,234.50"`, as
//! `null`, or not at all. Coercion is total: anything that does not read as
//! a finite amount becomes `0.0`.

use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

/// Coerce a loosely typed JSON value into an amount.
///
/// * numbers are returned as `f64`
/// * strings have every `,` and `$` removed, then are parsed as a decimal
/// * everything else (null, bool, arrays, objects, unparseable text) is `0.0`
pub fn coerce_amount(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::String(s) => parse_amount_text(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Coerce an optional value; absent means `0.0`.
pub fn coerce_opt(value: Option<&Value>) -> f64 {
    value.map(coerce_amount).unwrap_or(0.0)
}

fn parse_amount_text(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != ',' && *c != '$').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    // Exact decimal first; scientific notation and out-of-range magnitudes
    // fall through to the float parser.
    if let Ok(dec) = Decimal::from_str(cleaned) {
        return dec.to_f64().filter(|v| v.is_finite());
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format an amount with two decimals and comma thousands separators.
///
/// Rounds half away from zero: `0.125` → `"0.13"`. Magnitudes beyond
/// [`Decimal::MAX`] are formatted from the float and grouped the same way;
/// `NaN` and infinities print as Rust shows them.
pub fn format_amount(value: f64) -> String {
    let (negative, digits) = match Decimal::from_f64(value) {
        Some(dec) => {
            let rounded = dec.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            let mut magnitude = rounded.abs();
            magnitude.rescale(2);
            (
                rounded.is_sign_negative() && !rounded.is_zero(),
                magnitude.to_string(),
            )
        }
        None if value.is_finite() => (value < 0.0, format!("{:.2}", value.abs())),
        None => return value.to_string(),
    };

    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}
