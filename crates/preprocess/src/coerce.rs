//! Total numeric coercion.
//!
//! Applicant-entered numbers arrive as JSON numbers, locale-formatted
//! strings ("12,500"), or garbage. Coercion never fails: anything that
//! cannot be read as a finite float becomes the caller's default.

use serde_json::Value;

/// Attempts to read a JSON value as a finite float.
///
/// Numbers convert directly. Strings are parsed as-is, then retried with
/// thousands separators stripped. Nulls, booleans, and structured values
/// yield `None`, as do NaN/infinite parses.
#[must_use]
pub fn try_to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_float_str(s),
        _ => None,
    }
}

/// Coerces an optional JSON value to a float, falling back to `default`.
#[must_use]
pub fn to_float(value: Option<&Value>, default: f64) -> f64 {
    value.and_then(try_to_float).unwrap_or(default)
}

fn parse_float_str(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    let direct = trimmed.parse::<f64>().ok();
    // Retry with thousands separators stripped ("1,250.50" -> "1250.50").
    let parsed = direct.or_else(|| trimmed.replace(',', "").parse::<f64>().ok())?;
    parsed.is_finite().then_some(parsed)
}
