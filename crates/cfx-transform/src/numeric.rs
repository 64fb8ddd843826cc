//! Lenient numeric coercion of raw JSON values.
//!
//! Coercion never fails: a value that cannot be read as the wanted number
//! becomes `None`.

use serde_json::Value;

/// Parse a string value to a finite f64.
///
/// Handles common numeric formats:
/// - Standard numbers: "123", "-45.67"
/// - Thousands separators: "1,234,567"
/// - Whitespace: "  123  "
/// - Scientific notation: "1.23e5"
///
/// NaN and infinities are rejected.
pub fn parse_numeric(value: &str) -> Option<f64> {
    let parsed: f64 = clean_numeric(value)?.parse().ok()?;
    parsed.is_finite().then_some(parsed)
}

/// Parse a string holding a whole number exactly, without a float detour.
fn parse_integer(value: &str) -> Option<i64> {
    clean_numeric(value)?.parse().ok()
}

fn clean_numeric(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(
        trimmed
            .replace(',', "")
            .replace(' ', "")
            .replace('\u{a0}', ""),
    )
}

/// Read a finite float from a number or a numeric string.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|v| v.is_finite()),
        Value::String(text) => parse_numeric(text),
        _ => None,
    }
}

/// Read a non-negative integer count.
///
/// Accepts integers, integral floats (`1.0e6`) and numeric strings whose
/// value is integral; negative or fractional values yield `None`.
pub fn coerce_count(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return (int >= 0).then_some(int);
            }
            if number.is_u64() {
                // Above i64::MAX.
                return None;
            }
            number.as_f64().and_then(integral)
        }
        Value::String(text) => match parse_integer(text) {
            Some(int) => (int >= 0).then_some(int),
            None => parse_numeric(text).and_then(integral),
        },
        _ => None,
    }
}

fn integral(value: f64) -> Option<i64> {
    let in_range = value >= 0.0 && value < 9.223_372_036_854_776e18;
    (in_range && value.fract() == 0.0).then_some(value as i64)
}
