//! Coercion helpers between Value kinds.
//! Expressions mix numbers and booleans freely, so both directions are needed.

use crate::Value;

/// Attempt to coerce a Value into a scalar f64.
/// Rules:
/// - Float -> its value
/// - Bool -> 1.0 / 0.0
/// - Text -> parsed number, NaN when not numeric
pub fn to_float(v: &Value) -> f64 {
    match v {
        Value::Float(f) => *f,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
    }
}

/// Coerce a Value to a boolean.
/// - Float -> false for 0 and NaN
/// - Text -> false when empty
pub fn to_bool(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Float(f) => *f != 0.0 && !f.is_nan(),
        Value::Text(s) => !s.is_empty(),
    }
}
