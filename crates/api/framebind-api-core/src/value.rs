//! Value: what a scope holds and what an expression produces.
//! Numbers are `f64` so physics and gesture measurements keep full precision.

use serde::{Deserialize, Serialize};

/// Lightweight kind enum for convenience and quick dispatch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Float,
    Bool,
    Text,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Value {
    /// Scalar number
    Float(f64),

    /// Boolean (predicates)
    Bool(bool),

    /// Text; colours such as `rgba(255,0,0,1)` travel this way
    Text(String),
}

impl Value {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::Text(_) => ValueKind::Text,
        }
    }

    /// Convenience constructor
    pub fn f(v: f64) -> Self {
        Value::Float(v)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// JavaScript-like truthiness: non-zero, non-NaN numbers and non-empty text are true.
    pub fn is_truthy(&self) -> bool {
        crate::coercion::to_bool(self)
    }

    /// Convert into the JSON shape the scripting layer expects (bare numbers, bools, strings).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_uses_tagged_lowercase_form() {
        let json = serde_json::to_value(Value::Float(1.5)).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "float", "data": 1.5 }));
        let back: Value = serde_json::from_value(json).unwrap();
        assert_eq!(back, Value::Float(1.5));
    }

    #[test]
    fn nan_serializes_to_null_for_callbacks() {
        assert_eq!(Value::Float(f64::NAN).to_json(), serde_json::Value::Null);
        assert_eq!(Value::Bool(true).to_json(), serde_json::Value::Bool(true));
    }
}
