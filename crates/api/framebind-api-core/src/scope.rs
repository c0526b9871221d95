//! Per-binding key/value scope read by the expression evaluator.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::Value;

/// Mutable variable table for one binding.
///
/// Gesture and physics handlers write their measurements here every tick; the
/// evaluator only ever reads. A scope is never shared between bindings.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Scope {
    inner: HashMap<String, Value>,
}

impl Scope {
    /// Create an empty scope (no constants).
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    /// Create a scope pre-seeded with the global math constants `PI` and `E`.
    pub fn with_constants() -> Self {
        let mut scope = Self::new();
        scope.insert_constants();
        scope
    }

    pub fn insert_constants(&mut self) {
        self.set_f64("PI", std::f64::consts::PI);
        self.set_f64("E", std::f64::consts::E);
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.inner.insert(key.into(), value);
    }

    pub fn set_f64(&mut self, key: impl Into<String>, value: f64) {
        self.inner.insert(key.into(), Value::Float(value));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key)
    }

    /// Numeric read; non-numeric or missing keys yield `None`.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.inner.get(key).and_then(Value::as_f64)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.inner.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.inner.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_seeded() {
        let scope = Scope::with_constants();
        assert_eq!(scope.get_f64("PI"), Some(std::f64::consts::PI));
        assert_eq!(scope.get_f64("E"), Some(std::f64::consts::E));
        assert_eq!(scope.len(), 2);
    }

    #[test]
    fn set_get_remove_clear() {
        let mut scope = Scope::new();
        scope.set_f64("x", 3.0);
        scope.set("flag", Value::Bool(true));
        assert_eq!(scope.get_f64("x"), Some(3.0));
        assert_eq!(scope.get_f64("flag"), None);
        assert!(scope.contains("flag"));
        assert_eq!(scope.remove("x"), Some(Value::Float(3.0)));
        scope.clear();
        assert!(scope.is_empty());
    }
}
