//! Expression pairs, property holders and the evaluator seam.

use serde::{Deserialize, Serialize};
use serde_json::Map;
use thiserror::Error;

use crate::{Scope, Value};

/// Authored expression text plus the pre-compiled form that actually gets evaluated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionPair {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformed: Option<String>,
}

impl ExpressionPair {
    pub fn new(origin: Option<String>, transformed: Option<String>) -> Self {
        Self {
            origin: origin.filter(|s| !s.is_empty()),
            transformed: transformed.filter(|s| !s.is_empty()),
        }
    }

    /// Legacy form: only the transformed text is known.
    pub fn transformed_only(transformed: impl Into<String>) -> Self {
        Self::new(None, Some(transformed.into()))
    }

    pub fn is_empty(&self) -> bool {
        self.origin.is_none() && self.transformed.is_none()
    }

    /// Text for diagnostics: origin when present, transformed otherwise.
    pub fn describe(&self) -> &str {
        self.origin
            .as_deref()
            .or(self.transformed.as_deref())
            .unwrap_or("<empty>")
    }
}

/// One bound property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionHolder {
    /// Element reference the property lives on; falls back to the binding anchor when absent.
    #[serde(default)]
    pub element: Option<String>,
    #[serde(default)]
    pub instance_id: Option<String>,
    pub property: String,
    pub expression: ExpressionPair,
    #[serde(default)]
    pub config: Map<String, serde_json::Value>,
}

#[derive(Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("expression is empty")]
    Empty,
    #[error("malformed expression: {0}")]
    Parse(String),
    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),
    #[error("unsupported node type '{0}'")]
    UnsupportedNode(String),
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("function '{name}' expects {expected} arguments, got {got}")]
    Arity {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("evaluator panicked: {0}")]
    Panicked(String),
}

/// Pure function `(expression, scope) -> value`.
///
/// Implementations must not retain the scope. The binding pipeline contains
/// panics raised from here, so a faulty evaluator costs a tick, not a binding.
pub trait ExpressionEvaluator: Send + Sync {
    fn evaluate(&self, expression: &ExpressionPair, scope: &Scope) -> Result<Value, EvalError>;
}

impl<F> ExpressionEvaluator for F
where
    F: Fn(&ExpressionPair, &Scope) -> Result<Value, EvalError> + Send + Sync,
{
    fn evaluate(&self, expression: &ExpressionPair, scope: &Scope) -> Result<Value, EvalError> {
        self(expression, scope)
    }
}
