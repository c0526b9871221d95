//! Binding request parsing.
//!
//! Scripts send a loosely-typed JSON object; this module normalizes it into a
//! [`BindingRequest`]. Expressions may arrive either as a bare string (legacy,
//! transformed text only) or as `{ "origin": ..., "transformed": ... }`.

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use crate::{EventKind, ExpressionHolder, ExpressionPair};

/// Errors produced while normalizing a binding request.
#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("binding request must be a JSON object")]
    NotAnObject,
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("unknown event type '{0}'")]
    UnknownKind(String),
    #[error("field '{field}' has the wrong shape: {reason}")]
    Malformed { field: String, reason: String },
}

/// Kind-agnostic description of one binding.
#[derive(Clone, Debug, PartialEq)]
pub struct BindingRequest {
    /// Source element the input comes from. Time-driven kinds may omit it.
    pub anchor: Option<String>,
    pub instance_id: Option<String>,
    pub kind: EventKind,
    pub props: Vec<ExpressionHolder>,
    pub exit_expression: Option<ExpressionPair>,
    /// Named predicates, kept in request order.
    pub interceptors: Vec<(String, ExpressionPair)>,
    pub event_config: Map<String, JsonValue>,
    /// Present when the caller wants to rebind an existing token.
    pub token: Option<String>,
}

impl BindingRequest {
    pub fn new(kind: EventKind) -> Self {
        Self {
            anchor: None,
            instance_id: None,
            kind,
            props: Vec::new(),
            exit_expression: None,
            interceptors: Vec::new(),
            event_config: Map::new(),
            token: None,
        }
    }

    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    pub fn with_prop(mut self, property: &str, expression: ExpressionPair) -> Self {
        self.props.push(ExpressionHolder {
            element: None,
            instance_id: None,
            property: property.to_string(),
            expression,
            config: Map::new(),
        });
        self
    }

    pub fn with_exit(mut self, expression: ExpressionPair) -> Self {
        self.exit_expression = Some(expression);
        self
    }

    pub fn with_interceptor(mut self, name: &str, expression: ExpressionPair) -> Self {
        self.interceptors.push((name.to_string(), expression));
        self
    }

    pub fn with_event_config(mut self, config: Map<String, JsonValue>) -> Self {
        self.event_config = config;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Parse the JSON object scripts send to `bind`.
    pub fn from_json(value: &JsonValue) -> Result<Self, RequestError> {
        let obj = value.as_object().ok_or(RequestError::NotAnObject)?;

        let kind_text = obj
            .get("eventType")
            .and_then(JsonValue::as_str)
            .ok_or(RequestError::MissingField("eventType"))?;
        let kind = kind_text
            .parse::<EventKind>()
            .map_err(|_| RequestError::UnknownKind(kind_text.to_string()))?;

        let mut request = BindingRequest::new(kind);
        request.anchor = optional_string(obj, "anchor")?;
        request.instance_id = optional_string(obj, "instanceId")?;
        request.token = optional_string(obj, "token")?;

        if let Some(props) = obj.get("props") {
            let items = props.as_array().ok_or_else(|| RequestError::Malformed {
                field: "props".into(),
                reason: "expected an array".into(),
            })?;
            for (index, item) in items.iter().enumerate() {
                if let Some(holder) = parse_holder(item, index)? {
                    request.props.push(holder);
                }
            }
        }

        if let Some(exit) = obj.get("exitExpression") {
            let pair = parse_expression_pair(exit).map_err(|reason| RequestError::Malformed {
                field: "exitExpression".into(),
                reason,
            })?;
            if !pair.is_empty() {
                request.exit_expression = Some(pair);
            }
        }

        if let Some(interceptors) = obj.get("interceptors") {
            let map = interceptors
                .as_object()
                .ok_or_else(|| RequestError::Malformed {
                    field: "interceptors".into(),
                    reason: "expected an object of name -> expression".into(),
                })?;
            for (name, expr) in map {
                let pair = parse_expression_pair(expr).map_err(|reason| {
                    RequestError::Malformed {
                        field: format!("interceptors.{name}"),
                        reason,
                    }
                })?;
                if !pair.is_empty() {
                    request.interceptors.push((name.clone(), pair));
                }
            }
        }

        if let Some(cfg) = obj.get("eventConfig").or_else(|| obj.get("options")) {
            match cfg {
                JsonValue::Object(map) => request.event_config = map.clone(),
                JsonValue::Null => {}
                _ => {
                    return Err(RequestError::Malformed {
                        field: "eventConfig".into(),
                        reason: "expected an object".into(),
                    })
                }
            }
        }

        Ok(request)
    }
}

/// Accepts `"expr"` (legacy, transformed only), `{origin, transformed}` or `null`.
pub fn parse_expression_pair(value: &JsonValue) -> Result<ExpressionPair, String> {
    match value {
        JsonValue::Null => Ok(ExpressionPair::default()),
        JsonValue::String(s) => Ok(ExpressionPair::new(None, Some(s.clone()))),
        JsonValue::Object(obj) => {
            let origin = text_or_json(obj.get("origin"))?;
            let transformed = text_or_json(obj.get("transformed"))?;
            Ok(ExpressionPair::new(origin, transformed))
        }
        other => Err(format!("expected string or object, got {other}")),
    }
}

// The transformed form is JSON text, but some callers embed the AST object directly.
fn text_or_json(value: Option<&JsonValue>) -> Result<Option<String>, String> {
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.clone())),
        Some(v @ JsonValue::Object(_)) => Ok(Some(v.to_string())),
        Some(other) => Err(format!("expected string, got {other}")),
    }
}

fn optional_string(obj: &Map<String, JsonValue>, key: &str) -> Result<Option<String>, RequestError> {
    match obj.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) if s.is_empty() => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.clone())),
        Some(JsonValue::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(RequestError::Malformed {
            field: key.to_string(),
            reason: "expected a string".into(),
        }),
    }
}

fn parse_holder(item: &JsonValue, index: usize) -> Result<Option<ExpressionHolder>, RequestError> {
    let field = format!("props[{index}]");
    let obj = item.as_object().ok_or_else(|| RequestError::Malformed {
        field: field.clone(),
        reason: "expected an object".into(),
    })?;
    let property = obj
        .get("property")
        .and_then(JsonValue::as_str)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| RequestError::Malformed {
            field: field.clone(),
            reason: "missing 'property'".into(),
        })?;
    let expression = match obj.get("expression") {
        Some(expr) => parse_expression_pair(expr).map_err(|reason| RequestError::Malformed {
            field: format!("{field}.expression"),
            reason,
        })?,
        None => ExpressionPair::default(),
    };
    if expression.is_empty() {
        log::warn!("[BindingRequest] skipping {field}: empty expression for '{property}'");
        return Ok(None);
    }
    let config = match obj.get("config") {
        Some(JsonValue::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    Ok(Some(ExpressionHolder {
        element: optional_string(obj, "element")?,
        instance_id: optional_string(obj, "instanceId")?,
        property: property.to_string(),
        expression,
        config,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_request() {
        let req = BindingRequest::from_json(&json!({
            "anchor": "box",
            "eventType": "pan",
            "props": [
                { "element": "box", "property": "transform.translateX",
                  "expression": { "origin": "x*2", "transformed": "{}" },
                  "config": { "transform-origin": "center" } },
                { "element": "box", "property": "opacity", "expression": "" }
            ],
            "exitExpression": "{\"type\":\"BooleanLiteral\",\"value\":false}",
            "interceptors": { "half": { "origin": "internal_x>50", "transformed": "{}" } }
        }))
        .unwrap();
        assert_eq!(req.kind, EventKind::Pan);
        assert_eq!(req.anchor.as_deref(), Some("box"));
        assert_eq!(req.props.len(), 1);
        assert_eq!(req.props[0].config["transform-origin"], "center");
        let exit = req.exit_expression.unwrap();
        assert_eq!(exit.origin, None);
        assert!(exit.transformed.is_some());
        assert_eq!(req.interceptors[0].0, "half");
    }

    #[test]
    fn rejects_unknown_kind_and_missing_type() {
        assert_eq!(
            BindingRequest::from_json(&json!({ "eventType": "orientation" })),
            Err(RequestError::UnknownKind("orientation".into()))
        );
        assert_eq!(
            BindingRequest::from_json(&json!({ "anchor": "a" })),
            Err(RequestError::MissingField("eventType"))
        );
        assert_eq!(
            BindingRequest::from_json(&json!([1, 2])),
            Err(RequestError::NotAnObject)
        );
    }

    #[test]
    fn expression_pair_forms() {
        assert!(parse_expression_pair(&json!({ "origin": "", "transformed": "" }))
            .unwrap()
            .is_empty());
        let embedded = parse_expression_pair(&json!({
            "transformed": { "type": "NumericLiteral", "value": 1 }
        }))
        .unwrap();
        assert!(embedded.transformed.unwrap().contains("NumericLiteral"));
        assert!(parse_expression_pair(&json!(3)).is_err());
    }
}
