//! Upstream event payloads.
//!
//! Every lifecycle event handed to the scripting layer is a flat JSON object that
//! always carries `state` and `token`; the remaining keys depend on the binding kind.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Upstream sink for lifecycle events. Invoked outside any binding lock.
pub type EventCallback = Arc<dyn Fn(EventPayload) + Send + Sync>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventState {
    Start,
    End,
    Cancel,
    Exit,
    Interceptor,
}

impl EventState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventState::Start => "start",
            EventState::End => "end",
            EventState::Cancel => "cancel",
            EventState::Exit => "exit",
            EventState::Interceptor => "interceptor",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventPayload(Map<String, JsonValue>);

impl EventPayload {
    pub fn new(state: EventState, token: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert("state".into(), JsonValue::String(state.as_str().into()));
        map.insert("token".into(), JsonValue::String(token.into()));
        Self(map)
    }

    /// Builder-style insert. Non-finite floats become `null`.
    pub fn with(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn with_f64(self, key: &str, value: f64) -> Self {
        let json = serde_json::Number::from_f64(value)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null);
        self.with(key, json)
    }

    pub fn state(&self) -> Option<EventState> {
        self.0
            .get("state")
            .and_then(|s| serde_json::from_value(s.clone()).ok())
    }

    pub fn token(&self) -> Option<&str> {
        self.0.get("token").and_then(JsonValue::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(JsonValue::as_f64)
    }

    pub fn as_map(&self) -> &Map<String, JsonValue> {
        &self.0
    }

    pub fn into_json(self) -> JsonValue {
        JsonValue::Object(self.0)
    }
}
