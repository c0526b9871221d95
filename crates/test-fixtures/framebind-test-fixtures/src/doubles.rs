//! In-memory host doubles: a view tree, a property sink and an event recorder.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use framebind_api_core::{
    EvalError, EventCallback, EventPayload, EventState, ExpressionEvaluator, ExpressionPair,
    JsonAstEvaluator, ResolutionTranslator, Scope, UpdateContext, Value, ViewFinder, ViewHandle,
    ViewUpdater,
};
use serde_json::Map;

/// Resolves references from a fixed table.
#[derive(Debug, Default)]
pub struct StaticViewFinder {
    views: Vec<(String, ViewHandle)>,
}

impl StaticViewFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view(mut self, reference: &str, handle: u64) -> Self {
        self.views.push((reference.to_string(), ViewHandle(handle)));
        self
    }
}

impl ViewFinder for StaticViewFinder {
    fn find_view_by(&self, reference: &str, _instance_id: Option<&str>) -> Option<ViewHandle> {
        self.views
            .iter()
            .find(|(r, _)| r == reference)
            .map(|(_, h)| *h)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedUpdate {
    pub view: ViewHandle,
    pub property: String,
    pub value: Value,
    pub element: String,
}

/// Captures every property write.
#[derive(Debug, Default)]
pub struct RecordingViewUpdater {
    updates: Mutex<Vec<RecordedUpdate>>,
}

impl RecordingViewUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<RecordedUpdate> {
        self.updates.lock().map(|u| u.clone()).unwrap_or_default()
    }

    /// Last value written to `property`, as a float.
    pub fn last_f64(&self, property: &str) -> Option<f64> {
        self.updates()
            .iter()
            .rev()
            .find(|u| u.property == property)
            .and_then(|u| u.value.as_f64())
    }

    pub fn count(&self) -> usize {
        self.updates.lock().map(|u| u.len()).unwrap_or(0)
    }
}

impl ViewUpdater for RecordingViewUpdater {
    fn update(
        &self,
        view: ViewHandle,
        property: &str,
        value: &Value,
        _translator: &dyn ResolutionTranslator,
        _config: &Map<String, serde_json::Value>,
        context: &UpdateContext<'_>,
    ) {
        if let Ok(mut updates) = self.updates.lock() {
            updates.push(RecordedUpdate {
                view,
                property: property.to_string(),
                value: value.clone(),
                element: context.element.to_string(),
            });
        }
    }
}

/// Device units are `factor` times logical units.
#[derive(Copy, Clone, Debug)]
pub struct ScaleTranslator(pub f64);

impl ResolutionTranslator for ScaleTranslator {
    fn native_to_web(&self, value: f64) -> f64 {
        value / self.0
    }

    fn web_to_native(&self, value: f64) -> f64 {
        value * self.0
    }
}

/// Collects upstream events in delivery order.
#[derive(Clone, Debug, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<EventPayload>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> EventCallback {
        let events = Arc::clone(&self.events);
        Arc::new(move |payload: EventPayload| {
            if let Ok(mut events) = events.lock() {
                events.push(payload);
            }
        })
    }

    pub fn events(&self) -> Vec<EventPayload> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn states(&self) -> Vec<EventState> {
        self.events().iter().filter_map(EventPayload::state).collect()
    }

    pub fn of(&self, state: EventState) -> Vec<EventPayload> {
        self.events()
            .into_iter()
            .filter(|e| e.state() == Some(state))
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

/// Wraps the AST evaluator and counts calls.
#[derive(Debug, Default)]
pub struct CountingEvaluator {
    inner: JsonAstEvaluator,
    calls: AtomicUsize,
}

impl CountingEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ExpressionEvaluator for CountingEvaluator {
    fn evaluate(&self, expression: &ExpressionPair, scope: &Scope) -> Result<Value, EvalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.evaluate(expression, scope)
    }
}
