//! Per-tick scope and expression pipeline.
//!
//! A handler writes its measurement into the scope and then calls
//! [`BindingPipeline::run_tick`], which in order:
//!
//! 1. evaluates the exit expression; when truthy the binding is marked exited,
//!    one `exit` event is queued and nothing else runs until the next `bind`;
//! 2. evaluates every property expression and pushes the value to the host;
//! 3. evaluates every interceptor and queues one `interceptor` event for each
//!    false to true transition.
//!
//! Events are never delivered from inside the pipeline. They are queued and
//! handed out through [`BindingPipeline::take_outputs`] so the caller can release
//! its locks before calling back into script.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use framebind_api_core::{
    BindingRequest, EvalError, EventCallback, EventKind, EventPayload, EventState,
    ExpressionEvaluator, ExpressionHolder, ExpressionPair, Platform, ResolutionTranslator, Scope,
    UpdateContext, Value, ViewHandle,
};

use crate::scope::payload_fields;
use crate::Token;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Properties were consumed (some evaluations may have failed and been skipped).
    Consumed,
    /// The exit expression became truthy on this tick.
    Exited,
    /// Already exited, or never bound.
    Inert,
}

/// Events queued by a handler together with the callback they go to.
#[must_use]
#[derive(Default)]
pub struct Outputs {
    callback: Option<EventCallback>,
    events: Vec<EventPayload>,
}

impl Outputs {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[EventPayload] {
        &self.events
    }

    /// Invoke the callback once per event, in order. A panicking callback is
    /// logged and the remaining events are still delivered.
    pub fn deliver(self) {
        let Some(callback) = self.callback else {
            return;
        };
        for event in self.events {
            let state = event.state();
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(event))) {
                log::error!(
                    "[BindingPipeline] event callback panicked on {:?}: {}",
                    state,
                    panic_message(payload.as_ref())
                );
            }
        }
    }
}

struct BoundProperty {
    holder: ExpressionHolder,
    view: Option<ViewHandle>,
    missing_logged: bool,
}

struct Interceptor {
    name: String,
    expression: ExpressionPair,
    was_true: bool,
}

pub struct BindingPipeline {
    token: Token,
    token_text: String,
    kind: EventKind,
    anchor: Option<String>,
    instance_id: Option<String>,
    scope: Scope,
    props: Vec<BoundProperty>,
    exit: Option<ExpressionPair>,
    interceptors: Vec<Interceptor>,
    exited: bool,
    callback: Option<EventCallback>,
    outbox: Vec<EventPayload>,
    platform: Platform,
    evaluator: Arc<dyn ExpressionEvaluator>,
}

impl BindingPipeline {
    pub fn new(
        token: Token,
        kind: EventKind,
        platform: Platform,
        evaluator: Arc<dyn ExpressionEvaluator>,
    ) -> Self {
        Self {
            token,
            token_text: token.to_string(),
            kind,
            anchor: None,
            instance_id: None,
            scope: Scope::with_constants(),
            props: Vec::new(),
            exit: None,
            interceptors: Vec::new(),
            exited: false,
            callback: None,
            outbox: Vec::new(),
            platform,
            evaluator,
        }
    }

    pub fn token(&self) -> Token {
        self.token
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    pub fn translator(&self) -> &dyn ResolutionTranslator {
        self.platform.translator.as_ref()
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn is_bound(&self) -> bool {
        self.callback.is_some()
    }

    pub fn is_exited(&self) -> bool {
        self.exited
    }

    /// Replace expressions and callback, reset the scope and re-arm exit and interceptors.
    pub fn bind(&mut self, request: &BindingRequest, callback: EventCallback) {
        if request.anchor.is_some() {
            self.anchor = request.anchor.clone();
        }
        if request.instance_id.is_some() {
            self.instance_id = request.instance_id.clone();
        }
        self.scope.clear();
        self.scope.insert_constants();
        self.exit = request.exit_expression.clone();
        self.exited = false;
        self.interceptors = request
            .interceptors
            .iter()
            .map(|(name, expression)| Interceptor {
                name: name.clone(),
                expression: expression.clone(),
                was_true: false,
            })
            .collect();
        self.props = request
            .props
            .iter()
            .filter(|h| !h.expression.is_empty())
            .map(|holder| BoundProperty {
                view: None,
                holder: holder.clone(),
                missing_logged: false,
            })
            .collect();
        for i in 0..self.props.len() {
            self.resolve_target(i);
        }
        self.callback = Some(callback);
        log::debug!(
            "[BindingPipeline] bound {} {}: {} props, exit={}, {} interceptors",
            self.kind,
            self.token_text,
            self.props.len(),
            self.exit.is_some(),
            self.interceptors.len()
        );
    }

    /// Drop expressions, scope contents and callback. Queued events are kept.
    pub fn clear(&mut self) {
        self.scope.clear();
        self.props.clear();
        self.exit = None;
        self.interceptors.clear();
        self.callback = None;
    }

    /// Queue a lifecycle event carrying the kind's fields plus `extra`.
    pub fn emit(&mut self, state: EventState, extra: impl FnOnce(EventPayload) -> EventPayload) {
        if self.callback.is_none() {
            return;
        }
        let payload = self.payload(state);
        let payload = extra(payload);
        log::debug!("[BindingPipeline] {} {} {}", self.kind, self.token_text, state.as_str());
        self.outbox.push(payload);
    }

    pub fn take_outputs(&mut self) -> Outputs {
        Outputs {
            callback: self.callback.clone(),
            events: std::mem::take(&mut self.outbox),
        }
    }

    pub fn run_tick(&mut self) -> TickOutcome {
        if self.exited || self.callback.is_none() {
            return TickOutcome::Inert;
        }

        if let Some(exit) = self.exit.clone() {
            match self.evaluate(&exit) {
                Ok(value) if value.is_truthy() => {
                    self.exited = true;
                    self.emit(EventState::Exit, |p| p);
                    return TickOutcome::Exited;
                }
                Ok(_) => {}
                Err(err) => log::error!(
                    "[BindingPipeline] exit expression '{}' failed: {}",
                    exit.describe(),
                    err
                ),
            }
        }

        self.consume();
        self.intercept();
        TickOutcome::Consumed
    }

    fn consume(&mut self) {
        for i in 0..self.props.len() {
            let result = self.evaluate(&self.props[i].holder.expression);
            let value = match result {
                Ok(value) => value,
                Err(err) => {
                    log::error!(
                        "[BindingPipeline] '{}' for {} failed: {}",
                        self.props[i].holder.expression.describe(),
                        self.props[i].holder.property,
                        err
                    );
                    continue;
                }
            };
            let view = match self.props[i].view {
                Some(view) => view,
                None => match self.resolve_target(i) {
                    Some(view) => view,
                    None => continue,
                },
            };
            let prop = &self.props[i];
            let element = prop
                .holder
                .element
                .as_deref()
                .or(self.anchor.as_deref())
                .unwrap_or_default();
            log::trace!("[BindingPipeline] {} {} <- {:?}", view, prop.holder.property, value);
            let context = UpdateContext {
                kind: self.kind,
                token: &self.token_text,
                element,
            };
            let updater = &self.platform.view_updater;
            let translator = self.platform.translator.as_ref();
            let applied = panic::catch_unwind(AssertUnwindSafe(|| {
                updater.update(
                    view,
                    &prop.holder.property,
                    &value,
                    translator,
                    &prop.holder.config,
                    &context,
                )
            }));
            if let Err(payload) = applied {
                log::error!(
                    "[BindingPipeline] updater failed on {} for {}: {}",
                    prop.holder.property,
                    view,
                    panic_message(payload.as_ref())
                );
            }
        }
    }

    fn intercept(&mut self) {
        for i in 0..self.interceptors.len() {
            let now_true = match self.evaluate(&self.interceptors[i].expression) {
                Ok(value) => value.is_truthy(),
                Err(err) => {
                    log::error!(
                        "[BindingPipeline] interceptor '{}' failed: {}",
                        self.interceptors[i].name,
                        err
                    );
                    continue;
                }
            };
            let fire = now_true && !self.interceptors[i].was_true;
            self.interceptors[i].was_true = now_true;
            if fire {
                let name = self.interceptors[i].name.clone();
                self.emit(EventState::Interceptor, |p| p.with("interceptor", name));
            }
        }
    }

    fn payload(&self, state: EventState) -> EventPayload {
        payload_fields(
            self.kind,
            &self.scope,
            self.platform.translator.as_ref(),
            EventPayload::new(state, self.token_text.clone()),
        )
    }

    fn evaluate(&self, expression: &ExpressionPair) -> Result<Value, EvalError> {
        let evaluator = &self.evaluator;
        let scope = &self.scope;
        panic::catch_unwind(AssertUnwindSafe(|| evaluator.evaluate(expression, scope)))
            .unwrap_or_else(|payload| Err(EvalError::Panicked(panic_message(payload.as_ref()))))
    }

    /// Look up the target view of property `i`; the element falls back to the anchor.
    fn resolve_target(&mut self, i: usize) -> Option<ViewHandle> {
        let anchor = self.anchor.as_deref();
        let instance = self.instance_id.as_deref();
        let prop = &mut self.props[i];
        let element = prop.holder.element.as_deref().or(anchor)?;
        let instance = prop.holder.instance_id.as_deref().or(instance);
        let view = self.platform.view_finder.find_view_by(element, instance);
        match view {
            Some(_) => prop.view = view,
            None if !prop.missing_logged => {
                prop.missing_logged = true;
                log::warn!(
                    "[BindingPipeline] target '{}' for {} not found; skipping until it appears",
                    element,
                    prop.holder.property
                );
            }
            None => {}
        }
        view
    }
}

impl fmt::Debug for BindingPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingPipeline")
            .field("token", &self.token)
            .field("kind", &self.kind)
            .field("anchor", &self.anchor)
            .field("props", &self.props.len())
            .field("exited", &self.exited)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framebind_api_core::JsonAstEvaluator;
    use framebind_test_fixtures::doubles::{EventRecorder, RecordingViewUpdater, StaticViewFinder};

    fn ident(name: &str) -> String {
        format!(r#"{{"type":"Identifier","value":"{name}"}}"#)
    }

    fn gt(name: &str, limit: f64) -> ExpressionPair {
        ExpressionPair::transformed_only(format!(
            r#"{{"type":">","children":[{},{{"type":"NumericLiteral","value":{limit}}}]}}"#,
            ident(name)
        ))
    }

    fn pipeline(updater: Arc<RecordingViewUpdater>) -> BindingPipeline {
        let finder = Arc::new(StaticViewFinder::new().with_view("box", 7));
        BindingPipeline::new(
            Token::new_v4(),
            EventKind::Pan,
            Platform::new(finder, updater),
            Arc::new(JsonAstEvaluator::new()),
        )
    }

    #[test]
    fn consumes_properties_into_the_host() {
        let updater = Arc::new(RecordingViewUpdater::new());
        let mut p = pipeline(updater.clone());
        let request = BindingRequest::new(EventKind::Pan)
            .with_anchor("box")
            .with_prop("opacity", ExpressionPair::transformed_only(ident("internal_x")));
        p.bind(&request, EventRecorder::new().callback());
        p.scope_mut().set_f64("internal_x", 0.25);
        assert_eq!(p.run_tick(), TickOutcome::Consumed);
        let updates = updater.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].view, ViewHandle(7));
        assert_eq!(updates[0].element, "box");
        assert_eq!(updates[0].value, Value::Float(0.25));
    }

    #[test]
    fn interceptors_fire_on_rising_edges_only() {
        let updater = Arc::new(RecordingViewUpdater::new());
        let recorder = EventRecorder::new();
        let mut p = pipeline(updater);
        let request = BindingRequest::new(EventKind::Pan)
            .with_anchor("box")
            .with_interceptor("far", gt("internal_x", 50.0));
        p.bind(&request, recorder.callback());
        for x in [10.0, 60.0, 70.0, 20.0, 80.0] {
            p.scope_mut().set_f64("internal_x", x);
            p.run_tick();
            p.take_outputs().deliver();
        }
        let fired = recorder.of(EventState::Interceptor);
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[0].get("interceptor"), Some(&serde_json::json!("far")));
        assert_eq!(fired[0].get_f64("deltaX"), Some(60.0));
        assert_eq!(fired[1].get_f64("deltaX"), Some(80.0));
    }

    #[test]
    fn exit_stops_consumption_until_rebind() {
        let updater = Arc::new(RecordingViewUpdater::new());
        let recorder = EventRecorder::new();
        let mut p = pipeline(updater.clone());
        let request = BindingRequest::new(EventKind::Pan)
            .with_anchor("box")
            .with_prop("opacity", ExpressionPair::transformed_only(ident("internal_x")))
            .with_exit(gt("internal_x", 5.0));
        p.bind(&request, recorder.callback());

        p.scope_mut().set_f64("internal_x", 1.0);
        assert_eq!(p.run_tick(), TickOutcome::Consumed);
        p.scope_mut().set_f64("internal_x", 9.0);
        assert_eq!(p.run_tick(), TickOutcome::Exited);
        assert_eq!(p.run_tick(), TickOutcome::Inert);
        p.take_outputs().deliver();
        assert_eq!(updater.count(), 1);
        assert_eq!(recorder.states(), vec![EventState::Exit]);

        p.bind(&request, recorder.callback());
        p.scope_mut().set_f64("internal_x", 2.0);
        assert_eq!(p.run_tick(), TickOutcome::Consumed);
        assert_eq!(updater.count(), 2);
    }

    #[test]
    fn failures_are_skipped_and_panics_contained() {
        let updater = Arc::new(RecordingViewUpdater::new());
        let finder = Arc::new(StaticViewFinder::new().with_view("box", 1));
        let evaluator = |pair: &ExpressionPair, _: &Scope| -> Result<Value, EvalError> {
            match pair.transformed.as_deref() {
                Some("boom") => panic!("evaluator exploded"),
                Some("bad") => Err(EvalError::Parse("bad".into())),
                _ => Ok(Value::Float(3.0)),
            }
        };
        let mut p = BindingPipeline::new(
            Token::new_v4(),
            EventKind::Timing,
            Platform::new(finder, updater.clone()),
            Arc::new(evaluator),
        );
        let request = BindingRequest::new(EventKind::Timing)
            .with_anchor("box")
            .with_prop("a", ExpressionPair::transformed_only("boom"))
            .with_prop("b", ExpressionPair::transformed_only("bad"))
            .with_prop("c", ExpressionPair::transformed_only("ok"));
        p.bind(&request, EventRecorder::new().callback());
        assert_eq!(p.run_tick(), TickOutcome::Consumed);
        let updates = updater.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].property, "c");
    }

    #[test]
    fn missing_target_is_retried() {
        let updater = Arc::new(RecordingViewUpdater::new());
        let mut p = pipeline(updater.clone());
        let mut request = BindingRequest::new(EventKind::Pan)
            .with_anchor("box")
            .with_prop("opacity", ExpressionPair::transformed_only(ident("PI")));
        request.props[0].element = Some("ghost".into());
        p.bind(&request, EventRecorder::new().callback());
        p.run_tick();
        p.run_tick();
        assert_eq!(updater.count(), 0);
    }

    #[test]
    fn unbound_pipeline_is_inert_and_silent() {
        let updater = Arc::new(RecordingViewUpdater::new());
        let mut p = pipeline(updater);
        assert_eq!(p.run_tick(), TickOutcome::Inert);
        p.emit(EventState::Start, |e| e);
        assert!(p.take_outputs().is_empty());
    }
}
