//! Host-facing entry point.
//!
//! `BindingCore` turns binding requests into live handlers, keeps them in a
//! [`BindingRegistry`], and routes host input (pointer streams, scroll samples,
//! frame pulses) to the bindings that listen for it. Upstream callbacks always
//! run after the handler's lock has been released, so a callback may call back
//! into the core (for example to unbind itself).

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::Context;
use framebind_animation_core::{FrameCaps, RenderThread};
use framebind_api_core::{
    BindingRequest, EventCallback, EventKind, ExpressionEvaluator, Platform, ViewHandle,
};
use framebind_gesture_core::{PointerEvent, ScrollEvent};
use hashbrown::HashMap;
use serde_json::Value as JsonValue;

use crate::handlers::{BindingLifecycle, EventHandler, HandlerContext};
use crate::pipeline::Outputs;
use crate::registry::{BindingRegistry, RegistryEntry, SharedHandler};
use crate::{BindError, CoreConfig, Token};

/// Builds a fresh handler for one binding.
pub type HandlerFactory = fn(Token, &HandlerContext) -> EventHandler;

pub struct BindingCore {
    ctx: HandlerContext,
    registry: Arc<BindingRegistry>,
    factories: HashMap<EventKind, HandlerFactory>,
}

impl BindingCore {
    /// Core with every built-in kind registered and a private registry.
    pub fn new(
        platform: Platform,
        evaluator: Arc<dyn ExpressionEvaluator>,
        config: CoreConfig,
    ) -> Self {
        let mut core = Self {
            ctx: HandlerContext {
                platform,
                evaluator,
                config,
                caps: FrameCaps::default(),
                render: None,
            },
            registry: Arc::new(BindingRegistry::new()),
            factories: HashMap::new(),
        };
        core.register(EventKind::Pan, |t, c| EventHandler::for_kind(EventKind::Pan, t, c));
        core.register(EventKind::Pinch, |t, c| EventHandler::for_kind(EventKind::Pinch, t, c));
        core.register(EventKind::Rotation, |t, c| {
            EventHandler::for_kind(EventKind::Rotation, t, c)
        });
        core.register(EventKind::Scroll, |t, c| EventHandler::for_kind(EventKind::Scroll, t, c));
        core.register(EventKind::Timing, |t, c| EventHandler::for_kind(EventKind::Timing, t, c));
        core.register(EventKind::Spring, |t, c| EventHandler::for_kind(EventKind::Spring, t, c));
        core
    }

    /// Share an externally owned registry.
    pub fn with_registry(mut self, registry: Arc<BindingRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Build every scheduler on this render thread.
    pub fn with_render_thread(mut self, render: RenderThread) -> Self {
        self.ctx.render = Some(render);
        self
    }

    pub fn with_caps(mut self, caps: FrameCaps) -> Self {
        self.ctx.caps = caps;
        self
    }

    /// Register or replace the factory for `kind`.
    pub fn register(&mut self, kind: EventKind, factory: HandlerFactory) {
        self.factories.insert(kind, factory);
    }

    pub fn unregister(&mut self, kind: EventKind) -> bool {
        self.factories.remove(&kind).is_some()
    }

    /// Registered kinds in declaration order.
    pub fn supported_kinds(&self) -> Vec<EventKind> {
        EventKind::ALL
            .iter()
            .copied()
            .filter(|k| self.factories.contains_key(k))
            .collect()
    }

    pub fn config(&self) -> &CoreConfig {
        &self.ctx.config
    }

    pub fn registry(&self) -> &Arc<BindingRegistry> {
        &self.registry
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn is_bound(&self, token: &Token) -> bool {
        self.registry.contains(token)
    }

    /// Create a binding, or rebind the one addressed by `request.token` (or by
    /// anchor and kind) when it is still live.
    pub fn bind(&self, request: &BindingRequest, callback: EventCallback) -> Result<Token, BindError> {
        if let Some(token) = self.existing(request)? {
            if let Some(entry) = self.registry.get(&token) {
                log::debug!("[BindingCore] rebind {} {}", request.kind, token);
                let outputs = {
                    let mut handler = lock(&entry.handler);
                    handler.on_bind(request, callback);
                    handler.take_outputs()
                };
                outputs.deliver();
                return Ok(token);
            }
        }

        let factory = *self
            .factories
            .get(&request.kind)
            .ok_or(BindError::UnsupportedKind(request.kind))?;
        if !request.kind.is_time_driven() && request.anchor.is_none() {
            return Err(BindError::MissingAnchor(request.kind));
        }
        let max = self.ctx.config.max_bindings;
        if max > 0 && self.registry.len() >= max {
            log::warn!("[BindingCore] refusing {} binding: limit {} reached", request.kind, max);
            return Err(BindError::CapacityExceeded(max));
        }

        let token = Token::new_v4();
        let mut handler = factory(token, &self.ctx);
        let anchor = request.anchor.as_deref();
        if !handler.on_create(anchor, request.instance_id.as_deref()) {
            handler.on_destroy();
            return Err(BindError::SourceNotFound {
                anchor: anchor.unwrap_or_default().to_string(),
            });
        }
        handler.on_start();
        handler.on_bind(request, callback);
        let outputs = handler.take_outputs();
        self.registry.insert(
            token,
            RegistryEntry {
                kind: request.kind,
                anchor: request.anchor.clone(),
                handler: Arc::new(Mutex::new(handler)),
            },
        );
        log::debug!("[BindingCore] bound {} {}", request.kind, token);
        outputs.deliver();
        Ok(token)
    }

    /// Parse a script request and bind it. Returns the token as text.
    pub fn bind_json(&self, request: &JsonValue, callback: EventCallback) -> anyhow::Result<String> {
        let request = BindingRequest::from_json(request).context("invalid binding request")?;
        let token = self
            .bind(&request, callback)
            .with_context(|| format!("failed to bind {} binding", request.kind))?;
        Ok(token.to_string())
    }

    /// Disable and destroy one binding. Unknown tokens are a no-op.
    pub fn unbind(&self, token: &Token) -> bool {
        match self.registry.remove(token) {
            Some(entry) => {
                release(*token, &entry.handler);
                true
            }
            None => {
                log::debug!("[BindingCore] unbind of unknown token {}", token);
                false
            }
        }
    }

    /// Token given as text, as scripts hold it.
    pub fn unbind_str(&self, token: &str) -> bool {
        match token.parse::<Token>() {
            Ok(token) => self.unbind(&token),
            Err(_) => {
                log::warn!("[BindingCore] unbind with malformed token '{}'", token);
                false
            }
        }
    }

    /// Legacy unbind by source reference and kind.
    pub fn unbind_by_source(&self, anchor: &str, kind: EventKind) -> bool {
        match self.registry.find_by_source(anchor, kind) {
            Some(token) => self.unbind(&token),
            None => false,
        }
    }

    /// Release every binding, firing `end` for the active ones.
    pub fn unbind_all(&self) {
        let entries = self.registry.drain();
        log::debug!("[BindingCore] releasing {} bindings", entries.len());
        for (token, entry) in entries {
            release(token, &entry.handler);
        }
    }

    /// Route a pointer event to the bindings whose source is `view`.
    pub fn on_pointer_event(&self, view: ViewHandle, event: &PointerEvent) {
        self.for_each(|handler| {
            if handler.source_view() == Some(view) {
                handler.on_pointer(event);
            }
        });
    }

    pub fn on_scroll(&self, view: ViewHandle, event: &ScrollEvent) {
        self.for_each(|handler| {
            if handler.source_view() == Some(view) {
                handler.on_scroll(event);
            }
        });
    }

    /// Forward a host frame pulse (vsync or timer) to every time-driven binding.
    pub fn on_frame(&self, now: Duration) {
        self.for_each(|handler| handler.on_frame(now));
    }

    pub fn pause(&self) {
        self.for_each(|handler| handler.on_pause());
    }

    pub fn resume(&self) {
        self.for_each(|handler| handler.on_resume());
    }

    fn existing(&self, request: &BindingRequest) -> Result<Option<Token>, BindError> {
        if let Some(text) = request.token.as_deref() {
            let token = text
                .parse::<Token>()
                .map_err(|_| BindError::BadToken(text.to_string()))?;
            return Ok(match self.registry.get(&token) {
                Some(entry) if entry.kind == request.kind => Some(token),
                Some(entry) => {
                    log::warn!(
                        "[BindingCore] token {} is a {} binding, not {}; binding anew",
                        token,
                        entry.kind,
                        request.kind
                    );
                    None
                }
                None => None,
            });
        }
        Ok(request
            .anchor
            .as_deref()
            .and_then(|anchor| self.registry.find_by_source(anchor, request.kind)))
    }

    fn for_each(&self, mut f: impl FnMut(&mut EventHandler)) {
        for (_, entry) in self.registry.snapshot() {
            let outputs: Outputs = {
                let mut handler = lock(&entry.handler);
                f(&mut *handler);
                handler.take_outputs()
            };
            outputs.deliver();
        }
    }
}

impl Drop for BindingCore {
    fn drop(&mut self) {
        // A shared registry outlives this core; only a private one is torn down.
        if Arc::strong_count(&self.registry) == 1 {
            self.unbind_all();
        }
    }
}

impl std::fmt::Debug for BindingCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingCore")
            .field("ctx", &self.ctx)
            .field("bindings", &self.registry.len())
            .field("kinds", &self.supported_kinds())
            .finish()
    }
}

fn lock(handler: &SharedHandler) -> std::sync::MutexGuard<'_, EventHandler> {
    handler.lock().unwrap_or_else(PoisonError::into_inner)
}

fn release(token: Token, handler: &SharedHandler) {
    let outputs = {
        let mut handler = lock(handler);
        handler.on_disable();
        let outputs = handler.take_outputs();
        handler.on_destroy();
        outputs
    };
    log::debug!("[BindingCore] unbound {}", token);
    outputs.deliver();
}
