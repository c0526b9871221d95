//! Per-kind event handlers.
//!
//! A handler owns exactly one recognizer or driver plus one [`BindingPipeline`].
//! Lifecycle calls arrive in the order `on_create`, `on_start`, `on_bind`, then
//! any number of input or frame deliveries, `on_disable`, and finally
//! `on_destroy`. After `on_destroy` the handler is inert.

mod pan;
mod pinch;
mod rotation;
mod scroll;
mod spring;
mod timing;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use framebind_animation_core::{FrameCaps, FrameScheduler, RenderThread};
use framebind_api_core::{
    BindingRequest, EventCallback, EventKind, ExpressionEvaluator, Platform, ViewHandle,
};
use framebind_gesture_core::{PointerEvent, ScrollEvent};

use crate::pipeline::{BindingPipeline, Outputs};
use crate::{CoreConfig, Token};

pub use pan::PanHandler;
pub use pinch::PinchHandler;
pub use rotation::RotationHandler;
pub use scroll::ScrollHandler;
pub use spring::SpringHandler;
pub use timing::TimingHandler;

/// Everything a factory needs to build a handler.
#[derive(Clone)]
pub struct HandlerContext {
    pub platform: Platform,
    pub evaluator: Arc<dyn ExpressionEvaluator>,
    pub config: CoreConfig,
    pub caps: FrameCaps,
    /// When set, schedulers are built on this thread.
    pub render: Option<RenderThread>,
}

impl HandlerContext {
    pub fn pipeline(&self, token: Token, kind: EventKind) -> BindingPipeline {
        BindingPipeline::new(token, kind, self.platform.clone(), self.evaluator.clone())
    }

    pub fn scheduler(&self) -> FrameScheduler {
        match &self.render {
            Some(render) => FrameScheduler::on_render_thread(render, self.caps, &self.config.scheduler),
            None => FrameScheduler::without_affinity(self.caps, &self.config.scheduler),
        }
    }
}

impl fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerContext")
            .field("config", &self.config)
            .field("caps", &self.caps)
            .field("render", &self.render.is_some())
            .finish_non_exhaustive()
    }
}

pub trait BindingLifecycle {
    /// Resolve the input source. `false` means nothing was attached.
    fn on_create(&mut self, anchor: Option<&str>, instance_id: Option<&str>) -> bool;

    /// Begin listening on the resolved source.
    fn on_start(&mut self);

    /// Install expressions and callback. Called again on rebind.
    fn on_bind(&mut self, request: &BindingRequest, callback: EventCallback);

    /// Stop listening. Returns `true` when the handler was listening.
    fn on_disable(&mut self) -> bool;

    /// Release everything. Later calls are no-ops.
    fn on_destroy(&mut self);

    fn on_pause(&mut self) {}

    fn on_resume(&mut self) {}
}

/// Closed set of handler kinds.
#[derive(Debug)]
pub enum EventHandler {
    Pan(PanHandler),
    Pinch(PinchHandler),
    Rotation(RotationHandler),
    Scroll(ScrollHandler),
    Timing(TimingHandler),
    Spring(SpringHandler),
}

macro_rules! each_handler {
    ($self:expr, $h:ident => $body:expr) => {
        match $self {
            EventHandler::Pan($h) => $body,
            EventHandler::Pinch($h) => $body,
            EventHandler::Rotation($h) => $body,
            EventHandler::Scroll($h) => $body,
            EventHandler::Timing($h) => $body,
            EventHandler::Spring($h) => $body,
        }
    };
}

impl EventHandler {
    /// Default factory for `kind`.
    pub fn for_kind(kind: EventKind, token: Token, ctx: &HandlerContext) -> Self {
        match kind {
            EventKind::Pan => EventHandler::Pan(PanHandler::new(token, ctx)),
            EventKind::Pinch => EventHandler::Pinch(PinchHandler::new(token, ctx)),
            EventKind::Rotation => EventHandler::Rotation(RotationHandler::new(token, ctx)),
            EventKind::Scroll => EventHandler::Scroll(ScrollHandler::new(token, ctx)),
            EventKind::Timing => EventHandler::Timing(TimingHandler::new(token, ctx)),
            EventKind::Spring => EventHandler::Spring(SpringHandler::new(token, ctx)),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            EventHandler::Pan(_) => EventKind::Pan,
            EventHandler::Pinch(_) => EventKind::Pinch,
            EventHandler::Rotation(_) => EventKind::Rotation,
            EventHandler::Scroll(_) => EventKind::Scroll,
            EventHandler::Timing(_) => EventKind::Timing,
            EventHandler::Spring(_) => EventKind::Spring,
        }
    }

    pub fn token(&self) -> Token {
        self.pipeline().token()
    }

    /// View whose input this handler listens to. Time-driven kinds have none.
    pub fn source_view(&self) -> Option<ViewHandle> {
        match self {
            EventHandler::Pan(h) => h.source_view(),
            EventHandler::Pinch(h) => h.source_view(),
            EventHandler::Rotation(h) => h.source_view(),
            EventHandler::Scroll(h) => h.source_view(),
            EventHandler::Timing(_) | EventHandler::Spring(_) => None,
        }
    }

    pub fn on_pointer(&mut self, event: &PointerEvent) {
        match self {
            EventHandler::Pan(h) => h.on_pointer(event),
            EventHandler::Pinch(h) => h.on_pointer(event),
            EventHandler::Rotation(h) => h.on_pointer(event),
            _ => {}
        }
    }

    pub fn on_scroll(&mut self, event: &ScrollEvent) {
        if let EventHandler::Scroll(h) = self {
            h.on_scroll(event);
        }
    }

    /// Offer a host frame pulse to time-driven kinds.
    pub fn on_frame(&mut self, now: Duration) {
        match self {
            EventHandler::Timing(h) => h.on_frame(now),
            EventHandler::Spring(h) => h.on_frame(now),
            _ => {}
        }
    }

    pub fn pipeline(&self) -> &BindingPipeline {
        each_handler!(self, h => h.pipeline())
    }

    pub fn take_outputs(&mut self) -> Outputs {
        each_handler!(self, h => h.pipeline_mut().take_outputs())
    }
}

impl BindingLifecycle for EventHandler {
    fn on_create(&mut self, anchor: Option<&str>, instance_id: Option<&str>) -> bool {
        each_handler!(self, h => h.on_create(anchor, instance_id))
    }

    fn on_start(&mut self) {
        each_handler!(self, h => h.on_start())
    }

    fn on_bind(&mut self, request: &BindingRequest, callback: EventCallback) {
        each_handler!(self, h => h.on_bind(request, callback))
    }

    fn on_disable(&mut self) -> bool {
        each_handler!(self, h => h.on_disable())
    }

    fn on_destroy(&mut self) {
        each_handler!(self, h => h.on_destroy())
    }

    fn on_pause(&mut self) {
        each_handler!(self, h => h.on_pause())
    }

    fn on_resume(&mut self) {
        each_handler!(self, h => h.on_resume())
    }
}

/// Resolve a gesture handler's source view, logging when it is missing.
fn resolve_source(
    platform: &Platform,
    tag: &str,
    anchor: Option<&str>,
    instance_id: Option<&str>,
) -> Option<ViewHandle> {
    let Some(anchor) = anchor else {
        log::error!("[{tag}] no source anchor given");
        return None;
    };
    let view = platform.view_finder.find_view_by(anchor, instance_id);
    match view {
        Some(view) => log::debug!("[{tag}] attached to '{anchor}' ({view})"),
        None => log::error!("[{tag}] source view '{anchor}' not found"),
    }
    view
}
