use framebind_api_core::{BindingRequest, EventCallback, EventKind, EventState, ViewHandle};
use framebind_gesture_core::{GesturePhase, PanRecognizer, PointerEvent};

use super::{resolve_source, BindingLifecycle, HandlerContext};
use crate::pipeline::BindingPipeline;
use crate::scope::write_pan;
use crate::Token;

/// Single-pointer drag on the source view.
#[derive(Debug)]
pub struct PanHandler {
    pipeline: BindingPipeline,
    recognizer: PanRecognizer,
    source: Option<ViewHandle>,
    listening: bool,
    /// A `start` went out without its `end` or `cancel`.
    active: bool,
}

impl PanHandler {
    pub fn new(token: Token, ctx: &HandlerContext) -> Self {
        Self {
            pipeline: ctx.pipeline(token, EventKind::Pan),
            recognizer: PanRecognizer::new(&ctx.config.gesture),
            source: None,
            listening: false,
            active: false,
        }
    }

    pub fn source_view(&self) -> Option<ViewHandle> {
        self.source
    }

    pub fn pipeline(&self) -> &BindingPipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut BindingPipeline {
        &mut self.pipeline
    }

    pub fn on_pointer(&mut self, event: &PointerEvent) {
        if !self.listening {
            return;
        }
        let Some(phase) = self.recognizer.on_pointer(event) else {
            return;
        };
        let update = *phase.data();
        let translator = self.pipeline.platform().translator.clone();
        write_pan(self.pipeline.scope_mut(), translator.as_ref(), &update);
        match phase {
            GesturePhase::Began(_) => {
                self.active = true;
                self.pipeline.emit(EventState::Start, |p| p);
            }
            GesturePhase::Changed(_) => {
                self.pipeline.run_tick();
            }
            GesturePhase::Ended(u) => {
                self.active = false;
                self.pipeline.emit(EventState::End, |p| {
                    p.with_f64("velocityX", u.velocity_x)
                        .with_f64("velocityY", u.velocity_y)
                });
            }
            GesturePhase::Cancelled(_) => {
                self.active = false;
                self.pipeline.emit(EventState::Cancel, |p| p);
            }
        }
    }
}

impl BindingLifecycle for PanHandler {
    fn on_create(&mut self, anchor: Option<&str>, instance_id: Option<&str>) -> bool {
        self.source = resolve_source(self.pipeline.platform(), "PanHandler", anchor, instance_id);
        self.source.is_some()
    }

    fn on_start(&mut self) {
        self.listening = self.source.is_some();
    }

    fn on_bind(&mut self, request: &BindingRequest, callback: EventCallback) {
        self.pipeline.bind(request, callback);
    }

    fn on_disable(&mut self) -> bool {
        let was_listening = self.listening;
        if self.active {
            self.active = false;
            self.pipeline.emit(EventState::End, |p| p);
        }
        self.listening = false;
        was_listening
    }

    fn on_destroy(&mut self) {
        self.listening = false;
        self.source = None;
        self.pipeline.clear();
    }
}
