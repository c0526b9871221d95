use framebind_api_core::{BindingRequest, EventCallback, EventKind, EventState, ViewHandle};
use framebind_gesture_core::{GesturePhase, PointerEvent, RotationRecognizer};

use super::{resolve_source, BindingLifecycle, HandlerContext};
use crate::pipeline::BindingPipeline;
use crate::scope::write_rotation;
use crate::Token;

/// Two-finger rotation. `r` is accumulated degrees since the gesture began.
#[derive(Debug)]
pub struct RotationHandler {
    pipeline: BindingPipeline,
    recognizer: RotationRecognizer,
    source: Option<ViewHandle>,
    listening: bool,
    active: bool,
}

impl RotationHandler {
    pub fn new(token: Token, ctx: &HandlerContext) -> Self {
        Self {
            pipeline: ctx.pipeline(token, EventKind::Rotation),
            recognizer: RotationRecognizer::new(),
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
        write_rotation(self.pipeline.scope_mut(), phase.data().degrees);
        match phase {
            GesturePhase::Began(_) => {
                self.active = true;
                self.pipeline.emit(EventState::Start, |p| p);
            }
            GesturePhase::Changed(_) => {
                self.pipeline.run_tick();
            }
            GesturePhase::Ended(_) | GesturePhase::Cancelled(_) => {
                self.active = false;
                self.pipeline.emit(EventState::End, |p| p);
            }
        }
    }
}

impl BindingLifecycle for RotationHandler {
    fn on_create(&mut self, anchor: Option<&str>, instance_id: Option<&str>) -> bool {
        self.source =
            resolve_source(self.pipeline.platform(), "RotationHandler", anchor, instance_id);
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
