use framebind_api_core::{BindingRequest, EventCallback, EventKind, EventState, ViewHandle};
use framebind_gesture_core::{GesturePhase, ScrollEvent, ScrollRecognizer};

use super::{resolve_source, BindingLifecycle, HandlerContext};
use crate::pipeline::BindingPipeline;
use crate::scope::write_scroll;
use crate::Token;

/// Content offset of a scrollable source view.
///
/// Unlike the pointer kinds, the first sample of a run is consumed as well as
/// reported, and a run the host never closed is ended by `on_disable`.
#[derive(Debug)]
pub struct ScrollHandler {
    pipeline: BindingPipeline,
    recognizer: ScrollRecognizer,
    source: Option<ViewHandle>,
    listening: bool,
    active: bool,
}

impl ScrollHandler {
    pub fn new(token: Token, ctx: &HandlerContext) -> Self {
        Self {
            pipeline: ctx.pipeline(token, EventKind::Scroll),
            recognizer: ScrollRecognizer::new(&ctx.config.gesture),
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

    pub fn on_scroll(&mut self, event: &ScrollEvent) {
        if !self.listening {
            return;
        }
        let Some(phase) = self.recognizer.on_scroll(event) else {
            return;
        };
        let update = *phase.data();
        let translator = self.pipeline.platform().translator.clone();
        write_scroll(self.pipeline.scope_mut(), translator.as_ref(), &update);
        match phase {
            GesturePhase::Began(_) => {
                self.active = true;
                self.pipeline.emit(EventState::Start, |p| p);
                self.pipeline.run_tick();
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

impl BindingLifecycle for ScrollHandler {
    fn on_create(&mut self, anchor: Option<&str>, instance_id: Option<&str>) -> bool {
        self.source = resolve_source(self.pipeline.platform(), "ScrollHandler", anchor, instance_id);
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
