use std::ops::ControlFlow;
use std::time::Duration;

use framebind_animation_core::{FrameScheduler, FrameTick};
use framebind_api_core::{BindingRequest, EventCallback, EventKind, EventState};

use super::{BindingLifecycle, HandlerContext};
use crate::pipeline::{BindingPipeline, TickOutcome};
use crate::scope::write_timing;
use crate::Token;

/// Elapsed wall-clock time since the first frame after `bind`, in `t` (ms).
///
/// Time keeps running while paused; pause only stops frame delivery.
#[derive(Debug)]
pub struct TimingHandler {
    pipeline: BindingPipeline,
    scheduler: FrameScheduler,
    origin: Option<Duration>,
    elapsed_ms: f64,
    active: bool,
}

impl TimingHandler {
    pub fn new(token: Token, ctx: &HandlerContext) -> Self {
        Self {
            pipeline: ctx.pipeline(token, EventKind::Timing),
            scheduler: ctx.scheduler(),
            origin: None,
            elapsed_ms: 0.0,
            active: false,
        }
    }

    pub fn pipeline(&self) -> &BindingPipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut BindingPipeline {
        &mut self.pipeline
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn on_frame(&mut self, now: Duration) {
        let Self {
            pipeline,
            scheduler,
            origin,
            elapsed_ms,
            ..
        } = self;
        let mut tick = |frame: FrameTick| {
            let start = *origin.get_or_insert(frame.frame_time);
            *elapsed_ms = frame.frame_time.saturating_sub(start).as_secs_f64() * 1000.0;
            write_timing(pipeline.scope_mut(), *elapsed_ms);
            log::trace!("[TimingHandler] t={:.1}", *elapsed_ms);
            match pipeline.run_tick() {
                TickOutcome::Consumed => ControlFlow::Continue(()),
                TickOutcome::Exited | TickOutcome::Inert => ControlFlow::Break(()),
            }
        };
        scheduler.dispatch(now, &mut tick);
    }
}

impl BindingLifecycle for TimingHandler {
    fn on_create(&mut self, _anchor: Option<&str>, _instance_id: Option<&str>) -> bool {
        true
    }

    fn on_start(&mut self) {}

    fn on_bind(&mut self, request: &BindingRequest, callback: EventCallback) {
        self.pipeline.bind(request, callback);
        self.origin = None;
        self.elapsed_ms = 0.0;
        write_timing(self.pipeline.scope_mut(), 0.0);
        self.active = true;
        self.pipeline.emit(EventState::Start, |p| p);
        self.scheduler.start();
    }

    fn on_disable(&mut self) -> bool {
        self.scheduler.stop();
        if !self.active {
            return false;
        }
        self.active = false;
        self.pipeline.emit(EventState::End, |p| p);
        true
    }

    fn on_destroy(&mut self) {
        self.active = false;
        self.scheduler.terminate();
        self.pipeline.clear();
    }

    fn on_pause(&mut self) {
        self.scheduler.stop();
    }

    fn on_resume(&mut self) {
        if self.active && !self.pipeline.is_exited() {
            self.scheduler.start();
        }
    }
}
