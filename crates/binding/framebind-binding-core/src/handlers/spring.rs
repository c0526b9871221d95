use std::time::Duration;

use framebind_animation_core::{SpringConfig, SpringDriver, SpringPhase};
use framebind_api_core::{BindingRequest, EventCallback, EventKind, EventState};

use super::{BindingLifecycle, HandlerContext};
use crate::pipeline::{BindingPipeline, TickOutcome};
use crate::scope::write_spring;
use crate::Token;

/// Damped spring from `fromValue` to `toValue`; exposes `p` and `v`.
#[derive(Debug)]
pub struct SpringHandler {
    pipeline: BindingPipeline,
    driver: SpringDriver,
    active: bool,
}

impl SpringHandler {
    pub fn new(token: Token, ctx: &HandlerContext) -> Self {
        Self {
            pipeline: ctx.pipeline(token, EventKind::Spring),
            driver: SpringDriver::new(ctx.scheduler()),
            active: false,
        }
    }

    pub fn pipeline(&self) -> &BindingPipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut BindingPipeline {
        &mut self.pipeline
    }

    pub fn driver(&self) -> &SpringDriver {
        &self.driver
    }

    pub fn on_frame(&mut self, now: Duration) {
        let Some(sample) = self.driver.pulse(now) else {
            return;
        };
        write_spring(self.pipeline.scope_mut(), sample.position, sample.velocity);
        if self.pipeline.run_tick() == TickOutcome::Exited {
            self.driver.cancel();
        }
        if sample.finished && self.active {
            self.active = false;
            log::debug!("[SpringHandler] at rest at {:.4}", sample.position);
            self.pipeline.emit(EventState::End, |p| p);
        }
    }

    /// A rebind continues from where a previous run left off unless told otherwise.
    fn config_for(&self, request: &BindingRequest) -> SpringConfig {
        let mut cfg = SpringConfig::from_event_config(&request.event_config);
        if self.driver.phase() != SpringPhase::Idle {
            if !request.event_config.contains_key("fromValue") {
                cfg.from_value = self.driver.current_value();
            }
            if !request.event_config.contains_key("initialVelocity") {
                cfg.initial_velocity = self.driver.current_velocity();
            }
        }
        cfg
    }
}

impl BindingLifecycle for SpringHandler {
    fn on_create(&mut self, _anchor: Option<&str>, _instance_id: Option<&str>) -> bool {
        true
    }

    fn on_start(&mut self) {}

    fn on_bind(&mut self, request: &BindingRequest, callback: EventCallback) {
        let cfg = self.config_for(request);
        self.pipeline.bind(request, callback);
        write_spring(self.pipeline.scope_mut(), cfg.from_value, cfg.initial_velocity);
        log::debug!(
            "[SpringHandler] start {} -> {} (k={}, c={}, m={})",
            cfg.from_value,
            cfg.to_value,
            cfg.stiffness,
            cfg.damping,
            cfg.mass
        );
        self.driver.start(cfg);
        self.active = true;
        self.pipeline.emit(EventState::Start, |p| p);
    }

    fn on_disable(&mut self) -> bool {
        self.driver.cancel();
        if !self.active {
            return false;
        }
        self.active = false;
        self.pipeline.emit(EventState::End, |p| p);
        true
    }

    fn on_destroy(&mut self) {
        self.active = false;
        self.driver.terminate();
        self.pipeline.clear();
    }

    fn on_pause(&mut self) {
        self.driver.pause();
    }

    fn on_resume(&mut self) {
        self.driver.resume();
    }
}
