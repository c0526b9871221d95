//! Analytic damped-spring driver.
//!
//! Position is evaluated in closed form at the accumulated simulation time rather
//! than integrated step by step, so large or uneven frame gaps do not add error.
//! Each advance is capped at [`MAX_STEP`] so a stalled frame cannot make the
//! spring jump.

use std::ops::ControlFlow;
use std::time::Duration;

use crate::config::SpringConfig;
use crate::frame::{FrameCallback, FrameScheduler, FrameTick};

/// Longest simulated step per tick, four frames at 60 Hz.
pub const MAX_STEP: f64 = 0.064;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpringSample {
    pub position: f64,
    pub velocity: f64,
    pub finished: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SpringPhase {
    Idle,
    Running,
    AtRest,
    Cancelled,
}

/// Pure spring state; advanced by frame times, knows nothing about scheduling.
#[derive(Clone, Debug)]
pub struct SpringModel {
    cfg: SpringConfig,
    start_value: f64,
    end_value: f64,
    position: f64,
    velocity: f64,
    last_time: Option<Duration>,
    elapsed: f64,
    finished: bool,
}

impl SpringModel {
    pub fn new(cfg: SpringConfig) -> Self {
        let cfg = cfg.validated();
        Self {
            start_value: cfg.from_value,
            end_value: cfg.to_value,
            position: cfg.from_value,
            velocity: cfg.initial_velocity,
            last_time: None,
            elapsed: 0.0,
            finished: false,
            cfg,
        }
    }

    pub fn config(&self) -> &SpringConfig {
        &self.cfg
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn target(&self) -> f64 {
        self.end_value
    }

    pub fn has_finished(&self) -> bool {
        self.finished
    }

    /// Forget the reference frame time; the next step re-anchors without advancing.
    pub fn reanchor(&mut self) {
        self.last_time = None;
    }

    /// Advance to `now`. The first call only anchors the clock.
    pub fn step(&mut self, now: Duration) -> SpringSample {
        match self.last_time {
            None if self.elapsed == 0.0 => {
                self.start_value = self.cfg.from_value;
                self.position = self.cfg.from_value;
            }
            None => {}
            Some(last) => {
                let dt = now.saturating_sub(last).as_secs_f64();
                self.advance(dt);
            }
        }
        self.last_time = Some(now);
        if self.is_at_rest() {
            self.finished = true;
        }
        self.sample()
    }

    pub fn sample(&self) -> SpringSample {
        SpringSample {
            position: self.position,
            velocity: self.velocity,
            finished: self.finished,
        }
    }

    pub fn is_at_rest(&self) -> bool {
        self.velocity.abs() <= self.cfg.rest_speed_threshold
            && ((self.end_value - self.position).abs() <= self.cfg.rest_displacement_threshold
                || self.cfg.stiffness == 0.0)
    }

    fn is_overshooting(&self) -> bool {
        self.cfg.stiffness > 0.0
            && ((self.start_value < self.end_value && self.position > self.end_value)
                || (self.start_value > self.end_value && self.position < self.end_value))
    }

    fn advance(&mut self, dt: f64) {
        if self.is_at_rest() {
            return;
        }
        self.elapsed += dt.clamp(0.0, MAX_STEP);

        let k = self.cfg.stiffness;
        let c = self.cfg.damping;
        let m = self.cfg.mass;
        // Velocity sign convention: positive initial velocity moves toward the target.
        let v0 = -self.cfg.initial_velocity;
        let zeta = c / (2.0 * (k * m).sqrt());
        let omega0 = (k / m).sqrt();
        let x0 = self.end_value - self.start_value;
        let t = self.elapsed;

        let (position, velocity) = if zeta < 1.0 {
            let omega1 = omega0 * (1.0 - zeta * zeta).sqrt();
            let envelope = (-zeta * omega0 * t).exp();
            let a = (v0 + zeta * omega0 * x0) / omega1;
            let (sin, cos) = (omega1 * t).sin_cos();
            let position = self.end_value - envelope * (a * sin + x0 * cos);
            let velocity = zeta * omega0 * envelope * (sin * a + x0 * cos)
                - envelope * (cos * (v0 + zeta * omega0 * x0) - omega1 * x0 * sin);
            (position, velocity)
        } else {
            let envelope = (-omega0 * t).exp();
            let position = self.end_value - envelope * (x0 + (v0 + omega0 * x0) * t);
            let velocity = envelope * (v0 * (t * omega0 - 1.0) + t * x0 * omega0 * omega0);
            (position, velocity)
        };
        self.position = position;
        self.velocity = velocity;

        if self.is_at_rest() || (self.cfg.overshoot_clamping && self.is_overshooting()) {
            if k > 0.0 {
                self.start_value = self.end_value;
                self.position = self.end_value;
            } else {
                self.end_value = self.position;
                self.start_value = self.end_value;
            }
            self.velocity = 0.0;
        }
    }
}

impl FrameCallback for SpringModel {
    fn do_frame(&mut self, tick: FrameTick) -> ControlFlow<()> {
        let sample = self.step(tick.frame_time);
        log::trace!(
            "[SpringDriver] p={:.4} v={:.4}",
            sample.position,
            sample.velocity
        );
        if sample.finished {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

/// Spring model bound to its own frame scheduler.
#[derive(Debug)]
pub struct SpringDriver {
    scheduler: FrameScheduler,
    model: Option<SpringModel>,
    cancelled: bool,
}

impl SpringDriver {
    pub fn new(scheduler: FrameScheduler) -> Self {
        Self {
            scheduler,
            model: None,
            cancelled: false,
        }
    }

    /// Snapshot `cfg` and arm the scheduler. The first tick anchors the clock.
    pub fn start(&mut self, cfg: SpringConfig) {
        self.model = Some(SpringModel::new(cfg));
        self.cancelled = false;
        self.scheduler.start();
    }

    /// Offer a host pulse; returns the new sample when it produced a tick.
    pub fn pulse(&mut self, now: Duration) -> Option<SpringSample> {
        let model = self.model.as_mut()?;
        if self.scheduler.dispatch(now, model) {
            Some(model.sample())
        } else {
            None
        }
    }

    /// Detach from the scheduler. Position and velocity stay readable.
    pub fn cancel(&mut self) {
        self.scheduler.stop();
        if self.model.is_some() {
            self.cancelled = true;
        }
    }

    pub fn pause(&mut self) {
        self.scheduler.stop();
    }

    /// Re-arm after `pause`; the paused interval is not simulated.
    pub fn resume(&mut self) {
        if let Some(model) = self.model.as_mut() {
            if !model.has_finished() && !self.cancelled {
                model.reanchor();
                self.scheduler.start();
            }
        }
    }

    pub fn terminate(&mut self) {
        self.scheduler.terminate();
    }

    pub fn phase(&self) -> SpringPhase {
        match &self.model {
            None => SpringPhase::Idle,
            Some(_) if self.cancelled => SpringPhase::Cancelled,
            Some(m) if m.has_finished() => SpringPhase::AtRest,
            Some(_) => SpringPhase::Running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn has_finished(&self) -> bool {
        self.model.as_ref().is_some_and(|m| m.has_finished())
    }

    pub fn current_value(&self) -> f64 {
        self.model.as_ref().map_or(0.0, |m| m.position())
    }

    pub fn current_velocity(&self) -> f64 {
        self.model.as_ref().map_or(0.0, |m| m.velocity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameCaps;
    use crate::SchedulerConfig;
    use approx::assert_abs_diff_eq;

    fn run_to_rest(cfg: SpringConfig, max_ticks: usize) -> Option<(usize, SpringSample)> {
        let mut model = SpringModel::new(cfg);
        for i in 0..max_ticks {
            let s = model.step(Duration::from_millis(16 * i as u64));
            if s.finished {
                return Some((i, s));
            }
        }
        None
    }

    #[test]
    fn default_spring_settles_on_target() {
        let (_, s) = run_to_rest(SpringConfig::default(), 2_000).expect("settles");
        assert_eq!(s.position, 1.0);
        assert_eq!(s.velocity, 0.0);
    }

    #[test]
    fn invalid_mass_still_comes_to_rest() {
        let cfg = SpringConfig {
            mass: 0.0,
            damping: f64::NAN,
            ..SpringConfig::default()
        };
        let (_, s) = run_to_rest(cfg, 2_000).expect("settles");
        assert_eq!(s.position, 1.0);
    }

    #[test]
    fn first_step_only_anchors() {
        let mut model = SpringModel::new(SpringConfig {
            from_value: 5.0,
            to_value: 10.0,
            ..SpringConfig::default()
        });
        let s = model.step(Duration::from_millis(1_000));
        assert_eq!(s.position, 5.0);
        assert!(!s.finished);
        let s = model.step(Duration::from_millis(1_016));
        assert!(s.position > 5.0 && s.position < 10.0);
    }

    #[test]
    fn long_gaps_are_capped() {
        let mut a = SpringModel::new(SpringConfig::default());
        let mut b = SpringModel::new(SpringConfig::default());
        a.step(Duration::ZERO);
        b.step(Duration::ZERO);
        let big = a.step(Duration::from_secs(10));
        let capped = b.step(Duration::from_millis(64));
        assert_abs_diff_eq!(big.position, capped.position, epsilon = 1e-12);
    }

    #[test]
    fn converges_across_damping_ratios_and_masses() {
        for &mass in &[0.5_f64, 1.0, 4.0] {
            for &zeta in &[0.05, 0.3, 0.7, 0.95, 1.5, 3.0] {
                let stiffness = 120.0;
                let damping = zeta * 2.0 * (stiffness * mass).sqrt();
                let cfg = SpringConfig {
                    stiffness,
                    damping,
                    mass,
                    from_value: -2.0,
                    to_value: 3.0,
                    ..SpringConfig::default()
                };
                let (_, s) = run_to_rest(cfg, 60_000)
                    .unwrap_or_else(|| panic!("zeta={zeta} mass={mass} never settled"));
                assert_eq!(s.position, 3.0);
            }
        }
    }

    #[test]
    fn zero_stiffness_rests_where_it_stands() {
        let cfg = SpringConfig {
            stiffness: 0.0,
            damping: 0.0,
            to_value: 10.0,
            ..SpringConfig::default()
        };
        let (i, s) = run_to_rest(cfg, 10).expect("rests immediately");
        assert_eq!(i, 0);
        assert_eq!(s.position, 0.0);
    }

    #[test]
    fn overshoot_clamping_snaps_at_crossing() {
        let cfg = SpringConfig {
            damping: 2.0,
            overshoot_clamping: true,
            ..SpringConfig::default()
        };
        let mut model = SpringModel::new(cfg);
        let mut max_seen: f64 = 0.0;
        for i in 0..500 {
            let s = model.step(Duration::from_millis(16 * i));
            max_seen = max_seen.max(s.position);
            if s.finished {
                break;
            }
        }
        assert!(model.has_finished());
        assert!(max_seen <= 1.0);
    }

    #[test]
    fn driver_stops_ticking_once_at_rest() {
        let scheduler = FrameScheduler::new(FrameCaps { vsync: true }, &SchedulerConfig::default());
        let mut driver = SpringDriver::new(scheduler);
        assert_eq!(driver.phase(), SpringPhase::Idle);
        driver.start(SpringConfig::default());
        let mut ticks = 0;
        for i in 0..5_000u64 {
            if driver.pulse(Duration::from_millis(16 * i)).is_some() {
                ticks += 1;
            }
        }
        assert!(ticks > 10);
        assert_eq!(driver.phase(), SpringPhase::AtRest);
        assert!(!driver.is_running());
        assert_abs_diff_eq!(driver.current_value(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn cancel_keeps_state_readable() {
        let scheduler = FrameScheduler::new(FrameCaps { vsync: true }, &SchedulerConfig::default());
        let mut driver = SpringDriver::new(scheduler);
        driver.start(SpringConfig::default());
        driver.pulse(Duration::ZERO);
        driver.pulse(Duration::from_millis(16));
        let p = driver.current_value();
        driver.cancel();
        assert_eq!(driver.phase(), SpringPhase::Cancelled);
        assert!(driver.pulse(Duration::from_millis(32)).is_none());
        assert_eq!(driver.current_value(), p);
    }
}
