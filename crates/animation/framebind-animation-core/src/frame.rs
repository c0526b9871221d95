//! Frame scheduler.
//!
//! The host owns the real clock (a vsync callback or a timer) and forwards every
//! pulse through [`FrameScheduler::dispatch`]. The scheduler decides whether the
//! pulse is a tick for its owner: every pulse for the vsync cadence, or a pulse at
//! least `interval` after the previous tick for the interval cadence.
//!
//! Lifecycle: `Idle --start--> Running --stop--> Idle`, and `terminate` from any
//! state into `Terminated`, after which every call is a no-op.

use std::ops::ControlFlow;
use std::thread::{self, ThreadId};
use std::time::Duration;

use crate::config::SchedulerConfig;
use crate::render_thread::RenderThread;

/// One frame delivered to a [`FrameCallback`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrameTick {
    /// Host frame time (monotonic, arbitrary origin).
    pub frame_time: Duration,
    /// Ticks delivered since construction, starting at 0.
    pub index: u64,
}

/// Owner of a scheduler. Returning `Break` stops the scheduler after this tick.
pub trait FrameCallback {
    fn do_frame(&mut self, tick: FrameTick) -> ControlFlow<()>;
}

impl<F> FrameCallback for F
where
    F: FnMut(FrameTick) -> ControlFlow<()>,
{
    fn do_frame(&mut self, tick: FrameTick) -> ControlFlow<()> {
        self(tick)
    }
}

/// What the host can provide.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameCaps {
    /// The host delivers display-synchronized pulses.
    pub vsync: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cadence {
    Vsync,
    Interval(Duration),
}

impl Cadence {
    /// Pick the cadence once from host capability and configuration.
    pub fn select(caps: FrameCaps, cfg: &SchedulerConfig) -> Self {
        if caps.vsync && cfg.prefer_vsync {
            Cadence::Vsync
        } else {
            Cadence::Interval(Duration::from_millis(cfg.interval_ms.max(1)))
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Terminated,
}

#[derive(Debug)]
pub struct FrameScheduler {
    cadence: Cadence,
    state: SchedulerState,
    /// Thread pulses must arrive on. `None` accepts any thread.
    affinity: Option<ThreadId>,
    last_tick: Option<Duration>,
    index: u64,
}

impl FrameScheduler {
    /// Build on the calling thread, which becomes the scheduler's render thread.
    pub fn new(caps: FrameCaps, cfg: &SchedulerConfig) -> Self {
        Self::build(Cadence::select(caps, cfg), Some(thread::current().id()))
    }

    /// Build without thread affinity; pulses are accepted from any thread.
    pub fn without_affinity(caps: FrameCaps, cfg: &SchedulerConfig) -> Self {
        Self::build(Cadence::select(caps, cfg), None)
    }

    /// Build on the render thread, blocking for at most `cfg.handoff_timeout_ms`.
    ///
    /// When called on the render thread itself this is `new`. On timeout the
    /// scheduler is built locally without thread affinity and a warning is logged.
    pub fn on_render_thread(render: &RenderThread, caps: FrameCaps, cfg: &SchedulerConfig) -> Self {
        if render.is_current() {
            return Self::new(caps, cfg);
        }
        let timeout = Duration::from_millis(cfg.handoff_timeout_ms);
        let remote_cfg = cfg.clone();
        match render.run_blocking(move || FrameScheduler::new(caps, &remote_cfg), timeout) {
            Some(scheduler) => scheduler,
            None => {
                log::warn!(
                    "[FrameScheduler] render thread did not answer within {:?}; running without thread affinity",
                    timeout
                );
                Self::without_affinity(caps, cfg)
            }
        }
    }

    fn build(cadence: Cadence, affinity: Option<ThreadId>) -> Self {
        Self {
            cadence,
            state: SchedulerState::Idle,
            affinity,
            last_tick: None,
            index: 0,
        }
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    pub fn has_affinity(&self) -> bool {
        self.affinity.is_some()
    }

    /// Arm delivery. The first pulse after `start` is always a tick.
    pub fn start(&mut self) {
        match self.state {
            SchedulerState::Terminated => {
                log::debug!("[FrameScheduler] start ignored: terminated");
            }
            SchedulerState::Running => {}
            SchedulerState::Idle => {
                self.state = SchedulerState::Running;
                self.last_tick = None;
            }
        }
    }

    /// Safe from any state, including before the first tick.
    pub fn stop(&mut self) {
        if self.state == SchedulerState::Running {
            self.state = SchedulerState::Idle;
        }
    }

    pub fn terminate(&mut self) {
        self.state = SchedulerState::Terminated;
        self.last_tick = None;
    }

    /// Offer a host pulse. Returns `true` when the callback ran.
    pub fn dispatch<C: FrameCallback + ?Sized>(&mut self, now: Duration, callback: &mut C) -> bool {
        if self.state != SchedulerState::Running {
            return false;
        }
        if let Some(expected) = self.affinity {
            if thread::current().id() != expected {
                log::trace!("[FrameScheduler] pulse from foreign thread ignored");
                return false;
            }
        }
        if let (Cadence::Interval(interval), Some(last)) = (self.cadence, self.last_tick) {
            if now.saturating_sub(last) < interval {
                return false;
            }
        }
        self.last_tick = Some(now);
        let tick = FrameTick {
            frame_time: now,
            index: self.index,
        };
        self.index += 1;
        if callback.do_frame(tick).is_break() {
            self.stop();
        }
        true
    }
}
