//! framebind animation core (host-agnostic)
//!
//! Frame scheduling and physics. The host pushes frame pulses in; schedulers
//! decide whether a pulse is a tick for their owner, and the spring driver turns
//! ticks into `(position, velocity)` samples.

pub mod config;
pub mod frame;
pub mod render_thread;
pub mod spring;

pub use config::{SchedulerConfig, SpringConfig};
pub use frame::{Cadence, FrameCallback, FrameCaps, FrameScheduler, FrameTick, SchedulerState};
pub use render_thread::{render_channel, RenderQueue, RenderThread};
pub use spring::{SpringDriver, SpringModel, SpringPhase, SpringSample, MAX_STEP};
