//! Scroll offset tracking.
//!
//! Unlike the pointer recognizers this one consumes absolute content offsets.
//! Alongside the per-sample delta it reports the distance travelled since the
//! last inflection point: whenever the scroll direction on an axis reverses, the
//! turn origin for that axis moves to the offset where it reversed.

use serde::{Deserialize, Serialize};

use crate::{GestureConfig, GesturePhase, VelocityTracker};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScrollEvent {
    Scrolled { offset_x: f64, offset_y: f64, time_ms: u64 },
    Ended { time_ms: u64 },
    Cancelled,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ScrollUpdate {
    /// Absolute content offset, device units.
    pub x: f64,
    pub y: f64,
    /// Change since the previous sample.
    pub dx: f64,
    pub dy: f64,
    /// Change since the last direction reversal.
    pub tdx: f64,
    pub tdy: f64,
    /// Only set on `Ended`.
    pub velocity_x: f64,
    pub velocity_y: f64,
}

#[derive(Copy, Clone, Debug, Default)]
struct Axis {
    offset: f64,
    turn_origin: f64,
    direction: f64,
}

impl Axis {
    /// Returns `(delta, turn_delta)`.
    fn advance(&mut self, offset: f64) -> (f64, f64) {
        let delta = offset - self.offset;
        if delta != 0.0 {
            let direction = delta.signum();
            if self.direction != 0.0 && direction != self.direction {
                self.turn_origin = self.offset;
            }
            self.direction = direction;
        }
        self.offset = offset;
        (delta, offset - self.turn_origin)
    }

    fn restart(&mut self) {
        self.turn_origin = self.offset;
        self.direction = 0.0;
    }
}

#[derive(Debug)]
pub struct ScrollRecognizer {
    x: Axis,
    y: Axis,
    running: bool,
    last: ScrollUpdate,
    tracker: VelocityTracker,
}

impl ScrollRecognizer {
    pub fn new(cfg: &GestureConfig) -> Self {
        Self {
            x: Axis::default(),
            y: Axis::default(),
            running: false,
            last: ScrollUpdate::default(),
            tracker: VelocityTracker::new(cfg),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Latest absolute offset (persists across runs).
    pub fn offset(&self) -> (f64, f64) {
        (self.x.offset, self.y.offset)
    }

    pub fn on_scroll(&mut self, event: &ScrollEvent) -> Option<GesturePhase<ScrollUpdate>> {
        match *event {
            ScrollEvent::Scrolled {
                offset_x,
                offset_y,
                time_ms,
            } => {
                let began = !self.running;
                if began {
                    self.running = true;
                    self.x.restart();
                    self.y.restart();
                    self.tracker.clear();
                }
                let (dx, tdx) = self.x.advance(offset_x);
                let (dy, tdy) = self.y.advance(offset_y);
                self.tracker.add(time_ms, offset_x, offset_y);
                self.last = ScrollUpdate {
                    x: offset_x,
                    y: offset_y,
                    dx,
                    dy,
                    tdx,
                    tdy,
                    velocity_x: 0.0,
                    velocity_y: 0.0,
                };
                if began {
                    Some(GesturePhase::Began(self.last))
                } else {
                    Some(GesturePhase::Changed(self.last))
                }
            }
            ScrollEvent::Ended { time_ms } => {
                if !self.running {
                    return None;
                }
                let (ox, oy) = self.offset();
                self.tracker.add(time_ms, ox, oy);
                let (vx, vy) = self.tracker.velocity();
                self.running = false;
                self.tracker.clear();
                Some(GesturePhase::Ended(ScrollUpdate {
                    velocity_x: vx,
                    velocity_y: vy,
                    ..self.last
                }))
            }
            ScrollEvent::Cancelled => {
                if !self.running {
                    return None;
                }
                self.running = false;
                self.tracker.clear();
                Some(GesturePhase::Cancelled(self.last))
            }
        }
    }
}
