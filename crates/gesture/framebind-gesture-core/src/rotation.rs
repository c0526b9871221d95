//! Two-finger rotation.
//!
//! The angle of the vector between the two tracked pointers is sampled on every
//! move; consecutive samples are differenced and folded so a single frame never
//! contributes more than a quarter turn. Positive degrees are clockwise on a
//! y-down surface.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::{GesturePhase, PointerAction, PointerEvent, PointerId};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RotationUpdate {
    /// Accumulated rotation since the gesture began, degrees.
    pub degrees: f64,
    /// Contribution of this event, degrees.
    pub delta_degrees: f64,
    pub anchor_x: f64,
    pub anchor_y: f64,
    /// Milliseconds since the previous sample.
    pub time_delta_ms: u64,
}

/// Fold an angle difference (radians) into `(-π/2, π/2]`.
///
/// Inputs are differences of two `atan2` results, so they lie in `(-2π, 2π)`.
pub fn normalize_delta(delta: f64) -> f64 {
    let mut d = delta;
    if d > PI {
        d -= PI;
    } else if d < -PI {
        d += PI;
    }
    if d > FRAC_PI_2 {
        d -= PI;
    } else if d <= -FRAC_PI_2 {
        d += PI;
    }
    d
}

#[derive(Debug, Default)]
pub struct RotationRecognizer {
    pointers: [Option<PointerId>; 2],
    in_progress: bool,
    prev_angle: Option<f64>,
    prev_time_ms: u64,
    accumulated: f64,
    anchor: (f64, f64),
}

impl RotationRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn accumulated_degrees(&self) -> f64 {
        self.accumulated
    }

    pub fn on_pointer(&mut self, event: &PointerEvent) -> Option<GesturePhase<RotationUpdate>> {
        match event.action {
            PointerAction::Down => {
                self.in_progress = false;
                self.pointers = [Some(event.pointer_id), None];
                None
            }
            PointerAction::PointerDown => {
                if self.in_progress {
                    return None;
                }
                if self.pointers[0].is_none() {
                    // Stream joined mid-gesture: adopt any other active pointer as the first.
                    self.pointers[0] = event
                        .pointers
                        .iter()
                        .map(|p| p.id)
                        .find(|id| *id != event.pointer_id);
                }
                self.pointers[1] = Some(event.pointer_id);
                self.in_progress = true;
                self.prev_angle = None;
                self.prev_time_ms = event.time_ms;
                self.accumulated = 0.0;
                let delta = self.sample(event).unwrap_or(0.0);
                Some(GesturePhase::Began(self.update(delta, 0)))
            }
            PointerAction::Move => {
                if !self.in_progress {
                    return None;
                }
                let dt = event.time_ms.saturating_sub(self.prev_time_ms);
                self.prev_time_ms = event.time_ms;
                let delta = self.sample(event)?;
                if delta == 0.0 {
                    return None;
                }
                self.accumulated += delta;
                Some(GesturePhase::Changed(self.update(delta, dt)))
            }
            PointerAction::PointerUp => {
                if self.in_progress && self.pointers.contains(&Some(event.pointer_id)) {
                    self.finish()
                } else {
                    None
                }
            }
            PointerAction::Up | PointerAction::Cancel => self.finish(),
        }
    }

    /// Recompute the angle; returns the folded delta in degrees.
    fn sample(&mut self, event: &PointerEvent) -> Option<f64> {
        let first = event.find(self.pointers[0]?)?;
        let second = event.find(self.pointers[1]?)?;
        let (vx, vy) = (second.x - first.x, second.y - first.y);
        self.anchor = ((first.x + second.x) * 0.5, (first.y + second.y) * 0.5);

        let angle = -vy.atan2(vx);
        let diff = match self.prev_angle {
            None => 0.0,
            Some(prev) => prev - angle,
        };
        self.prev_angle = Some(angle);
        Some(normalize_delta(diff).to_degrees())
    }

    fn update(&self, delta: f64, dt: u64) -> RotationUpdate {
        RotationUpdate {
            degrees: self.accumulated,
            delta_degrees: delta,
            anchor_x: self.anchor.0,
            anchor_y: self.anchor.1,
            time_delta_ms: dt,
        }
    }

    fn finish(&mut self) -> Option<GesturePhase<RotationUpdate>> {
        if !self.in_progress {
            return None;
        }
        let end = GesturePhase::Ended(self.update(0.0, 0));
        log::debug!("[RotationRecognizer] ended at {:.2}°", self.accumulated);
        self.in_progress = false;
        self.pointers = [None, None];
        self.prev_angle = None;
        self.accumulated = 0.0;
        Some(end)
    }
}
