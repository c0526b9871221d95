//! Single-pointer pan.
//!
//! Displacement is measured from the down point of the primary pointer. A move
//! that arrives without a preceding down (the stream was attached mid-gesture)
//! re-anchors at that move and begins.

use crate::{GestureConfig, GesturePhase, PointerAction, PointerEvent, PointerId, VelocityTracker};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PanUpdate {
    /// Displacement from the down point, device units.
    pub dx: f64,
    pub dy: f64,
    /// Change since the previous move, device units.
    pub step_x: f64,
    pub step_y: f64,
    /// Only set on `Ended`; device units per `velocity_units_ms`.
    pub velocity_x: f64,
    pub velocity_y: f64,
}

#[derive(Debug)]
pub struct PanRecognizer {
    primary: Option<PointerId>,
    down: Option<(f64, f64)>,
    last: PanUpdate,
    tracker: VelocityTracker,
}

impl PanRecognizer {
    pub fn new(cfg: &GestureConfig) -> Self {
        Self {
            primary: None,
            down: None,
            last: PanUpdate::default(),
            tracker: VelocityTracker::new(cfg),
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.down.is_some()
    }

    pub fn on_pointer(&mut self, event: &PointerEvent) -> Option<GesturePhase<PanUpdate>> {
        match event.action {
            PointerAction::Down => {
                let p = event.acting().or_else(|| event.pointers.first())?;
                self.primary = Some(p.id);
                self.begin_at(p.x, p.y, event.time_ms);
                Some(GesturePhase::Began(PanUpdate::default()))
            }
            PointerAction::PointerDown => None,
            PointerAction::Move => {
                let (x, y) = self.primary_position(event)?;
                let Some((down_x, down_y)) = self.down else {
                    self.begin_at(x, y, event.time_ms);
                    return Some(GesturePhase::Began(PanUpdate::default()));
                };
                self.tracker.add(event.time_ms, x, y);
                let (dx, dy) = (x - down_x, y - down_y);
                self.last = PanUpdate {
                    dx,
                    dy,
                    step_x: dx - self.last.dx,
                    step_y: dy - self.last.dy,
                    velocity_x: 0.0,
                    velocity_y: 0.0,
                };
                Some(GesturePhase::Changed(self.last))
            }
            PointerAction::PointerUp => {
                // Hand the gesture to a remaining pointer without a jump in displacement.
                if Some(event.pointer_id) == self.primary {
                    let next = event.pointers.iter().find(|p| p.id != event.pointer_id)?;
                    self.primary = Some(next.id);
                    self.down = Some((next.x - self.last.dx, next.y - self.last.dy));
                    self.tracker.clear();
                    self.tracker.add(event.time_ms, next.x, next.y);
                }
                None
            }
            PointerAction::Up => {
                if self.down.is_none() {
                    return None;
                }
                if let Some((x, y)) = self.primary_position(event) {
                    self.tracker.add(event.time_ms, x, y);
                }
                let (vx, vy) = self.tracker.velocity();
                let end = PanUpdate {
                    step_x: 0.0,
                    step_y: 0.0,
                    velocity_x: vx,
                    velocity_y: vy,
                    ..self.last
                };
                self.reset();
                Some(GesturePhase::Ended(end))
            }
            PointerAction::Cancel => {
                if self.down.is_none() {
                    return None;
                }
                let end = PanUpdate {
                    dx: self.last.dx,
                    dy: self.last.dy,
                    ..PanUpdate::default()
                };
                self.reset();
                Some(GesturePhase::Cancelled(end))
            }
        }
    }

    fn primary_position(&self, event: &PointerEvent) -> Option<(f64, f64)> {
        let p = self
            .primary
            .and_then(|id| event.find(id))
            .or_else(|| event.pointers.first())?;
        Some((p.x, p.y))
    }

    fn begin_at(&mut self, x: f64, y: f64, time_ms: u64) {
        self.down = Some((x, y));
        self.last = PanUpdate::default();
        self.tracker.clear();
        self.tracker.add(time_ms, x, y);
    }

    fn reset(&mut self) {
        self.primary = None;
        self.down = None;
        self.last = PanUpdate::default();
        self.tracker.clear();
    }
}
