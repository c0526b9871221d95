//! Two-finger pinch scale.

use crate::{GesturePhase, PointerAction, PointerEvent, PointerId};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PinchUpdate {
    /// Product of every per-move factor since the gesture began.
    pub scale: f64,
    /// Current span over previous span for this move.
    pub factor: f64,
    pub focus_x: f64,
    pub focus_y: f64,
}

#[derive(Debug)]
pub struct PinchRecognizer {
    pointers: [Option<PointerId>; 2],
    in_progress: bool,
    prev_span: Option<f64>,
    scale: f64,
    focus: (f64, f64),
}

impl Default for PinchRecognizer {
    fn default() -> Self {
        Self {
            pointers: [None, None],
            in_progress: false,
            prev_span: None,
            scale: 1.0,
            focus: (0.0, 0.0),
        }
    }
}

impl PinchRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn on_pointer(&mut self, event: &PointerEvent) -> Option<GesturePhase<PinchUpdate>> {
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
                    self.pointers[0] = event
                        .pointers
                        .iter()
                        .map(|p| p.id)
                        .find(|id| *id != event.pointer_id);
                }
                self.pointers[1] = Some(event.pointer_id);
                self.in_progress = true;
                self.scale = 1.0;
                self.prev_span = self.span(event);
                Some(GesturePhase::Began(self.update(1.0)))
            }
            PointerAction::Move => {
                if !self.in_progress {
                    return None;
                }
                let span = self.span(event)?;
                let factor = match self.prev_span {
                    Some(prev) => span / prev,
                    None => f64::NAN,
                };
                self.prev_span = Some(span);
                if !factor.is_finite() {
                    log::trace!("[PinchRecognizer] discarding non-finite factor");
                    return None;
                }
                self.scale *= factor;
                Some(GesturePhase::Changed(self.update(factor)))
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

    fn span(&mut self, event: &PointerEvent) -> Option<f64> {
        let a = event.find(self.pointers[0]?)?;
        let b = event.find(self.pointers[1]?)?;
        self.focus = ((a.x + b.x) * 0.5, (a.y + b.y) * 0.5);
        Some((b.x - a.x).hypot(b.y - a.y))
    }

    fn update(&self, factor: f64) -> PinchUpdate {
        PinchUpdate {
            scale: self.scale,
            factor,
            focus_x: self.focus.0,
            focus_y: self.focus.1,
        }
    }

    fn finish(&mut self) -> Option<GesturePhase<PinchUpdate>> {
        if !self.in_progress {
            return None;
        }
        let end = GesturePhase::Ended(self.update(1.0));
        self.in_progress = false;
        self.pointers = [None, None];
        self.prev_span = None;
        self.scale = 1.0;
        Some(end)
    }
}
