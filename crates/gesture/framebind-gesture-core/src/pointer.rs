//! Raw pointer input as delivered by the host.

use serde::{Deserialize, Serialize};

pub type PointerId = u32;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerAction {
    /// First pointer touches down.
    Down,
    Move,
    /// An additional pointer touches down.
    PointerDown,
    /// A non-final pointer lifts.
    PointerUp,
    /// The final pointer lifts.
    Up,
    Cancel,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pointer {
    pub id: PointerId,
    pub x: f64,
    pub y: f64,
}

impl Pointer {
    pub fn new(id: PointerId, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }
}

/// One event in a strictly ordered pointer stream.
///
/// `pointers` lists every pointer active at the time of the event, including the
/// acting pointer for `Down`/`PointerDown`/`PointerUp`/`Up`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub action: PointerAction,
    pub pointer_id: PointerId,
    pub pointers: Vec<Pointer>,
    pub time_ms: u64,
}

impl PointerEvent {
    pub fn new(action: PointerAction, pointer_id: PointerId, pointers: Vec<Pointer>, time_ms: u64) -> Self {
        Self {
            action,
            pointer_id,
            pointers,
            time_ms,
        }
    }

    /// Single-pointer convenience constructor.
    pub fn single(action: PointerAction, x: f64, y: f64, time_ms: u64) -> Self {
        Self::new(action, 0, vec![Pointer::new(0, x, y)], time_ms)
    }

    pub fn find(&self, id: PointerId) -> Option<&Pointer> {
        self.pointers.iter().find(|p| p.id == id)
    }

    /// The pointer this event is about.
    pub fn acting(&self) -> Option<&Pointer> {
        self.find(self.pointer_id)
    }
}
