//! framebind gesture core
//!
//! Stateful recognizers that turn an ordered pointer stream into continuous
//! measurements plus discrete phases. Recognizers never call out; the caller
//! feeds events and acts on the returned [`GesturePhase`].

pub mod config;
pub mod pan;
pub mod phase;
pub mod pinch;
pub mod pointer;
pub mod rotation;
pub mod scroll;
pub mod velocity;

pub use config::GestureConfig;
pub use pan::{PanRecognizer, PanUpdate};
pub use phase::GesturePhase;
pub use pinch::{PinchRecognizer, PinchUpdate};
pub use pointer::{Pointer, PointerAction, PointerEvent, PointerId};
pub use rotation::{normalize_delta, RotationRecognizer, RotationUpdate};
pub use scroll::{ScrollEvent, ScrollRecognizer, ScrollUpdate};
pub use velocity::VelocityTracker;
