use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The input source a binding is driven by.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Pan,
    Pinch,
    Rotation,
    Scroll,
    Timing,
    Spring,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::Pan,
        EventKind::Pinch,
        EventKind::Rotation,
        EventKind::Scroll,
        EventKind::Timing,
        EventKind::Spring,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Pan => "pan",
            EventKind::Pinch => "pinch",
            EventKind::Rotation => "rotation",
            EventKind::Scroll => "scroll",
            EventKind::Timing => "timing",
            EventKind::Spring => "spring",
        }
    }

    /// Kinds driven by the frame clock rather than by pointer input.
    pub fn is_time_driven(&self) -> bool {
        matches!(self, EventKind::Timing | EventKind::Spring)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pan" => Ok(EventKind::Pan),
            "pinch" => Ok(EventKind::Pinch),
            "rotation" => Ok(EventKind::Rotation),
            "scroll" => Ok(EventKind::Scroll),
            "timing" => Ok(EventKind::Timing),
            "spring" => Ok(EventKind::Spring),
            other => Err(format!("unknown event kind '{other}'")),
        }
    }
}
