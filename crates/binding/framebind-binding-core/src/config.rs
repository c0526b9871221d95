//! Top-level configuration for a [`crate::BindingCore`].

use framebind_animation_core::SchedulerConfig;
use framebind_gesture_core::GestureConfig;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub scheduler: SchedulerConfig,
    pub gesture: GestureConfig,
    /// Upper bound on live bindings. `0` disables the limit.
    pub max_bindings: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            gesture: GestureConfig::default(),
            max_bindings: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: CoreConfig =
            serde_json::from_str(r#"{ "scheduler": { "interval_ms": 33 }, "max_bindings": 0 }"#)
                .unwrap();
        assert_eq!(cfg.scheduler.interval_ms, 33);
        assert_eq!(cfg.scheduler.handoff_timeout_ms, 500);
        assert_eq!(cfg.gesture, GestureConfig::default());
        assert_eq!(cfg.max_bindings, 0);
    }
}
