use serde::{Deserialize, Serialize};

/// Velocity estimation and fling limits shared by the pan and scroll recognizers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Velocities are reported per this many milliseconds (1000 = per second).
    pub velocity_units_ms: u64,
    /// Only samples this recent (relative to the newest) feed the estimate.
    pub velocity_horizon_ms: u64,
    /// Absolute cap on reported velocity, device units per `velocity_units_ms`.
    pub max_fling_velocity: f64,
    /// Ring size for retained motion samples.
    pub max_samples: usize,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            velocity_units_ms: 1000,
            velocity_horizon_ms: 100,
            max_fling_velocity: 8000.0,
            max_samples: 20,
        }
    }
}
