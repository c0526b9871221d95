//! Configuration for frame scheduling and spring physics.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Frame scheduler tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Minimum spacing between ticks for the interval cadence.
    pub interval_ms: u64,
    /// How long an off-thread construction waits for the render thread.
    pub handoff_timeout_ms: u64,
    /// Use vsync pulses when the host provides them.
    pub prefer_vsync: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 16,
            handoff_timeout_ms: 500,
            prefer_vsync: true,
        }
    }
}

/// Spring parameters, camelCase on the wire to match `eventConfig`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
    pub initial_velocity: f64,
    pub from_value: f64,
    pub to_value: f64,
    pub rest_speed_threshold: f64,
    pub rest_displacement_threshold: f64,
    pub overshoot_clamping: bool,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 100.0,
            damping: 10.0,
            mass: 1.0,
            initial_velocity: 0.0,
            from_value: 0.0,
            to_value: 1.0,
            rest_speed_threshold: 0.001,
            rest_displacement_threshold: 0.001,
            overshoot_clamping: false,
        }
    }
}

impl SpringConfig {
    /// Read from an `eventConfig` map. Missing or non-numeric keys keep their defaults.
    pub fn from_event_config(map: &Map<String, JsonValue>) -> Self {
        let mut cfg = Self::default();
        let num = |key: &str| map.get(key).and_then(JsonValue::as_f64).filter(|v| v.is_finite());
        if let Some(v) = num("stiffness") {
            cfg.stiffness = v;
        }
        if let Some(v) = num("damping") {
            cfg.damping = v;
        }
        if let Some(v) = num("mass") {
            cfg.mass = v;
        }
        if let Some(v) = num("initialVelocity") {
            cfg.initial_velocity = v;
        }
        if let Some(v) = num("fromValue") {
            cfg.from_value = v;
        }
        if let Some(v) = num("toValue") {
            cfg.to_value = v;
        }
        if let Some(v) = num("restSpeedThreshold") {
            cfg.rest_speed_threshold = v;
        }
        if let Some(v) = num("restDisplacementThreshold") {
            cfg.rest_displacement_threshold = v;
        }
        if let Some(b) = map.get("overshootClamping").and_then(JsonValue::as_bool) {
            cfg.overshoot_clamping = b;
        }
        cfg.validated()
    }

    /// Replace parameters the closed form cannot integrate with their defaults.
    ///
    /// Mass must be positive, stiffness and damping non-negative, and every
    /// number finite. Anything else would produce NaN positions and a spring
    /// that never comes to rest.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        let fix = |name: &str, value: &mut f64, fallback: f64, ok: fn(f64) -> bool| {
            if !(value.is_finite() && ok(*value)) {
                log::warn!("[SpringConfig] invalid {name} {value}; using {fallback}");
                *value = fallback;
            }
        };
        let any = |_: f64| true;
        let positive = |v: f64| v > 0.0;
        let non_negative = |v: f64| v >= 0.0;
        fix("mass", &mut self.mass, defaults.mass, positive);
        fix("stiffness", &mut self.stiffness, defaults.stiffness, non_negative);
        fix("damping", &mut self.damping, defaults.damping, non_negative);
        fix("initialVelocity", &mut self.initial_velocity, defaults.initial_velocity, any);
        fix("fromValue", &mut self.from_value, defaults.from_value, any);
        fix("toValue", &mut self.to_value, defaults.to_value, any);
        fix(
            "restSpeedThreshold",
            &mut self.rest_speed_threshold,
            defaults.rest_speed_threshold,
            positive,
        );
        fix(
            "restDisplacementThreshold",
            &mut self.rest_displacement_threshold,
            defaults.rest_displacement_threshold,
            positive,
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn partial_event_config_keeps_defaults() {
        let map = json!({ "stiffness": 200, "toValue": 3.5, "mass": "heavy" });
        let cfg = SpringConfig::from_event_config(map.as_object().unwrap());
        assert_eq!(cfg.stiffness, 200.0);
        assert_eq!(cfg.to_value, 3.5);
        assert_eq!(cfg.mass, 1.0);
        assert_eq!(cfg.damping, 10.0);
    }

    #[test]
    fn unusable_spring_parameters_fall_back_to_defaults() {
        let map = json!({ "mass": 0, "stiffness": -5, "damping": 4, "restSpeedThreshold": -1 });
        let cfg = SpringConfig::from_event_config(map.as_object().unwrap());
        assert_eq!(cfg.mass, 1.0);
        assert_eq!(cfg.stiffness, 100.0);
        assert_eq!(cfg.damping, 4.0);
        assert_eq!(cfg.rest_speed_threshold, 0.001);

        let cfg = SpringConfig {
            mass: -2.0,
            stiffness: f64::INFINITY,
            damping: f64::NAN,
            to_value: f64::NAN,
            ..SpringConfig::default()
        }
        .validated();
        assert_eq!(cfg, SpringConfig::default());

        let still = SpringConfig {
            stiffness: 0.0,
            damping: 0.0,
            ..SpringConfig::default()
        };
        assert_eq!(still.clone().validated(), still);
    }

    #[test]
    fn serde_defaults_fill_gaps() {
        let cfg: SchedulerConfig = serde_json::from_str(r#"{ "interval_ms": 8 }"#).unwrap();
        assert_eq!(cfg.interval_ms, 8);
        assert_eq!(cfg.handoff_timeout_ms, 500);
        let spring: SpringConfig = serde_json::from_str(r#"{ "overshootClamping": true }"#).unwrap();
        assert!(spring.overshoot_clamping);
        assert_eq!(spring.rest_speed_threshold, 0.001);
    }
}
