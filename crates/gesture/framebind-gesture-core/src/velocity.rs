//! Motion sample velocity estimation.

use std::collections::VecDeque;

use crate::GestureConfig;

#[derive(Copy, Clone, Debug)]
struct Sample {
    time_ms: u64,
    x: f64,
    y: f64,
}

/// Least-squares slope over the most recent samples.
///
/// Samples older than `velocity_horizon_ms` relative to the newest one are ignored,
/// and the result is clamped to `max_fling_velocity` on each axis.
#[derive(Clone, Debug)]
pub struct VelocityTracker {
    samples: VecDeque<Sample>,
    units_ms: f64,
    horizon_ms: u64,
    max_velocity: f64,
    capacity: usize,
}

impl VelocityTracker {
    pub fn new(cfg: &GestureConfig) -> Self {
        let capacity = cfg.max_samples.max(2);
        Self {
            samples: VecDeque::with_capacity(capacity),
            units_ms: cfg.velocity_units_ms.max(1) as f64,
            horizon_ms: cfg.velocity_horizon_ms,
            max_velocity: cfg.max_fling_velocity.abs(),
            capacity,
        }
    }

    pub fn add(&mut self, time_ms: u64, x: f64, y: f64) {
        if let Some(last) = self.samples.back() {
            // A time jump backwards means a new stream; start over.
            if time_ms < last.time_ms {
                self.samples.clear();
            }
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(Sample { time_ms, x, y });
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// `(vx, vy)` in units per `velocity_units_ms`. Zero when fewer than two usable samples.
    pub fn velocity(&self) -> (f64, f64) {
        let Some(newest) = self.samples.back() else {
            return (0.0, 0.0);
        };
        let window: Vec<&Sample> = self
            .samples
            .iter()
            .filter(|s| newest.time_ms - s.time_ms <= self.horizon_ms)
            .collect();
        if window.len() < 2 {
            return (0.0, 0.0);
        }

        let n = window.len() as f64;
        let t0 = window[0].time_ms;
        let ts: Vec<f64> = window.iter().map(|s| (s.time_ms - t0) as f64).collect();
        let mean_t = ts.iter().sum::<f64>() / n;
        let var_t: f64 = ts.iter().map(|t| (t - mean_t).powi(2)).sum();
        if var_t == 0.0 {
            return (0.0, 0.0);
        }
        let slope = |coord: fn(&Sample) -> f64| -> f64 {
            let mean = window.iter().map(|s| coord(*s)).sum::<f64>() / n;
            let cov: f64 = window
                .iter()
                .zip(ts.iter())
                .map(|(s, t)| (t - mean_t) * (coord(*s) - mean))
                .sum();
            cov / var_t
        };
        let clamp = |v: f64| (v * self.units_ms).clamp(-self.max_velocity, self.max_velocity);
        (clamp(slope(|s| s.x)), clamp(slope(|s| s.y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn constant_motion_per_second() {
        let mut vt = VelocityTracker::new(&GestureConfig::default());
        for i in 0..6u64 {
            vt.add(i * 10, i as f64 * 5.0, i as f64 * -2.0);
        }
        let (vx, vy) = vt.velocity();
        assert_relative_eq!(vx, 500.0, epsilon = 1e-9);
        assert_relative_eq!(vy, -200.0, epsilon = 1e-9);
    }

    #[test]
    fn clamps_to_max_fling_and_ignores_stale_samples() {
        let cfg = GestureConfig {
            max_fling_velocity: 1000.0,
            ..GestureConfig::default()
        };
        let mut vt = VelocityTracker::new(&cfg);
        vt.add(0, 0.0, 0.0);
        vt.add(1_000, 0.0, 0.0);
        vt.add(1_010, 100.0, 0.0);
        assert_eq!(vt.velocity(), (1000.0, 0.0));
    }

    #[test]
    fn single_sample_is_still() {
        let mut vt = VelocityTracker::new(&GestureConfig::default());
        assert_eq!(vt.velocity(), (0.0, 0.0));
        vt.add(5, 1.0, 1.0);
        assert_eq!(vt.velocity(), (0.0, 0.0));
    }
}
