//! Asymmetric bar smoothing: fast attack, slow release.
//!
//! A one-pole exponential filter per bin whose time constant depends on
//! direction, so bars jump to transients and drift back down afterward.

use crate::config::SmoothingConfig;

/// Per-layer smoothing state: the previous frame's value for each bin.
#[derive(Debug, Clone)]
pub struct Smoother {
    rise: f32,
    fall: f32,
    values: Vec<f32>,
}

impl Smoother {
    /// Build smoothing state for `bins` bars, initialized to zero.
    pub fn new(bins: usize, config: &SmoothingConfig) -> Self {
        Self {
            rise: config.rise,
            fall: config.fall,
            values: vec![0.0; bins],
        }
    }

    /// Fold one normalized vector into the running values and return
    /// them.
    ///
    /// No bounds are enforced: overflow values (> 1.0) pass through so
    /// the renderer can depict them.
    pub fn smooth(&mut self, normalized: &[f32]) -> &[f32] {
        debug_assert_eq!(normalized.len(), self.values.len());
        for (value, &target) in self.values.iter_mut().zip(normalized) {
            let delta = target - *value;
            let rate = if delta > 0.0 { self.rise } else { self.fall };
            *value += delta * rate;
        }
        &self.values
    }

    /// Current smoothed values without advancing state.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Zero all state, as if freshly constructed.
    pub fn reset(&mut self) {
        self.values.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config(rise: f32, fall: f32) -> SmoothingConfig {
        SmoothingConfig { rise, fall }
    }

    #[test]
    fn rises_by_the_rise_rate() {
        let mut smoother = Smoother::new(1, &config(0.8, 0.1));
        assert_relative_eq!(smoother.smooth(&[1.0])[0], 0.8);
        // 0.8 + (1.0 - 0.8) * 0.8 = 0.96
        assert_relative_eq!(smoother.smooth(&[1.0])[0], 0.96);
    }

    #[test]
    fn converges_monotonically_without_overshoot() {
        let mut smoother = Smoother::new(1, &config(0.4, 0.1));

        // Upward toward a constant target
        let mut previous = 0.0;
        for _ in 0..200 {
            let value = smoother.smooth(&[1.0])[0];
            assert!(value >= previous);
            assert!(value <= 1.0);
            previous = value;
        }
        assert!(previous > 0.999);

        // Downward toward zero, slower
        let mut previous = smoother.values()[0];
        for _ in 0..10 {
            let value = smoother.smooth(&[0.0])[0];
            assert!(value <= previous);
            assert!(value >= 0.0);
            previous = value;
        }
        assert!(previous > 0.0, "fall rate 0.1 should not hit zero in 10 frames");
    }

    #[test]
    fn overflow_passes_through() {
        let mut smoother = Smoother::new(1, &config(1.0, 1.0));
        assert_relative_eq!(smoother.smooth(&[1.4])[0], 1.4);
    }
}
