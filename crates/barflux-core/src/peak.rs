//! Hold-then-decay peak markers.

use crate::config::PeakConfig;

/// Per-layer peak state: a latched height and a remaining hold count per
/// bin.
///
/// A marker latches to any bar that reaches it, holds for the configured
/// number of frames, then sinks — but never below the live bar, so
/// `peak >= smoothed` holds after every update.
#[derive(Debug, Clone)]
pub struct PeakTracker {
    fall_speed: f32,
    hold_frames: u32,
    heights: Vec<f32>,
    hold: Vec<u32>,
}

impl PeakTracker {
    /// Build peak state for `bins` bars, initialized to zero.
    pub fn new(bins: usize, config: &PeakConfig) -> Self {
        Self {
            fall_speed: config.fall_speed,
            hold_frames: config.hold_frames,
            heights: vec![0.0; bins],
            hold: vec![0; bins],
        }
    }

    /// Advance the markers one frame against the current smoothed bars.
    pub fn update(&mut self, smoothed: &[f32]) -> &[f32] {
        debug_assert_eq!(smoothed.len(), self.heights.len());
        for i in 0..self.heights.len() {
            let bar = smoothed[i];
            if bar >= self.heights[i] {
                self.heights[i] = bar;
                self.hold[i] = self.hold_frames;
            } else if self.hold[i] > 0 {
                self.hold[i] -= 1;
            } else {
                self.heights[i] = bar.max(self.heights[i] - self.fall_speed);
            }
        }
        &self.heights
    }

    /// Current marker heights without advancing state.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Zero all state, as if freshly constructed.
    pub fn reset(&mut self) {
        self.heights.fill(0.0);
        self.hold.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config(fall_speed: f32, hold_frames: u32) -> PeakConfig {
        PeakConfig {
            fall_speed,
            hold_frames,
        }
    }

    #[test]
    fn latches_holds_then_decays() {
        let mut tracker = PeakTracker::new(1, &config(0.1, 2));

        assert_relative_eq!(tracker.update(&[0.9])[0], 0.9);

        // Two hold frames at full height
        assert_relative_eq!(tracker.update(&[0.1])[0], 0.9);
        assert_relative_eq!(tracker.update(&[0.1])[0], 0.9);

        // Then it starts falling
        assert_relative_eq!(tracker.update(&[0.1])[0], 0.8, epsilon = 1e-6);
        assert_relative_eq!(tracker.update(&[0.1])[0], 0.7, epsilon = 1e-6);
    }

    #[test]
    fn never_drops_below_the_live_bar() {
        let mut tracker = PeakTracker::new(1, &config(0.5, 0));
        tracker.update(&[0.9]);
        // Large fall step, but the bar at 0.6 catches the marker
        assert_relative_eq!(tracker.update(&[0.6])[0], 0.6);
    }

    #[test]
    fn peak_stays_at_or_above_smoothed() {
        let mut tracker = PeakTracker::new(4, &config(0.08, 8));
        let frames: &[[f32; 4]] = &[
            [0.1, 0.9, 0.0, 0.4],
            [0.8, 0.2, 0.0, 0.4],
            [0.0, 0.0, 1.2, 0.3],
            [0.3, 0.1, 0.5, 0.9],
        ];
        for bars in frames {
            let peaks = tracker.update(bars);
            for (peak, bar) in peaks.iter().zip(bars) {
                assert!(peak >= bar, "peak {peak} below bar {bar}");
            }
        }
    }

    #[test]
    fn rising_bar_resets_the_hold() {
        let mut tracker = PeakTracker::new(1, &config(0.1, 1));
        tracker.update(&[0.5]);
        tracker.update(&[0.7]); // new latch, hold reset
        assert_relative_eq!(tracker.update(&[0.1])[0], 0.7, epsilon = 1e-6); // hold frame
        assert_relative_eq!(tracker.update(&[0.1])[0], 0.6, epsilon = 1e-6); // decay
    }
}
