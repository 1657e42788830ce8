//! Adaptive normalization: raw bin energies in, 0..~1.5 bar values out.
//!
//! The scaler keeps a rolling history of per-frame levels so the display
//! range tracks recent loudness instead of a fixed threshold. Values above
//! 1.0 pass through untouched; they signal overflow intensity to the
//! renderer.

use std::collections::VecDeque;

use crate::config::{ScalingConfig, ScalingMode};

/// Per-layer normalization state.
///
/// One instance per layer, never shared: a loud bass layer must not move
/// a quiet treble layer's gain.
#[derive(Debug, Clone)]
pub struct AdaptiveScaler {
    mode: ScalingMode,
    silence_threshold: f32,
    sensitivity: f32,
    /// Rolling level observations, one per frame, bounded to the
    /// configured window duration.
    window: VecDeque<f32>,
    window_len: usize,
    scale: f32,
}

impl AdaptiveScaler {
    /// Build scaler state from a validated config.
    ///
    /// `frame_rate` converts the window duration into a frame count; one
    /// observation is pushed per frame, so the bound and the duration
    /// coincide.
    pub fn new(config: &ScalingConfig, frame_rate: f32) -> Self {
        let window_len = match config.mode {
            ScalingMode::RollingRms { window_seconds, .. }
            | ScalingMode::RollingMax { window_seconds, .. } => {
                ((window_seconds * frame_rate).round() as usize).max(1)
            }
            ScalingMode::Fixed { .. } => 0,
        };
        let scale = Self::initial_scale(&config.mode);
        Self {
            mode: config.mode.clone(),
            silence_threshold: config.silence_threshold,
            sensitivity: config.sensitivity,
            window: VecDeque::with_capacity(window_len),
            window_len,
            scale,
        }
    }

    fn initial_scale(mode: &ScalingMode) -> f32 {
        match *mode {
            ScalingMode::Fixed { max } => max,
            ScalingMode::RollingRms { min_scale, .. }
            | ScalingMode::RollingMax { min_scale, .. } => min_scale,
        }
    }

    /// The scale currently dividing raw values. Never below the
    /// configured floor in the rolling modes.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Normalize one raw bin vector into `out`, updating the rolling
    /// state. Tolerates all-zero input indefinitely: the min-scale floor
    /// keeps the divisor away from zero, so silence maps to zeros rather
    /// than exploding.
    pub fn normalize_into(&mut self, raw: &[f32], out: &mut [f32]) {
        debug_assert_eq!(raw.len(), out.len());

        let peak = raw.iter().fold(0.0f32, |acc, &v| acc.max(v));

        // Optional fade: a frame quieter than the threshold is pulled
        // toward zero instead of being amplified back up.
        let fade = if self.silence_threshold > 0.0 && peak < self.silence_threshold {
            peak / self.silence_threshold
        } else {
            1.0
        };

        self.scale = self.update_scale(peak);
        let divisor = self.scale * self.sensitivity;

        for (slot, &value) in out.iter_mut().zip(raw) {
            *slot = value * fade / divisor;
        }
    }

    fn update_scale(&mut self, peak: f32) -> f32 {
        match self.mode {
            ScalingMode::Fixed { max } => max,
            ScalingMode::RollingRms {
                headroom,
                attack_speed,
                decay_speed,
                min_scale,
                ..
            } => {
                self.push_observation(peak * peak);
                let mean = self.window.iter().sum::<f32>() / self.window.len() as f32;
                let rms = mean.sqrt();
                let target = (rms * headroom).max(min_scale);

                // Asymmetric rate limit on the gain itself: jump up fast
                // for transients, recover slowly in quiet passages.
                let rate = if target > self.scale {
                    attack_speed
                } else {
                    decay_speed
                };
                (self.scale + (target - self.scale) * rate).max(min_scale)
            }
            ScalingMode::RollingMax { min_scale, .. } => {
                self.push_observation(peak);
                self.window
                    .iter()
                    .fold(min_scale, |acc, &v| acc.max(v))
            }
        }
    }

    fn push_observation(&mut self, value: f32) {
        if self.window.len() == self.window_len {
            self.window.pop_front();
        }
        self.window.push_back(value);
    }

    /// Drop all history and return to the initial scale. Required when
    /// the layer's bin mapping changes.
    pub fn reset(&mut self) {
        self.window.clear();
        self.scale = Self::initial_scale(&self.mode);
    }
}
