//! Configuration surface for the analysis pipeline.
//!
//! All tunable parameters live in plain serde structs. Validation happens
//! once, when a pipeline or layer is built; after that, per-frame
//! processing is total and never surfaces errors.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced at configuration / setup time.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Frequency range is empty, inverted, or starts at/below zero
    #[error("invalid frequency range: {min} Hz .. {max} Hz")]
    InvalidFrequencyRange {
        /// Configured lower bound
        min: f32,
        /// Configured upper bound
        max: f32,
    },

    /// A layer was configured with zero display bins
    #[error("layer bin count must be greater than 0")]
    ZeroBins,

    /// A smoothing/attack/decay rate is outside (0, 1]
    #[error("{name} must be in (0, 1], got {value}")]
    RateOutOfRange {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f32,
    },

    /// A parameter that must be positive is zero or negative
    #[error("{name} must be greater than 0, got {value}")]
    NotPositive {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f32,
    },

    /// A parameter that must be non-negative is negative
    #[error("{name} must not be negative, got {value}")]
    Negative {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f32,
    },

    /// Transform length is unusable for the configured block size
    #[error("fft size {fft_size} is invalid for block size {block_size} (need a power of two >= block size)")]
    InvalidFftSize {
        /// Configured transform length
        fft_size: usize,
        /// Configured capture block size
        block_size: usize,
    },

    /// Settings file could not be read or written
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be parsed or encoded
    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Frequency mapping for one layer: which part of the spectrum it shows
/// and how raw bin energies are shaped before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Lower frequency bound in Hz (inclusive)
    pub freq_min: f32,
    /// Upper frequency bound in Hz (exclusive)
    pub freq_max: f32,
    /// Number of display bins
    pub bins: usize,
    /// Weight multiplier at `freq_min`
    pub low_freq_weight: f32,
    /// Weight multiplier at `freq_max`
    pub high_freq_weight: f32,
    /// Constant subtracted from each weighted bin, clamped at zero
    pub noise_floor: f32,
    /// Extra gain applied before the noise floor
    pub boost: f32,
}

impl Default for LayerSpec {
    fn default() -> Self {
        Self {
            freq_min: 100.0,
            freq_max: 6300.0,
            bins: 32,
            low_freq_weight: 0.55,
            high_freq_weight: 10.0,
            noise_floor: 0.3,
            boost: 1.0,
        }
    }
}

impl LayerSpec {
    /// Validate the spec; called once at layer setup.
    pub fn validate(&self) -> Result<()> {
        if !(self.freq_min > 0.0) || !(self.freq_max > self.freq_min) {
            return Err(ConfigError::InvalidFrequencyRange {
                min: self.freq_min,
                max: self.freq_max,
            });
        }
        if self.bins == 0 {
            return Err(ConfigError::ZeroBins);
        }
        check_non_negative("low_freq_weight", self.low_freq_weight)?;
        check_non_negative("high_freq_weight", self.high_freq_weight)?;
        check_non_negative("noise_floor", self.noise_floor)?;
        check_positive("boost", self.boost)?;
        Ok(())
    }
}

/// Normalization mode, selected once per layer.
///
/// Exactly one mode is active at a time; the per-frame update is a single
/// branch on this tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScalingMode {
    /// Constant divisor, no adaptation
    Fixed {
        /// Value that maps to a full bar
        max: f32,
    },
    /// Scale to the rolling RMS of recent frame levels plus headroom
    /// (recommended default)
    RollingRms {
        /// Length of the level history in seconds
        window_seconds: f32,
        /// Multiplier on the window RMS, leaves room above the average
        headroom: f32,
        /// Fraction per frame the scale moves toward a louder target
        attack_speed: f32,
        /// Fraction per frame the scale moves toward a quieter target
        decay_speed: f32,
        /// Hard floor for the scale, prevents runaway gain in silence
        min_scale: f32,
    },
    /// Scale to the maximum frame level inside the rolling window
    RollingMax {
        /// Length of the level history in seconds
        window_seconds: f32,
        /// Hard floor for the scale
        min_scale: f32,
    },
}

impl Default for ScalingMode {
    fn default() -> Self {
        ScalingMode::RollingRms {
            window_seconds: 3.0,
            headroom: 2.5,
            attack_speed: 0.1,
            decay_speed: 0.06,
            min_scale: 0.05,
        }
    }
}

impl ScalingMode {
    /// Validate mode parameters; called once at layer setup.
    pub fn validate(&self) -> Result<()> {
        match *self {
            ScalingMode::Fixed { max } => check_positive("fixed max", max),
            ScalingMode::RollingRms {
                window_seconds,
                headroom,
                attack_speed,
                decay_speed,
                min_scale,
            } => {
                check_positive("window_seconds", window_seconds)?;
                check_positive("headroom", headroom)?;
                check_rate("attack_speed", attack_speed)?;
                check_rate("decay_speed", decay_speed)?;
                check_positive("min_scale", min_scale)
            }
            ScalingMode::RollingMax {
                window_seconds,
                min_scale,
            } => {
                check_positive("window_seconds", window_seconds)?;
                check_positive("min_scale", min_scale)
            }
        }
    }
}

/// Full normalization configuration for one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingConfig {
    /// Active normalization mode
    #[serde(flatten)]
    pub mode: ScalingMode,
    /// Frame peaks below this fade the whole vector toward zero
    /// (0.0 disables the fade)
    pub silence_threshold: f32,
    /// Manual gain applied on top of the adaptive scale
    pub sensitivity: f32,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            mode: ScalingMode::default(),
            silence_threshold: 0.0,
            sensitivity: 1.0,
        }
    }
}

impl ScalingConfig {
    /// Validate scaling parameters.
    pub fn validate(&self) -> Result<()> {
        self.mode.validate()?;
        check_non_negative("silence_threshold", self.silence_threshold)?;
        check_positive("sensitivity", self.sensitivity)
    }
}

/// Asymmetric bar smoothing rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Fraction of the remaining distance a bar rises per frame
    pub rise: f32,
    /// Fraction of the remaining distance a bar falls per frame
    pub fall: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            rise: 0.4,
            fall: 0.1,
        }
    }
}

impl SmoothingConfig {
    /// Validate smoothing rates.
    pub fn validate(&self) -> Result<()> {
        check_rate("rise", self.rise)?;
        check_rate("fall", self.fall)
    }
}

/// Peak indicator behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakConfig {
    /// Height lost per frame once the hold expires
    pub fall_speed: f32,
    /// Frames a fresh peak stays latched before falling
    pub hold_frames: u32,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            fall_speed: 0.08,
            hold_frames: 8,
        }
    }
}

impl PeakConfig {
    /// Validate peak parameters.
    pub fn validate(&self) -> Result<()> {
        check_positive("peak fall_speed", self.fall_speed)
    }
}

/// Everything one layer needs: frequency mapping plus the dynamics of its
/// scaler, smoother and peak tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Frequency mapping and bin shaping
    pub spec: LayerSpec,
    /// Normalization mode and parameters
    pub scaling: ScalingConfig,
    /// Rise/fall smoothing rates
    pub smoothing: SmoothingConfig,
    /// Peak indicator parameters
    pub peak: PeakConfig,
    /// Suppressed layers are skipped entirely, with no state mutation
    pub visible: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            spec: LayerSpec::default(),
            scaling: ScalingConfig::default(),
            smoothing: SmoothingConfig::default(),
            peak: PeakConfig::default(),
            visible: true,
        }
    }
}

impl LayerConfig {
    /// Validate the whole layer configuration.
    pub fn validate(&self) -> Result<()> {
        self.spec.validate()?;
        self.scaling.validate()?;
        self.smoothing.validate()?;
        self.peak.validate()
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Samples delivered per capture block
    pub block_size: usize,
    /// Transform length; blocks are zero-padded up to this
    pub fft_size: usize,
    /// Approximate pipeline frame rate, used to size rolling windows
    pub frame_rate: f32,
    /// One entry per layer, each with independent dynamics
    pub layers: Vec<LayerConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            block_size: 512,
            fft_size: 8192,
            frame_rate: 200.0,
            layers: vec![LayerConfig::default()],
        }
    }
}

impl PipelineConfig {
    /// Validate the configuration, including every layer.
    ///
    /// This is the only place configuration errors are surfaced; once a
    /// pipeline is built, frame processing never fails.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(ConfigError::NotPositive {
                name: "block_size",
                value: 0.0,
            });
        }
        if self.fft_size < self.block_size || !self.fft_size.is_power_of_two() {
            return Err(ConfigError::InvalidFftSize {
                fft_size: self.fft_size,
                block_size: self.block_size,
            });
        }
        check_positive("frame_rate", self.frame_rate)?;
        for layer in &self.layers {
            layer.validate()?;
        }
        Ok(())
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}

fn check_rate(name: &'static str, value: f32) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::RateOutOfRange { name, value })
    }
}

fn check_positive(name: &'static str, value: f32) -> Result<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn check_non_negative(name: &'static str, value: f32) -> Result<()> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        PipelineConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_inverted_frequency_range() {
        let mut config = PipelineConfig::default();
        config.layers[0].spec.freq_min = 8000.0;
        config.layers[0].spec.freq_max = 100.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFrequencyRange { .. })
        ));
    }

    #[test]
    fn rejects_zero_bins() {
        let mut config = PipelineConfig::default();
        config.layers[0].spec.bins = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroBins)));
    }

    #[test]
    fn rejects_out_of_range_rates() {
        let mut config = PipelineConfig::default();
        config.layers[0].smoothing.rise = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RateOutOfRange { name: "rise", .. })
        ));

        let mut config = PipelineConfig::default();
        config.layers[0].smoothing.fall = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RateOutOfRange { name: "fall", .. })
        ));
    }

    #[test]
    fn rejects_non_power_of_two_fft() {
        let config = PipelineConfig {
            fft_size: 3000,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFftSize { .. })
        ));
    }

    #[test]
    fn json_round_trip() {
        let config = PipelineConfig::default();
        let text = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(config, back);
    }
}
