//! Named pipeline configurations for common program material.
//!
//! Presets are an explicit match, built at startup and passed by value;
//! there is no runtime registration.

use serde::{Deserialize, Serialize};

use crate::config::{
    LayerConfig, LayerSpec, PipelineConfig, ScalingMode, SmoothingConfig,
};

/// Built-in configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Balanced defaults
    Default,
    /// Acoustic material: mid-focused range, gentle adaptation
    Bluegrass,
    /// Electronic material: wide range, punchy adaptation, dual layers
    Edm,
    /// Orchestral material: wide range, slow smooth adaptation
    Classical,
    /// Speech: narrow voice band, conservative scaling
    Podcast,
}

impl Preset {
    /// Every preset, for listings.
    pub const ALL: [Preset; 5] = [
        Preset::Default,
        Preset::Bluegrass,
        Preset::Edm,
        Preset::Classical,
        Preset::Podcast,
    ];

    /// The preset's configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            Preset::Default => "default",
            Preset::Bluegrass => "bluegrass",
            Preset::Edm => "edm",
            Preset::Classical => "classical",
            Preset::Podcast => "podcast",
        }
    }

    /// Look a preset up by name.
    pub fn from_name(name: &str) -> Option<Preset> {
        Preset::ALL.iter().copied().find(|p| p.name() == name)
    }

    /// Build the preset's pipeline configuration.
    pub fn config(&self) -> PipelineConfig {
        match self {
            Preset::Default => PipelineConfig::default(),

            Preset::Bluegrass => {
                let mut config = PipelineConfig::default();
                let layer = &mut config.layers[0];
                layer.spec.freq_min = 80.0;
                layer.spec.freq_max = 8000.0;
                layer.spec.low_freq_weight = 0.6;
                layer.spec.high_freq_weight = 8.0;
                layer.spec.noise_floor = 0.25;
                layer.scaling.mode = ScalingMode::RollingRms {
                    window_seconds: 3.0,
                    headroom: 2.5,
                    attack_speed: 0.12,
                    decay_speed: 0.05,
                    min_scale: 0.05,
                };
                config
            }

            Preset::Edm => {
                let mut config = PipelineConfig::default();
                let base = &mut config.layers[0];
                base.spec.freq_min = 40.0;
                base.spec.freq_max = 12000.0;
                base.spec.low_freq_weight = 0.8;
                base.spec.high_freq_weight = 6.0;
                base.spec.noise_floor = 0.2;
                base.spec.boost = 1.8;
                base.scaling.mode = ScalingMode::RollingRms {
                    window_seconds: 3.0,
                    headroom: 3.0,
                    attack_speed: 0.15,
                    decay_speed: 0.08,
                    min_scale: 0.05,
                };
                base.smoothing = SmoothingConfig {
                    rise: 0.9,
                    fall: 0.3,
                };

                // Second layer overlays the top end with its own dynamics
                let top = LayerConfig {
                    spec: LayerSpec {
                        freq_min: 4000.0,
                        freq_max: 12000.0,
                        bins: 16,
                        low_freq_weight: 1.0,
                        high_freq_weight: 4.0,
                        noise_floor: 0.2,
                        boost: 1.0,
                    },
                    smoothing: SmoothingConfig {
                        rise: 0.9,
                        fall: 0.3,
                    },
                    ..LayerConfig::default()
                };
                config.layers.push(top);
                config
            }

            Preset::Classical => {
                let mut config = PipelineConfig::default();
                let layer = &mut config.layers[0];
                layer.spec.freq_min = 60.0;
                layer.spec.freq_max = 10000.0;
                layer.spec.low_freq_weight = 0.7;
                layer.spec.high_freq_weight = 5.0;
                layer.spec.noise_floor = 0.15;
                layer.scaling.mode = ScalingMode::RollingRms {
                    window_seconds: 5.0,
                    headroom: 2.2,
                    attack_speed: 0.08,
                    decay_speed: 0.04,
                    min_scale: 0.05,
                };
                layer.smoothing = SmoothingConfig {
                    rise: 0.3,
                    fall: 0.08,
                };
                config
            }

            Preset::Podcast => {
                let mut config = PipelineConfig::default();
                let layer = &mut config.layers[0];
                layer.spec.freq_min = 120.0;
                layer.spec.freq_max = 4000.0;
                layer.spec.low_freq_weight = 0.8;
                layer.spec.high_freq_weight = 4.0;
                layer.spec.noise_floor = 0.35;
                layer.scaling.mode = ScalingMode::RollingRms {
                    window_seconds: 4.0,
                    headroom: 2.0,
                    attack_speed: 0.1,
                    decay_speed: 0.05,
                    min_scale: 0.08,
                };
                config
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_validates() {
        for preset in Preset::ALL {
            preset
                .config()
                .validate()
                .unwrap_or_else(|e| panic!("{} invalid: {e}", preset.name()));
        }
    }

    #[test]
    fn names_round_trip() {
        for preset in Preset::ALL {
            assert_eq!(Preset::from_name(preset.name()), Some(preset));
        }
        assert_eq!(Preset::from_name("polka"), None);
    }

    #[test]
    fn edm_is_dual_layer() {
        let config = Preset::Edm.config();
        assert_eq!(config.layers.len(), 2);
        assert!(config.layers[1].spec.freq_min >= config.layers[0].spec.freq_min);
    }
}
