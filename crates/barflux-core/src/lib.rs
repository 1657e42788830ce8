//! BarFlux Core - Spectral-to-Visual Reduction Pipeline
//!
//! This crate turns a live audio stream into stable, responsive bar
//! heights for a low-resolution display:
//! - Spectrum analysis (windowed, zero-padded forward FFT)
//! - Multi-layer logarithmic band extraction with frequency weighting
//! - Adaptive loudness normalization (fixed / rolling-RMS / rolling-max)
//! - Asymmetric rise/fall smoothing and hold-then-decay peak markers
//!
//! The whole pipeline runs synchronously once per frame; the only
//! concurrency boundary is the single-slot sample-block hand-off in
//! [`handoff`].

#![warn(missing_docs)]

pub mod bands;
pub mod config;
pub mod handoff;
pub mod layer;
pub mod logging;
pub mod peak;
pub mod pipeline;
pub mod presets;
pub mod scaler;
pub mod smoother;
pub mod spectrum;

// --- Re-exports grouped by category ---

// Configuration
pub use config::{
    ConfigError, LayerConfig, LayerSpec, PeakConfig, PipelineConfig, ScalingConfig, ScalingMode,
    SmoothingConfig,
};
pub use presets::Preset;

// Pipeline stages
pub use bands::{BandExtractor, BinEdges};
pub use peak::PeakTracker;
pub use scaler::AdaptiveScaler;
pub use smoother::Smoother;
pub use spectrum::{SpectrumAnalyzer, SpectrumFrame};

// Orchestration
pub use handoff::{BlockSlot, SampleBlock};
pub use layer::Layer;
pub use pipeline::{Pipeline, PipelineStats};

// Logging
pub use logging::{LogConfig, LogGuard};
