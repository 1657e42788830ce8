//! One independently configured frequency layer.
//!
//! A layer owns exactly one band extractor, scaler, smoother and peak
//! tracker; none of them are shared, so a loud bass layer can never move
//! a treble layer's gain. A layer is either Active (stepped every frame)
//! or Suppressed (skipped entirely, no state mutation).

use crate::bands::{BandExtractor, BinEdges};
use crate::config::{LayerConfig, LayerSpec, Result};
use crate::peak::PeakTracker;
use crate::scaler::AdaptiveScaler;
use crate::smoother::Smoother;
use crate::spectrum::SpectrumFrame;

/// A frequency layer with its full per-frame state.
#[derive(Debug, Clone)]
pub struct Layer {
    config: LayerConfig,
    extractor: BandExtractor,
    scaler: AdaptiveScaler,
    smoother: Smoother,
    peaks: PeakTracker,
    raw: Vec<f32>,
    normalized: Vec<f32>,
    fft_size: usize,
    sample_rate: u32,
    frame_rate: f32,
}

impl Layer {
    /// Validate the configuration and build all per-layer state,
    /// pre-sizing every per-frame buffer.
    pub fn new(
        config: LayerConfig,
        fft_size: usize,
        sample_rate: u32,
        frame_rate: f32,
    ) -> Result<Self> {
        config.validate()?;
        let bins = config.spec.bins;
        let extractor = BandExtractor::new(&config.spec, fft_size, sample_rate);
        let scaler = AdaptiveScaler::new(&config.scaling, frame_rate);
        let smoother = Smoother::new(bins, &config.smoothing);
        let peaks = PeakTracker::new(bins, &config.peak);
        Ok(Self {
            config,
            extractor,
            scaler,
            smoother,
            peaks,
            raw: vec![0.0; bins],
            normalized: vec![0.0; bins],
            fft_size,
            sample_rate,
            frame_rate,
        })
    }

    /// Whether this layer is stepped each frame.
    pub fn is_active(&self) -> bool {
        self.config.visible
    }

    /// Suppress or re-activate the layer.
    ///
    /// Re-activation resumes from the last smoothed/peak values; the worst
    /// discontinuity is one frame of rise time, so no resynchronization is
    /// needed.
    pub fn set_visible(&mut self, visible: bool) {
        self.config.visible = visible;
    }

    /// Number of display bins this layer produces.
    pub fn bins(&self) -> usize {
        self.config.spec.bins
    }

    /// The layer's configuration.
    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    /// The transform-bin boundaries currently in use.
    pub fn edges(&self) -> &BinEdges {
        self.extractor.edges()
    }

    /// Replace the frequency mapping.
    ///
    /// Scaler, smoother and peak history are tied to the old bin mapping
    /// and meaningless under the new one, so all of it is reset.
    pub fn set_spec(&mut self, spec: LayerSpec) -> Result<()> {
        spec.validate()?;
        let bins = spec.bins;
        self.extractor = BandExtractor::new(&spec, self.fft_size, self.sample_rate);
        self.config.spec = spec;
        self.scaler = AdaptiveScaler::new(&self.config.scaling, self.frame_rate);
        self.smoother = Smoother::new(bins, &self.config.smoothing);
        self.peaks = PeakTracker::new(bins, &self.config.peak);
        self.raw.resize(bins, 0.0);
        self.raw.fill(0.0);
        self.normalized.resize(bins, 0.0);
        self.normalized.fill(0.0);
        Ok(())
    }

    /// Run one frame step: extract, normalize, smooth, track peaks.
    ///
    /// Suppressed layers return immediately without touching any state.
    /// Total once constructed; never fails per frame.
    pub fn frame(&mut self, frame: &SpectrumFrame<'_>) {
        if !self.config.visible {
            return;
        }
        self.extractor.extract_into(frame, &mut self.raw);
        self.scaler.normalize_into(&self.raw, &mut self.normalized);
        self.smoother.smooth(&self.normalized);
        self.peaks.update(self.smoother.values());
    }

    /// Smoothed bar heights, nominally 0..1 with >1 overflow. Valid until
    /// the next frame step.
    pub fn bars(&self) -> &[f32] {
        self.smoother.values()
    }

    /// Peak marker heights. Valid until the next frame step.
    pub fn peaks(&self) -> &[f32] {
        self.peaks.heights()
    }

    /// This frame's normalized values before smoothing.
    pub fn normalized(&self) -> &[f32] {
        &self.normalized
    }

    /// The scaler's current divisor.
    pub fn scale(&self) -> f32 {
        self.scaler.scale()
    }

    /// Zero all dynamic state while keeping the configuration.
    pub fn reset(&mut self) {
        self.scaler.reset();
        self.smoother.reset();
        self.peaks.reset();
        self.raw.fill(0.0);
        self.normalized.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayerConfig;

    fn flat_frame(magnitudes: &[f32]) -> SpectrumFrame<'_> {
        SpectrumFrame::new(magnitudes, 44100, 8192)
    }

    fn test_layer() -> Layer {
        Layer::new(LayerConfig::default(), 8192, 44100, 200.0).unwrap()
    }

    #[test]
    fn suppressed_layer_mutates_nothing() {
        let mut layer = test_layer();
        layer.set_visible(false);

        let magnitudes = vec![5.0; 4097];
        layer.frame(&flat_frame(&magnitudes));

        assert!(layer.bars().iter().all(|&v| v == 0.0));
        assert!(layer.peaks().iter().all(|&v| v == 0.0));
        assert_eq!(layer.scale(), 0.05);
    }

    #[test]
    fn active_layer_responds_to_signal() {
        let mut layer = test_layer();
        let magnitudes = vec![5.0; 4097];
        layer.frame(&flat_frame(&magnitudes));
        assert!(layer.bars().iter().any(|&v| v > 0.0));
    }

    #[test]
    fn reactivation_resumes_from_previous_state() {
        let mut layer = test_layer();
        let magnitudes = vec![5.0; 4097];
        layer.frame(&flat_frame(&magnitudes));
        let before = layer.bars().to_vec();

        layer.set_visible(false);
        let silent = vec![0.0; 4097];
        layer.frame(&flat_frame(&silent));
        assert_eq!(layer.bars(), &before[..]);

        layer.set_visible(true);
        layer.frame(&flat_frame(&silent));
        // One frame of fall from the held values, not a jump to zero
        for (now, then) in layer.bars().iter().zip(&before) {
            assert!(now <= then);
        }
    }

    #[test]
    fn spec_change_resets_all_state() {
        let mut layer = test_layer();
        let magnitudes = vec![5.0; 4097];
        for _ in 0..10 {
            layer.frame(&flat_frame(&magnitudes));
        }
        assert!(layer.scale() > 0.05);

        layer
            .set_spec(LayerSpec {
                bins: 16,
                ..LayerSpec::default()
            })
            .unwrap();

        assert_eq!(layer.bins(), 16);
        assert_eq!(layer.bars().len(), 16);
        assert!(layer.bars().iter().all(|&v| v == 0.0));
        assert!(layer.peaks().iter().all(|&v| v == 0.0));
        assert_eq!(layer.scale(), 0.05);
    }

    #[test]
    fn invalid_spec_change_is_rejected_and_ignored() {
        let mut layer = test_layer();
        let err = layer.set_spec(LayerSpec {
            freq_min: 500.0,
            freq_max: 100.0,
            ..LayerSpec::default()
        });
        assert!(err.is_err());
        assert_eq!(layer.bins(), 32);
    }
}
