//! Band extraction: one magnitude spectrum in, one raw bin vector per
//! layer out.
//!
//! Edges and weights are derived once when a layer spec is set, never per
//! frame. Extraction itself is a pure function of the spectrum frame and
//! the precomputed tables.

use crate::config::LayerSpec;
use crate::spectrum::SpectrumFrame;

/// Transform-bin boundaries for a layer's display bins.
///
/// Holds `bins + 1` monotonically non-decreasing indices into the
/// magnitude array; display bin `i` covers transform bins
/// `edges[i]..edges[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinEdges {
    edges: Vec<usize>,
}

impl BinEdges {
    /// Map `bins + 1` logarithmically spaced frequencies between
    /// `freq_min` and `freq_max` onto transform-bin indices.
    ///
    /// Each frequency becomes `round(f * fft_size / sample_rate)`, clamped
    /// to the valid bin range. Log-spaced frequencies are monotonic and
    /// rounding preserves that, so the result is non-decreasing by
    /// construction.
    pub fn compute(spec: &LayerSpec, fft_size: usize, sample_rate: u32) -> Self {
        let max_bin = fft_size / 2;
        let ratio = spec.freq_max / spec.freq_min;
        let edges = (0..=spec.bins)
            .map(|i| {
                let freq = spec.freq_min * ratio.powf(i as f32 / spec.bins as f32);
                let bin = (freq * fft_size as f32 / sample_rate as f32).round() as usize;
                bin.min(max_bin)
            })
            .collect();
        Self { edges }
    }

    /// The boundary indices, `bins + 1` of them.
    pub fn as_slice(&self) -> &[usize] {
        &self.edges
    }

    /// Number of display bins these edges describe.
    pub fn bins(&self) -> usize {
        self.edges.len() - 1
    }
}

/// Maps a spectrum frame into a layer's raw bin vector.
///
/// Owns the layer's precomputed edges and per-bin weights; shaping
/// (weight, boost, noise floor) is baked in at construction.
#[derive(Debug, Clone)]
pub struct BandExtractor {
    edges: BinEdges,
    weights: Vec<f32>,
    noise_floor: f32,
}

impl BandExtractor {
    /// Derive edges and weights for a validated layer spec.
    pub fn new(spec: &LayerSpec, fft_size: usize, sample_rate: u32) -> Self {
        let edges = BinEdges::compute(spec, fft_size, sample_rate);

        // Linear weight ramp evaluated at each display bin's center
        // frequency, with the boost folded in.
        let ratio = spec.freq_max / spec.freq_min;
        let span = spec.freq_max - spec.freq_min;
        let weights = (0..spec.bins)
            .map(|i| {
                let f_lo = spec.freq_min * ratio.powf(i as f32 / spec.bins as f32);
                let f_hi = spec.freq_min * ratio.powf((i + 1) as f32 / spec.bins as f32);
                let center = ((f_lo + f_hi) / 2.0).clamp(spec.freq_min, spec.freq_max);
                let t = (center - spec.freq_min) / span;
                let weight = spec.low_freq_weight + (spec.high_freq_weight - spec.low_freq_weight) * t;
                weight * spec.boost
            })
            .collect();

        Self {
            edges,
            weights,
            noise_floor: spec.noise_floor,
        }
    }

    /// The transform-bin boundaries in use.
    pub fn edges(&self) -> &BinEdges {
        &self.edges
    }

    /// Number of display bins produced per frame.
    pub fn bins(&self) -> usize {
        self.edges.bins()
    }

    /// Extract one raw bin vector from a spectrum frame.
    ///
    /// Each display bin is the mean magnitude over its transform-bin
    /// range, weighted, with the noise floor subtracted and clamped at
    /// zero. A degenerate range (`lo == hi`, possible when the display
    /// bin is narrower than one transform bin) falls back to the single
    /// nearest transform bin rather than an empty average.
    pub fn extract_into(&self, frame: &SpectrumFrame<'_>, out: &mut [f32]) {
        debug_assert_eq!(out.len(), self.bins());
        debug_assert!(*self.edges.as_slice().last().unwrap() <= frame.max_bin());

        let magnitudes = frame.magnitudes();
        let edges = self.edges.as_slice();
        for (i, slot) in out.iter_mut().enumerate() {
            let (lo, hi) = (edges[i], edges[i + 1]);
            let mean = if hi > lo {
                magnitudes[lo..hi].iter().sum::<f32>() / (hi - lo) as f32
            } else {
                magnitudes[lo]
            };
            *slot = (mean * self.weights[i] - self.noise_floor).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayerSpec;

    fn spec(freq_min: f32, freq_max: f32, bins: usize) -> LayerSpec {
        LayerSpec {
            freq_min,
            freq_max,
            bins,
            low_freq_weight: 1.0,
            high_freq_weight: 1.0,
            noise_floor: 0.0,
            boost: 1.0,
        }
    }

    #[test]
    fn edges_are_non_decreasing_and_in_range() {
        let edges = BinEdges::compute(&spec(80.0, 6000.0, 64), 2048, 44100);
        let slice = edges.as_slice();
        assert_eq!(slice.len(), 65);
        for pair in slice.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        assert!(*slice.last().unwrap() <= 1024);
    }

    #[test]
    fn edge_endpoints_match_expected_bins() {
        // 80 Hz * 2048 / 44100 ~ 3.7 -> 4; 6000 Hz -> ~278.6 -> 279
        let edges = BinEdges::compute(&spec(80.0, 6000.0, 64), 2048, 44100);
        assert_eq!(edges.as_slice()[0], 4);
        assert_eq!(edges.as_slice()[64], 279);
    }

    #[test]
    fn degenerate_bin_uses_nearest_transform_bin() {
        // Narrow range with many bins on a short transform forces lo == hi
        let layer = spec(100.0, 200.0, 16);
        let extractor = BandExtractor::new(&layer, 256, 44100);
        let edges = extractor.edges().as_slice();
        assert!(
            edges.windows(2).any(|pair| pair[0] == pair[1]),
            "test setup should produce at least one degenerate bin"
        );

        let magnitudes: Vec<f32> = (0..129).map(|i| i as f32).collect();
        let frame = SpectrumFrame::new(&magnitudes, 44100, 256);
        let mut out = vec![0.0; 16];
        extractor.extract_into(&frame, &mut out);

        for (i, pair) in edges.windows(2).enumerate() {
            if pair[0] == pair[1] {
                assert_eq!(out[i], magnitudes[pair[0]]);
            }
        }
    }

    #[test]
    fn noise_floor_clamps_at_zero() {
        let mut layer = spec(100.0, 6000.0, 8);
        layer.noise_floor = 10.0;
        let extractor = BandExtractor::new(&layer, 2048, 44100);

        let magnitudes = vec![0.5; 1025];
        let frame = SpectrumFrame::new(&magnitudes, 44100, 2048);
        let mut out = vec![1.0; 8];
        extractor.extract_into(&frame, &mut out);
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn weights_ramp_from_low_to_high() {
        let mut layer = spec(100.0, 6000.0, 8);
        layer.low_freq_weight = 0.5;
        layer.high_freq_weight = 8.0;
        let extractor = BandExtractor::new(&layer, 8192, 44100);

        let magnitudes = vec![1.0; 4097];
        let frame = SpectrumFrame::new(&magnitudes, 44100, 8192);
        let mut out = vec![0.0; 8];
        extractor.extract_into(&frame, &mut out);

        // Flat spectrum: output should follow the weight ramp upward
        for pair in out.windows(2) {
            assert!(pair[0] < pair[1], "expected increasing ramp, got {out:?}");
        }
    }
}
