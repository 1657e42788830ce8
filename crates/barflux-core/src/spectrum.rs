//! Forward-transform adapter: sample blocks in, magnitude spectra out.
//!
//! The analyzer owns a planned FFT, a precomputed Hann window and scratch
//! buffers, all sized at construction so the per-frame path performs no
//! allocation.

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;
use tracing::trace;

/// One frame of spectral input: non-negative magnitudes for bins
/// `0..=fft_size/2`, plus the parameters needed to map bin index to
/// frequency. Borrowed read-only by every layer for the duration of a
/// frame step.
#[derive(Debug, Clone, Copy)]
pub struct SpectrumFrame<'a> {
    magnitudes: &'a [f32],
    sample_rate: u32,
    fft_size: usize,
}

impl<'a> SpectrumFrame<'a> {
    /// Wrap a magnitude slice with its transform parameters.
    ///
    /// `magnitudes` must hold `fft_size / 2 + 1` values.
    pub fn new(magnitudes: &'a [f32], sample_rate: u32, fft_size: usize) -> Self {
        debug_assert_eq!(magnitudes.len(), fft_size / 2 + 1);
        Self {
            magnitudes,
            sample_rate,
            fft_size,
        }
    }

    /// Magnitude values for bins `0..=fft_size/2`.
    pub fn magnitudes(&self) -> &'a [f32] {
        self.magnitudes
    }

    /// Sample rate the block was captured at.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Transform length the magnitudes were produced with.
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Index of the last valid transform bin (`fft_size / 2`).
    pub fn max_bin(&self) -> usize {
        self.fft_size / 2
    }

    /// Center frequency of a transform bin in Hz.
    pub fn bin_frequency(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate as f32 / self.fft_size as f32
    }
}

/// Windows, zero-pads and transforms sample blocks into magnitude spectra.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    block_size: usize,
    sample_rate: u32,
    window: Vec<f32>,
    fft_buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    frame_count: u64,
}

impl SpectrumAnalyzer {
    /// Plan the transform and precompute the window.
    ///
    /// `block_size` is the number of real samples per capture block;
    /// blocks are zero-padded up to `fft_size` for finer frequency
    /// resolution.
    pub fn new(block_size: usize, fft_size: usize, sample_rate: u32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch_len = fft.get_inplace_scratch_len();

        // Hann window over the real block, not the padded length
        let window: Vec<f32> = (0..block_size)
            .map(|i| {
                let t = i as f32 / (block_size - 1).max(1) as f32;
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * t).cos())
            })
            .collect();

        Self {
            fft,
            fft_size,
            block_size,
            sample_rate,
            window,
            fft_buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            frame_count: 0,
        }
    }

    /// Transform length this analyzer was planned for.
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Sample rate this analyzer assumes.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of magnitude values per frame (`fft_size / 2 + 1`).
    pub fn spectrum_len(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Window, zero-pad and transform one block, writing magnitudes for
    /// bins `0..=fft_size/2` into `out`.
    ///
    /// Non-finite input samples are treated as silence so one bad block
    /// cannot contaminate the spectrum. Blocks longer than the configured
    /// block size are truncated; shorter ones are implicitly zero-padded.
    pub fn analyze_into(&mut self, samples: &[f32], out: &mut Vec<f32>) {
        self.frame_count += 1;

        let n = samples.len().min(self.block_size);
        for i in 0..n {
            let s = samples[i];
            let s = if s.is_finite() { s } else { 0.0 };
            self.fft_buffer[i] = Complex::new(s * self.window[i], 0.0);
        }
        for slot in self.fft_buffer[n..].iter_mut() {
            *slot = Complex::new(0.0, 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.fft_buffer, &mut self.scratch);

        let norm = 1.0 / (self.fft_size as f32).sqrt();
        out.resize(self.spectrum_len(), 0.0);
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.fft_buffer[i].norm() * norm;
        }

        if self.frame_count % 1000 == 0 {
            trace!(frames = self.frame_count, "spectrum analyzer frame batch");
        }
    }
}
