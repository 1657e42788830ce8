//! The per-frame driver: newest block in, bar and peak arrays out.
//!
//! One synchronous pass per display frame, single threaded, no blocking.
//! A capture underrun is not an error; the pipeline reuses the previous
//! block and renders a flat frame instead of stalling.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::{PipelineConfig, Result};
use crate::handoff::BlockSlot;
use crate::layer::Layer;
use crate::spectrum::{SpectrumAnalyzer, SpectrumFrame};

/// Counters describing pipeline activity, for diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineStats {
    /// Frames fully processed (analysis plus layer steps)
    pub frames_processed: u64,
    /// Frames that reused the previous block because none was pending
    pub frames_reused: u64,
    /// Blocks taken from the capture slot
    pub blocks_received: u64,
}

/// The whole analysis pipeline: spectrum analyzer plus all layers.
pub struct Pipeline {
    analyzer: SpectrumAnalyzer,
    layers: Vec<Layer>,
    slot: Arc<BlockSlot>,
    block: Vec<f32>,
    have_block: bool,
    magnitudes: Vec<f32>,
    sample_rate: u32,
    fft_size: usize,
    frame_rate: f32,
    stats: PipelineStats,
}

impl Pipeline {
    /// Validate the configuration and build the pipeline for the given
    /// capture sample rate.
    ///
    /// This is the only point that surfaces errors; `advance` is total.
    pub fn new(config: &PipelineConfig, sample_rate: u32) -> Result<Self> {
        config.validate()?;

        let analyzer = SpectrumAnalyzer::new(config.block_size, config.fft_size, sample_rate);
        let layers = config
            .layers
            .iter()
            .map(|layer| {
                Layer::new(
                    layer.clone(),
                    config.fft_size,
                    sample_rate,
                    config.frame_rate,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            block_size = config.block_size,
            fft_size = config.fft_size,
            sample_rate,
            layers = layers.len(),
            "pipeline created"
        );

        Ok(Self {
            magnitudes: vec![0.0; analyzer.spectrum_len()],
            analyzer,
            layers,
            slot: BlockSlot::new(),
            block: Vec::with_capacity(config.block_size),
            have_block: false,
            sample_rate,
            fft_size: config.fft_size,
            frame_rate: config.frame_rate,
            stats: PipelineStats::default(),
        })
    }

    /// The capture-side hand-off slot. Clone this and hand it to the
    /// producer; it overwrites, the pipeline consumes.
    pub fn slot(&self) -> Arc<BlockSlot> {
        Arc::clone(&self.slot)
    }

    /// Run one frame: pull the newest block (or reuse the previous one)
    /// and step every active layer.
    ///
    /// Returns `false` only while no block has ever arrived, in which
    /// case nothing was computed and the outputs are still all zero.
    pub fn advance(&mut self) -> bool {
        match self.slot.take() {
            Some(block) => {
                self.block.clear();
                self.block.extend_from_slice(&block.samples);
                self.have_block = true;
                self.stats.blocks_received += 1;
            }
            None => {
                if !self.have_block {
                    return false;
                }
                self.stats.frames_reused += 1;
            }
        }

        self.analyzer.analyze_into(&self.block, &mut self.magnitudes);
        let frame = SpectrumFrame::new(&self.magnitudes, self.sample_rate, self.fft_size);
        for layer in &mut self.layers {
            layer.frame(&frame);
        }

        self.stats.frames_processed += 1;
        if self.stats.frames_processed % self.frame_rate.max(1.0) as u64 == 0 {
            trace!(
                frames = self.stats.frames_processed,
                reused = self.stats.frames_reused,
                "pipeline frame batch"
            );
        }
        true
    }

    /// All layers, in configuration order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// One layer by index.
    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Mutable access to one layer, for visibility toggles and spec
    /// changes between frames.
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    /// Activity counters since construction.
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Sample rate the pipeline was built for.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
