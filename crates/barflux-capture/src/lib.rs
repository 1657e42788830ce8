//! Audio input capture feeding the analysis pipeline.
//!
//! Opens a CPAL input stream, extracts one channel from the interleaved
//! callback data, chops it into fixed-size blocks and publishes each block
//! into the pipeline's single-slot hand-off. The stream never blocks on
//! the consumer: if the pipeline is slow, newer blocks simply overwrite
//! older ones in the slot.

#![warn(missing_docs)]

pub mod error;

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::{debug, error, info, warn};

use barflux_core::handoff::{BlockSlot, SampleBlock};

pub use error::{CaptureError, CaptureResult};

/// Capture configuration.
#[derive(Debug, Clone, Default)]
pub struct CaptureConfig {
    /// Input device name; `None` selects the system default
    pub device: Option<String>,
    /// Zero-based channel to extract from the interleaved stream
    pub channel: u16,
}

/// Keeps the input stream alive. Drop this to stop capture.
pub struct CaptureHandle {
    _stream: Stream,
    sample_rate: u32,
    channels: u16,
    errors: Receiver<CaptureError>,
}

impl CaptureHandle {
    /// Sample rate the device is delivering.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count of the interleaved stream.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Drain one pending stream error, if any.
    ///
    /// Stream errors are reported on the audio thread; this hands them to
    /// the caller without blocking either side.
    pub fn take_error(&self) -> Option<CaptureError> {
        self.errors.try_recv().ok()
    }
}

/// Audio capture entry point.
pub struct AudioCapture;

impl AudioCapture {
    /// Open the configured input device and start publishing blocks of
    /// `block_size` mono samples into `slot`.
    pub fn start(
        config: &CaptureConfig,
        block_size: usize,
        slot: Arc<BlockSlot>,
    ) -> CaptureResult<CaptureHandle> {
        let device = find_input_device(config.device.as_deref())?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        info!(device = %device_name, "using audio input device");

        let supported = device
            .default_input_config()
            .map_err(|e| CaptureError::ConfigError(e.to_string()))?;
        let sample_rate = supported.sample_rate();
        let channels = supported.channels();
        let sample_format = supported.sample_format();

        if config.channel >= channels {
            return Err(CaptureError::ChannelOutOfRange {
                requested: config.channel,
                available: channels,
            });
        }

        info!(
            sample_rate,
            channels,
            format = %sample_format,
            block_size,
            "capture config"
        );

        let stream_config = supported.config();
        let (error_tx, errors) = bounded(16);
        let chopper = BlockChopper::new(config.channel as usize, channels as usize, block_size, slot);

        let stream = match sample_format {
            SampleFormat::F32 => build_stream_f32(&device, &stream_config, chopper, error_tx)?,
            SampleFormat::I16 => build_stream_i16(&device, &stream_config, chopper, error_tx)?,
            other => return Err(CaptureError::UnsupportedFormat(other.to_string())),
        };

        stream
            .play()
            .map_err(|e| CaptureError::StreamPlayError(e.to_string()))?;
        info!("audio capture started");

        Ok(CaptureHandle {
            _stream: stream,
            sample_rate,
            channels,
            errors,
        })
    }
}

fn find_input_device(name: Option<&str>) -> CaptureResult<cpal::Device> {
    let host = cpal::default_host();
    match name {
        Some(wanted) => {
            let mut devices = host
                .input_devices()
                .map_err(|_| CaptureError::NoDevices)?
                .peekable();
            if devices.peek().is_none() {
                return Err(CaptureError::NoDevices);
            }
            devices
                .find(|d| d.name().map(|n| n == wanted).unwrap_or(false))
                .ok_or_else(|| CaptureError::DeviceNotFound(wanted.to_string()))
        }
        None => host
            .default_input_device()
            .ok_or(CaptureError::NoDefaultDevice),
    }
}

/// Deinterleaves one channel and publishes fixed-size blocks.
///
/// Lives inside the stream callback; the accumulator is reused across
/// callbacks so the steady state allocates one `Vec` per published block.
struct BlockChopper {
    channel: usize,
    channels: usize,
    block_size: usize,
    pending: Vec<f32>,
    slot: Arc<BlockSlot>,
    blocks_published: u64,
}

impl BlockChopper {
    fn new(channel: usize, channels: usize, block_size: usize, slot: Arc<BlockSlot>) -> Self {
        Self {
            channel,
            channels,
            block_size,
            pending: Vec::with_capacity(block_size),
            slot,
            blocks_published: 0,
        }
    }

    fn feed(&mut self, interleaved: &[f32]) {
        for frame in interleaved.chunks_exact(self.channels) {
            self.pending.push(frame[self.channel]);
            if self.pending.len() == self.block_size {
                let samples = std::mem::replace(
                    &mut self.pending,
                    Vec::with_capacity(self.block_size),
                );
                self.slot.publish(SampleBlock::new(samples));
                self.blocks_published += 1;
                if self.blocks_published % 1024 == 0 {
                    debug!(blocks = self.blocks_published, "capture progress");
                }
            }
        }
    }
}

fn report_stream_error(tx: &Sender<CaptureError>, err: cpal::StreamError) {
    error!(%err, "audio input stream error");
    match tx.try_send(CaptureError::StreamError(err.to_string())) {
        Ok(()) | Err(TrySendError::Disconnected(_)) => {}
        Err(TrySendError::Full(_)) => warn!("capture error channel full, dropping report"),
    }
}

fn build_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut chopper: BlockChopper,
    error_tx: Sender<CaptureError>,
) -> CaptureResult<Stream> {
    device
        .build_input_stream(
            config,
            move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                chopper.feed(data);
            },
            move |err| report_stream_error(&error_tx, err),
            None,
        )
        .map_err(|e| CaptureError::StreamBuildError(e.to_string()))
}

fn build_stream_i16(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut chopper: BlockChopper,
    error_tx: Sender<CaptureError>,
) -> CaptureResult<Stream> {
    let mut converted: Vec<f32> = Vec::new();
    device
        .build_input_stream(
            config,
            move |data: &[i16], _info: &cpal::InputCallbackInfo| {
                converted.clear();
                converted.extend(data.iter().map(|&s| s as f32 / i16::MAX as f32));
                chopper.feed(&converted);
            },
            move |err| report_stream_error(&error_tx, err),
            None,
        )
        .map_err(|e| CaptureError::StreamBuildError(e.to_string()))
}
