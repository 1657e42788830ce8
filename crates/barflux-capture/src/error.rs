//! Capture error types

use thiserror::Error;

/// Errors that can occur while setting up or running audio capture.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// No input devices available
    #[error("No audio input devices found")]
    NoDevices,

    /// Failed to get the default input device
    #[error("Failed to get default audio input device")]
    NoDefaultDevice,

    /// Named device not found
    #[error("Audio input device not found: {0}")]
    DeviceNotFound(String),

    /// Failed to query the device configuration
    #[error("Failed to get device config: {0}")]
    ConfigError(String),

    /// Failed to build the input stream
    #[error("Failed to build audio input stream: {0}")]
    StreamBuildError(String),

    /// Failed to start the input stream
    #[error("Failed to start audio input stream: {0}")]
    StreamPlayError(String),

    /// Error reported by a running stream
    #[error("Audio input stream error: {0}")]
    StreamError(String),

    /// Sample format the capture path cannot convert
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Requested channel does not exist on the device
    #[error("Channel {requested} out of range: device has {available} channels")]
    ChannelOutOfRange {
        /// Zero-based channel index that was requested
        requested: u16,
        /// Channel count the device actually offers
        available: u16,
    },
}

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;
