//! Error types for Orbisonic

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrbisonicError {
    /// Rejected at bind time; no emitter is created.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The referenced stream is missing or cannot produce audio.
    /// A failed start leaves the stream stopped.
    #[error("Stream unavailable: {0}")]
    StreamUnavailable(String),

    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("Audio format error: {0}")]
    AudioFormat(String),

    #[error("Audio loading error: {0}")]
    AudioLoading(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Engine error: {0}")]
    Engine(String),
}

pub type Result<T> = std::result::Result<T, OrbisonicError>;
