//! Error types for rep-quality evaluation.
//!
//! The streaming path never fails: absent or non-finite readings are simply
//! "no data this sample". Errors only come from configuration validation and
//! from the boundary decoders that turn transport payloads into packets.

use thiserror::Error;

/// Main error type for the evaluator and its boundary decoders.
#[derive(Error, Debug)]
pub enum EvaluatorError {
    /// Configuration validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Sensor notification is shorter than a full frame.
    #[error("Frame too short: need at least {min} bytes, got {actual}")]
    FrameTooShort { min: usize, actual: usize },

    /// Bridge payload is not a valid JSON packet.
    #[cfg(feature = "serde")]
    #[error("Malformed JSON packet: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for evaluator operations.
pub type Result<T> = std::result::Result<T, EvaluatorError>;

impl EvaluatorError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a frame too short error.
    #[must_use]
    pub const fn frame_too_short(min: usize, actual: usize) -> Self {
        Self::FrameTooShort { min, actual }
    }
}
