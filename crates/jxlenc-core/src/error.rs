//! Error types for encoder operations

use thiserror::Error;

/// Result type for encoder operations
pub type EncoderResult<T> = Result<T, EncoderError>;

/// Errors that can occur during encoding
///
/// The taxonomy is closed: validation produces `InvalidInput`, refused
/// feature combinations produce `Unsupported`, `InternalError` signals a
/// broken invariant and should be treated as a bug, and `OutOfMemory`
/// reports an allocation the encoder declined to make.
#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("internal error: {0}")]
    InternalError(String),

    #[error("out of memory: {0}")]
    OutOfMemory(String),
}

impl EncoderError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        EncoderError::InvalidInput(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        EncoderError::Unsupported(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        EncoderError::InternalError(msg.into())
    }
}
