//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Failed to encode value.
    #[error("encoding failed: {message}")]
    EncodingFailed {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode bytes.
    #[error("decoding failed: {message}")]
    DecodingFailed {
        /// Description of the decoding error.
        message: String,
    },

    /// Unexpected end of input.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// Input continued after a complete message.
    #[error("{count} trailing bytes after message")]
    TrailingBytes {
        /// Number of unread bytes.
        count: usize,
    },

    /// An error annotated with the kind of message being processed.
    #[error("{kind}: {source}")]
    Context {
        /// The message kind.
        kind: &'static str,
        /// The underlying error.
        source: Box<CodecError>,
    },
}

impl CodecError {
    /// Create an encoding failed error.
    pub fn encoding_failed(message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            message: message.into(),
        }
    }

    /// Create a decoding failed error.
    pub fn decoding_failed(message: impl Into<String>) -> Self {
        Self::DecodingFailed {
            message: message.into(),
        }
    }

    /// Wraps this error with the kind of message it concerns.
    #[must_use]
    pub fn context(self, kind: &'static str) -> Self {
        Self::Context {
            kind,
            source: Box::new(self),
        }
    }

    /// Returns true if this is an encoding failure.
    #[must_use]
    pub fn is_encoding(&self) -> bool {
        match self {
            Self::EncodingFailed { .. } => true,
            Self::Context { source, .. } => source.is_encoding(),
            _ => false,
        }
    }
}
