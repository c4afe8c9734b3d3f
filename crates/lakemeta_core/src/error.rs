//! Error types for lakemeta core.

use lakemeta_codec::CodecError;
use lakemeta_storage::StorageError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in lakemeta core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The requested snapshot, log or tablet does not exist.
    #[error("not found: {message}")]
    NotFound {
        /// What was missing.
        message: String,
    },

    /// A blob exists but cannot be parsed, or its size is out of range.
    #[error("corruption: {message}")]
    Corruption {
        /// Description of the corruption.
        message: String,
    },

    /// The request is malformed.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },

    /// A structural invariant was violated.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the violated invariant.
        message: String,
    },

    /// The operation is recognized but not implemented.
    #[error("not supported: {message}")]
    NotSupported {
        /// Description of the unsupported operation.
        message: String,
    },

    /// Blob store failure other than a missing blob.
    #[error("storage error: {0}")]
    Storage(StorageError),

    /// A message could not be encoded.
    #[error("codec error: {0}")]
    Codec(CodecError),
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        if err.is_not_found() {
            Self::NotFound {
                message: err.to_string(),
            }
        } else {
            Self::Storage(err)
        }
    }
}

impl CoreError {
    /// Creates a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a corruption error.
    pub fn corruption(message: impl Into<String>) -> Self {
        Self::Corruption {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates a not-supported error.
    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::NotSupported {
            message: message.into(),
        }
    }

    /// Returns true for [`CoreError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true for [`CoreError::Corruption`].
    #[must_use]
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Corruption { .. })
    }

    /// Returns true for [`CoreError::Internal`].
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_blob_becomes_not_found() {
        let err = CoreError::from(StorageError::not_found("root/tbl_x"));
        assert!(err.is_not_found());
        assert!(err.to_string().contains("root/tbl_x"));
    }

    #[test]
    fn other_storage_errors_stay_storage() {
        let err = CoreError::from(StorageError::Closed);
        assert!(matches!(err, CoreError::Storage(StorageError::Closed)));
        assert!(!err.is_not_found());
    }
}
