//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The named blob does not exist.
    #[error("blob not found: {path}")]
    NotFound {
        /// The path that was looked up.
        path: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Attempted to read beyond the end of a blob.
    #[error("read beyond end of blob: offset {offset}, len {len}, size {size}")]
    ReadPastEnd {
        /// The requested read offset.
        offset: u64,
        /// The requested read length.
        len: usize,
        /// The current blob size.
        size: u64,
    },

    /// The blob already exists and the write mode forbids overwriting it.
    #[error("blob already exists: {path}")]
    AlreadyExists {
        /// The path that was written.
        path: String,
    },

    /// The blob or its directory is corrupted.
    #[error("storage corrupted: {0}")]
    Corrupted(String),

    /// The writable blob was already closed.
    #[error("blob is closed")]
    Closed,
}

impl StorageError {
    /// Creates a not-found error for `path`.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Returns true if this error reports a missing blob.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Io(e) => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
