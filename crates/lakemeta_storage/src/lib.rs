//! # lakemeta storage
//!
//! Blob store trait and implementations for lakemeta.
//!
//! This crate provides the lowest-level storage abstraction for lakemeta.
//! Blob stores are **opaque named byte stores** - they do not interpret
//! the snapshots and transaction logs written through them.
//!
//! ## Design Principles
//!
//! - Stores hold whole blobs addressed by a path string
//! - Writes are truncate-create; a blob is visible only once closed
//! - Reading a missing blob is [`StorageError::NotFound`], never a short read
//! - Must be `Send + Sync` for concurrent access
//!
//! ## Available Stores
//!
//! - [`InMemoryBlobStore`] - For testing and ephemeral storage
//! - [`LocalBlobStore`] - For persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use lakemeta_storage::{BlobStore, InMemoryBlobStore, WriteOptions};
//!
//! let store = InMemoryBlobStore::new();
//! store.write_blob("root/a", b"hello world", WriteOptions::default()).unwrap();
//! let data = store.read_blob("root/a").unwrap();
//! assert_eq!(&data, b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::{BlobStore, OpenMode, RandomAccessBlob, WritableBlob, WriteOptions};
pub use error::{StorageError, StorageResult};
pub use file::LocalBlobStore;
pub use memory::InMemoryBlobStore;
