//! Blob store trait definition.

use crate::error::{StorageError, StorageResult};

/// How a writable blob treats an existing blob at the same path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Create the blob, replacing any previous content.
    #[default]
    CreateOrOpenWithTruncate,
    /// Create the blob; fail with [`StorageError::AlreadyExists`] if present.
    MustCreate,
}

/// Options for opening a writable blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Whether `close` must make the blob durable before returning.
    pub sync_on_close: bool,
    /// Behaviour when the blob already exists.
    pub mode: OpenMode,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            sync_on_close: true,
            mode: OpenMode::CreateOrOpenWithTruncate,
        }
    }
}

/// A blob being written.
///
/// Content appended to a writable blob is not observable by readers until
/// [`WritableBlob::close`] returns successfully.
pub trait WritableBlob: Send {
    /// Appends data to the blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob is closed or an I/O error occurs.
    fn append(&mut self, data: &[u8]) -> StorageResult<()>;

    /// Finishes the blob, syncing it if the blob was opened with
    /// `sync_on_close`.
    ///
    /// # Errors
    ///
    /// Returns an error if publishing or syncing the blob fails.
    fn close(&mut self) -> StorageResult<()>;
}

/// A blob opened for random-access reads.
pub trait RandomAccessBlob: Send {
    /// Returns the size of the blob in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;

    /// Reads exactly `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadPastEnd`] if the range extends past the
    /// end of the blob, or an I/O error.
    fn read_at_fully(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Reads the whole blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob is too large for this platform or the
    /// read fails.
    fn read_all(&self) -> StorageResult<Vec<u8>> {
        let size = self.size()?;
        let len = usize::try_from(size).map_err(|_| {
            StorageError::Corrupted(format!("blob size {size} exceeds addressable memory"))
        })?;
        self.read_at_fully(0, len)
    }
}

/// A store of named, immutable-once-written blobs.
///
/// Blob stores are **opaque byte stores** addressed by path strings. The
/// metadata layer owns all format interpretation - stores do not know about
/// snapshots, transaction logs or schemas.
///
/// # Invariants
///
/// - A blob written with truncate mode fully replaces any prior content
/// - Readers never observe a partially written blob
/// - Reading or deleting a missing blob returns [`StorageError::NotFound`]
/// - Stores must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryBlobStore`] - For testing
/// - [`super::LocalBlobStore`] - For persistent storage
pub trait BlobStore: Send + Sync {
    /// Opens a blob for writing.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be created.
    fn new_writable(
        &self,
        path: &str,
        options: WriteOptions,
    ) -> StorageResult<Box<dyn WritableBlob>>;

    /// Opens an existing blob for reading.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the blob does not exist.
    fn new_random_access(&self, path: &str) -> StorageResult<Box<dyn RandomAccessBlob>>;

    /// Calls `visit` with the name (not the full path) of every blob
    /// directly under `dir`. Enumeration stops early when `visit` returns
    /// false. A missing directory enumerates nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    fn iterate_dir(&self, dir: &str, visit: &mut dyn FnMut(&str) -> bool) -> StorageResult<()>;

    /// Deletes a blob.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the blob does not exist.
    fn delete_blob(&self, path: &str) -> StorageResult<()>;

    /// Writes `data` as the complete content of the blob at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if opening, appending or closing fails.
    fn write_blob(&self, path: &str, data: &[u8], options: WriteOptions) -> StorageResult<()> {
        let mut blob = self.new_writable(path, options)?;
        blob.append(data)?;
        blob.close()
    }

    /// Reads the complete content of the blob at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the blob does not exist.
    fn read_blob(&self, path: &str) -> StorageResult<Vec<u8>> {
        self.new_random_access(path)?.read_all()
    }
}
