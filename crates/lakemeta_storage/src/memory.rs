//! In-memory blob store for testing.

use crate::backend::{BlobStore, OpenMode, RandomAccessBlob, WritableBlob, WriteOptions};
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

type BlobMap = Arc<RwLock<BTreeMap<String, Arc<Vec<u8>>>>>;

/// An in-memory blob store.
///
/// This store keeps every blob in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral tablets that don't need persistence
///
/// # Thread Safety
///
/// The store is thread-safe and can be shared across threads. Blobs are
/// published atomically when their writer is closed.
///
/// # Example
///
/// ```rust
/// use lakemeta_storage::{BlobStore, InMemoryBlobStore, WriteOptions};
///
/// let store = InMemoryBlobStore::new();
/// store.write_blob("t/x", b"test data", WriteOptions::default()).unwrap();
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryBlobStore {
    blobs: BlobMap,
}

impl InMemoryBlobStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the paths of all stored blobs in lexicographic order.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.blobs.read().keys().cloned().collect()
    }

    /// Returns true if a blob exists at `path`.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.blobs.read().contains_key(path)
    }

    /// Returns the number of stored blobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    /// Returns true if the store holds no blobs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces the raw content of a blob, bypassing the writer protocol.
    ///
    /// Useful for planting truncated or corrupt blobs in tests.
    pub fn insert_raw(&self, path: impl Into<String>, data: Vec<u8>) {
        self.blobs.write().insert(path.into(), Arc::new(data));
    }

    /// Removes all blobs.
    pub fn clear(&self) {
        self.blobs.write().clear();
    }
}

/// Splits a blob path into its directory and file name.
fn split_path(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(pos) => (&path[..pos], &path[pos + 1..]),
        None => ("", path),
    }
}

struct MemoryWritable {
    blobs: BlobMap,
    path: String,
    mode: OpenMode,
    buffer: Vec<u8>,
    closed: bool,
}

impl WritableBlob for MemoryWritable {
    fn append(&mut self, data: &[u8]) -> StorageResult<()> {
        if self.closed {
            return Err(StorageError::Closed);
        }
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    fn close(&mut self) -> StorageResult<()> {
        if self.closed {
            return Err(StorageError::Closed);
        }
        let mut blobs = self.blobs.write();
        if self.mode == OpenMode::MustCreate && blobs.contains_key(&self.path) {
            return Err(StorageError::AlreadyExists {
                path: self.path.clone(),
            });
        }
        blobs.insert(self.path.clone(), Arc::new(std::mem::take(&mut self.buffer)));
        self.closed = true;
        Ok(())
    }
}

struct MemoryReadable {
    data: Arc<Vec<u8>>,
}

impl RandomAccessBlob for MemoryReadable {
    fn size(&self) -> StorageResult<u64> {
        Ok(self.data.len() as u64)
    }

    fn read_at_fully(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let size = self.data.len() as u64;
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        let end = start.saturating_add(len);
        if offset > size || end > self.data.len() {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }
        Ok(self.data[start..end].to_vec())
    }
}

impl BlobStore for InMemoryBlobStore {
    fn new_writable(
        &self,
        path: &str,
        options: WriteOptions,
    ) -> StorageResult<Box<dyn WritableBlob>> {
        if options.mode == OpenMode::MustCreate && self.contains(path) {
            return Err(StorageError::AlreadyExists {
                path: path.to_string(),
            });
        }
        Ok(Box::new(MemoryWritable {
            blobs: Arc::clone(&self.blobs),
            path: path.to_string(),
            mode: options.mode,
            buffer: Vec::new(),
            closed: false,
        }))
    }

    fn new_random_access(&self, path: &str) -> StorageResult<Box<dyn RandomAccessBlob>> {
        let data = self
            .blobs
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::not_found(path))?;
        Ok(Box::new(MemoryReadable { data }))
    }

    fn iterate_dir(&self, dir: &str, visit: &mut dyn FnMut(&str) -> bool) -> StorageResult<()> {
        let dir = dir.trim_end_matches('/');
        // Collect first so the callback never runs under the lock.
        let names: Vec<String> = self
            .blobs
            .read()
            .keys()
            .filter_map(|path| {
                let (parent, name) = split_path(path);
                (parent == dir).then(|| name.to_string())
            })
            .collect();
        for name in &names {
            if !visit(name) {
                break;
            }
        }
        Ok(())
    }

    fn delete_blob(&self, path: &str) -> StorageResult<()> {
        match self.blobs.write().remove(path) {
            Some(_) => Ok(()),
            None => Err(StorageError::not_found(path)),
        }
    }
}
