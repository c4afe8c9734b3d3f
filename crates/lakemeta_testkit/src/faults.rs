//! Fault injection for blob stores.
//!
//! [`FaultyBlobStore`] wraps another store and fails selected operations
//! on paths containing a pattern. It is used to check that publish never
//! deletes txn logs when the new snapshot was not persisted, and that a
//! retry after a failure converges to the same state.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let store = Arc::new(FaultyBlobStore::new(Arc::new(InMemoryBlobStore::new())));
//! store.inject(Fault::Write, "tbl_");
//! // ... publish fails at the snapshot write
//! store.clear();
//! // ... retry succeeds
//! ```

use lakemeta_storage::{
    BlobStore, RandomAccessBlob, StorageError, StorageResult, WritableBlob, WriteOptions,
};
use parking_lot::Mutex;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// The operation a fault applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Opening a writer fails; nothing is written.
    Write,
    /// The writer persists the first half of the data, then fails on
    /// close. Models a store without atomic writes.
    TornWrite,
    /// Opening a blob for read fails.
    Read,
    /// Deleting a blob fails; the blob stays.
    Delete,
    /// Listing a directory fails.
    List,
}

/// A blob store that fails operations on demand.
pub struct FaultyBlobStore {
    inner: Arc<dyn BlobStore>,
    faults: Mutex<Vec<(Fault, String)>>,
    injected: AtomicUsize,
}

impl FaultyBlobStore {
    /// Wraps `inner` with no faults armed.
    pub fn new(inner: Arc<dyn BlobStore>) -> Self {
        Self {
            inner,
            faults: Mutex::new(Vec::new()),
            injected: AtomicUsize::new(0),
        }
    }

    /// Fails `fault` operations on every path containing `pattern`.
    pub fn inject(&self, fault: Fault, pattern: impl Into<String>) {
        self.faults.lock().push((fault, pattern.into()));
    }

    /// Disarms every fault.
    pub fn clear(&self) {
        self.faults.lock().clear();
    }

    /// Number of operations failed so far.
    pub fn injected(&self) -> usize {
        self.injected.load(Ordering::SeqCst)
    }

    /// The wrapped store.
    pub fn inner(&self) -> &Arc<dyn BlobStore> {
        &self.inner
    }

    fn armed(&self, fault: Fault, path: &str) -> bool {
        let hit = self
            .faults
            .lock()
            .iter()
            .any(|(f, pattern)| *f == fault && path.contains(pattern.as_str()));
        if hit {
            self.injected.fetch_add(1, Ordering::SeqCst);
        }
        hit
    }
}

fn injected_error(what: &str, path: &str) -> StorageError {
    StorageError::Io(io::Error::other(format!("injected {what} failure: {path}")))
}

struct TornWritable {
    inner: Box<dyn WritableBlob>,
    path: String,
    buffer: Vec<u8>,
}

impl WritableBlob for TornWritable {
    fn append(&mut self, data: &[u8]) -> StorageResult<()> {
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    fn close(&mut self) -> StorageResult<()> {
        let half = self.buffer.len() / 2;
        self.inner.append(&self.buffer[..half])?;
        self.inner.close()?;
        Err(injected_error("torn write", &self.path))
    }
}

impl BlobStore for FaultyBlobStore {
    fn new_writable(
        &self,
        path: &str,
        options: WriteOptions,
    ) -> StorageResult<Box<dyn WritableBlob>> {
        if self.armed(Fault::Write, path) {
            return Err(injected_error("write", path));
        }
        let inner = self.inner.new_writable(path, options)?;
        if self.armed(Fault::TornWrite, path) {
            return Ok(Box::new(TornWritable {
                inner,
                path: path.to_string(),
                buffer: Vec::new(),
            }));
        }
        Ok(inner)
    }

    fn new_random_access(&self, path: &str) -> StorageResult<Box<dyn RandomAccessBlob>> {
        if self.armed(Fault::Read, path) {
            return Err(injected_error("read", path));
        }
        self.inner.new_random_access(path)
    }

    fn iterate_dir(&self, dir: &str, visit: &mut dyn FnMut(&str) -> bool) -> StorageResult<()> {
        if self.armed(Fault::List, dir) {
            return Err(injected_error("list", dir));
        }
        self.inner.iterate_dir(dir, visit)
    }

    fn delete_blob(&self, path: &str) -> StorageResult<()> {
        if self.armed(Fault::Delete, path) {
            return Err(injected_error("delete", path));
        }
        self.inner.delete_blob(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lakemeta_storage::InMemoryBlobStore;

    fn store() -> (FaultyBlobStore, InMemoryBlobStore) {
        let inner = InMemoryBlobStore::new();
        (FaultyBlobStore::new(Arc::new(inner.clone())), inner)
    }

    #[test]
    fn write_fault_writes_nothing() {
        let (faulty, inner) = store();
        faulty.inject(Fault::Write, "tbl_");

        assert!(faulty.write_blob("lake/tbl_1", b"data", WriteOptions::default()).is_err());
        faulty.write_blob("lake/txn_1", b"data", WriteOptions::default()).unwrap();
        assert_eq!(inner.paths(), vec!["lake/txn_1".to_string()]);
        assert_eq!(faulty.injected(), 1);
    }

    #[test]
    fn torn_write_leaves_prefix() {
        let (faulty, inner) = store();
        faulty.inject(Fault::TornWrite, "tbl_");

        assert!(faulty.write_blob("lake/tbl_1", b"abcdefgh", WriteOptions::default()).is_err());
        assert_eq!(inner.read_blob("lake/tbl_1").unwrap(), b"abcd".to_vec());
    }

    #[test]
    fn clear_disarms() {
        let (faulty, _) = store();
        faulty.write_blob("lake/a", b"x", WriteOptions::default()).unwrap();
        faulty.inject(Fault::Delete, "lake/a");
        faulty.inject(Fault::Read, "lake/a");
        assert!(faulty.delete_blob("lake/a").is_err());
        assert!(faulty.read_blob("lake/a").is_err());

        faulty.clear();
        assert_eq!(faulty.read_blob("lake/a").unwrap(), b"x".to_vec());
        faulty.delete_blob("lake/a").unwrap();
    }

    #[test]
    fn list_fault() {
        let (faulty, _) = store();
        faulty.inject(Fault::List, "lake");
        assert!(faulty.iterate_dir("lake", &mut |_| true).is_err());
    }
}
