//! Local-filesystem blob store for persistent storage.

use crate::backend::{BlobStore, OpenMode, RandomAccessBlob, WritableBlob, WriteOptions};
use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix of in-progress blobs. Never matches a snapshot or log prefix.
const TEMP_PREFIX: &str = ".tmp_";

/// A blob store backed by the local filesystem.
///
/// Blob paths are used as filesystem paths. Each blob is written to a
/// hidden temporary file next to its final location and renamed into place
/// on close, so readers never observe a partially written blob.
///
/// # Durability
///
/// With `sync_on_close`, `close()` calls `File::sync_all()` before the
/// rename and syncs the parent directory after it.
///
/// # Example
///
/// ```no_run
/// use lakemeta_storage::{BlobStore, LocalBlobStore, WriteOptions};
///
/// let store = LocalBlobStore::new();
/// store.write_blob("/data/lake/tbl_0001", b"snapshot", WriteOptions::default()).unwrap();
/// ```
#[derive(Debug, Default, Clone)]
pub struct LocalBlobStore {
    _private: (),
}

impl LocalBlobStore {
    /// Creates a store rooted at the process's view of the filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn map_io(err: io::Error, path: &str) -> StorageError {
    if err.kind() == io::ErrorKind::NotFound {
        StorageError::not_found(path)
    } else {
        StorageError::Io(err)
    }
}

/// Distinguishes concurrent writers of the same blob.
static NEXT_TEMP_ID: AtomicU64 = AtomicU64::new(0);

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let id = NEXT_TEMP_ID.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!("{TEMP_PREFIX}{name}.{}.{id}", std::process::id()))
}

struct LocalWritable {
    path: PathBuf,
    temp_path: PathBuf,
    file: Option<File>,
    options: WriteOptions,
}

impl WritableBlob for LocalWritable {
    fn append(&mut self, data: &[u8]) -> StorageResult<()> {
        let file = self.file.as_mut().ok_or(StorageError::Closed)?;
        file.write_all(data)?;
        Ok(())
    }

    fn close(&mut self) -> StorageResult<()> {
        let file = self.file.take().ok_or(StorageError::Closed)?;
        let result = self.publish(file);
        if result.is_err() {
            let _ = fs::remove_file(&self.temp_path);
        }
        result
    }
}

impl LocalWritable {
    /// Makes the temporary file durable and renames it over the final path.
    fn publish(&self, mut file: File) -> StorageResult<()> {
        file.flush()?;
        if self.options.sync_on_close {
            file.sync_all()?;
        }
        drop(file);

        if self.options.mode == OpenMode::MustCreate && self.path.exists() {
            return Err(StorageError::AlreadyExists {
                path: self.path.to_string_lossy().into_owned(),
            });
        }
        fs::rename(&self.temp_path, &self.path)?;

        if self.options.sync_on_close {
            if let Some(parent) = self.path.parent() {
                // Directory fsync is not supported everywhere; the rename
                // itself already happened.
                if let Ok(dir) = File::open(parent) {
                    let _ = dir.sync_all();
                }
            }
        }
        Ok(())
    }
}

impl Drop for LocalWritable {
    fn drop(&mut self) {
        if self.file.take().is_some() {
            let _ = fs::remove_file(&self.temp_path);
        }
    }
}

struct LocalReadable {
    path: String,
    file: Mutex<File>,
    size: u64,
}

impl RandomAccessBlob for LocalReadable {
    fn size(&self) -> StorageResult<u64> {
        Ok(self.size)
    }

    fn read_at_fully(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let end = offset.saturating_add(len as u64);
        if offset > self.size || end > self.size {
            return Err(StorageError::ReadPastEnd {
                offset,
                len,
                size: self.size,
            });
        }
        if len == 0 {
            return Ok(Vec::new());
        }

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| map_io(e, &self.path))?;
        let mut buffer = vec![0u8; len];
        file.read_exact(&mut buffer)
            .map_err(|e| map_io(e, &self.path))?;
        Ok(buffer)
    }
}

impl BlobStore for LocalBlobStore {
    fn new_writable(
        &self,
        path: &str,
        options: WriteOptions,
    ) -> StorageResult<Box<dyn WritableBlob>> {
        let final_path = PathBuf::from(path);
        if options.mode == OpenMode::MustCreate && final_path.exists() {
            return Err(StorageError::AlreadyExists {
                path: path.to_string(),
            });
        }
        if let Some(parent) = final_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let temp_path = temp_path_for(&final_path);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        Ok(Box::new(LocalWritable {
            path: final_path,
            temp_path,
            file: Some(file),
            options,
        }))
    }

    fn new_random_access(&self, path: &str) -> StorageResult<Box<dyn RandomAccessBlob>> {
        let file = File::open(path).map_err(|e| map_io(e, path))?;
        let size = file.metadata().map_err(|e| map_io(e, path))?.len();
        Ok(Box::new(LocalReadable {
            path: path.to_string(),
            file: Mutex::new(file),
            size,
        }))
    }

    fn iterate_dir(&self, dir: &str, visit: &mut dyn FnMut(&str) -> bool) -> StorageResult<()> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(StorageError::Io(e)),
        };
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(TEMP_PREFIX) {
                continue;
            }
            if !visit(&name) {
                break;
            }
        }
        Ok(())
    }

    fn delete_blob(&self, path: &str) -> StorageResult<()> {
        fs::remove_file(path).map_err(|e| map_io(e, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn path_in(dir: &tempfile::TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    #[test]
    fn file_write_and_read() {
        let dir = tempdir().unwrap();
        let path = path_in(&dir, "blob");
        let store = LocalBlobStore::new();

        store.write_blob(&path, b"hello world", WriteOptions::default()).unwrap();

        assert_eq!(store.read_blob(&path).unwrap(), b"hello world");
        let blob = store.new_random_access(&path).unwrap();
        assert_eq!(blob.size().unwrap(), 11);
        assert_eq!(blob.read_at_fully(6, 5).unwrap(), b"world");
    }

    #[test]
    fn file_truncate_replaces_content() {
        let dir = tempdir().unwrap();
        let path = path_in(&dir, "blob");
        let store = LocalBlobStore::new();

        store.write_blob(&path, b"a much longer value", WriteOptions::default()).unwrap();
        store.write_blob(&path, b"short", WriteOptions::default()).unwrap();
        assert_eq!(store.read_blob(&path).unwrap(), b"short");
    }

    #[test]
    fn file_unclosed_writer_leaves_nothing() {
        let dir = tempdir().unwrap();
        let path = path_in(&dir, "blob");
        let store = LocalBlobStore::new();
        {
            let mut writer = store.new_writable(&path, WriteOptions::default()).unwrap();
            writer.append(b"partial").unwrap();
        }
        assert!(store.read_blob(&path).unwrap_err().is_not_found());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn file_failed_rename_removes_temp() {
        let dir = tempdir().unwrap();
        let path = path_in(&dir, "blob");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(dir.path().join("blob").join("inner"), b"x").unwrap();
        let store = LocalBlobStore::new();

        assert!(store.write_blob(&path, b"data", WriteOptions::default()).is_err());

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(TEMP_PREFIX))
            .collect();
        assert!(leftovers.is_empty(), "left {leftovers:?}");
    }

    #[test]
    fn file_read_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let store = LocalBlobStore::new();
        let err = store.read_blob(&path_in(&dir, "missing")).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn file_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = path_in(&dir, "nested/deeper/blob");
        let store = LocalBlobStore::new();
        store.write_blob(&path, b"x", WriteOptions::default()).unwrap();
        assert!(Path::new(&path).exists());
    }

    #[test]
    fn file_iterate_dir_skips_temp_and_subdirs() {
        let dir = tempdir().unwrap();
        let store = LocalBlobStore::new();
        store.write_blob(&path_in(&dir, "a"), b"1", WriteOptions::default()).unwrap();
        store.write_blob(&path_in(&dir, "sub/b"), b"2", WriteOptions::default()).unwrap();
        std::fs::write(dir.path().join(".tmp_c"), b"3").unwrap();

        let mut names = Vec::new();
        let root = dir.path().to_string_lossy().into_owned();
        store
            .iterate_dir(&root, &mut |name| {
                names.push(name.to_string());
                true
            })
            .unwrap();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn file_iterate_missing_dir_is_empty() {
        let dir = tempdir().unwrap();
        let store = LocalBlobStore::new();
        let mut count = 0;
        store
            .iterate_dir(&path_in(&dir, "nothing"), &mut |_| {
                count += 1;
                true
            })
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn file_delete() {
        let dir = tempdir().unwrap();
        let path = path_in(&dir, "blob");
        let store = LocalBlobStore::new();
        store.write_blob(&path, b"x", WriteOptions::default()).unwrap();

        store.delete_blob(&path).unwrap();
        assert!(store.delete_blob(&path).unwrap_err().is_not_found());
    }

    #[test]
    fn file_must_create_rejects_existing() {
        let dir = tempdir().unwrap();
        let path = path_in(&dir, "blob");
        let store = LocalBlobStore::new();
        store.write_blob(&path, b"x", WriteOptions::default()).unwrap();

        let options = WriteOptions {
            mode: OpenMode::MustCreate,
            sync_on_close: false,
        };
        assert!(matches!(
            store.write_blob(&path, b"y", options),
            Err(StorageError::AlreadyExists { .. })
        ));
    }
}
