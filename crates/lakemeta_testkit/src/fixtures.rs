//! Test fixtures and manager helpers.
//!
//! Provides convenience functions for setting up tablet managers over
//! in-memory or temporary-directory stores, and for building rowsets and
//! publishing common tablet histories.

use lakemeta_core::{
    ColumnSchema, CreateTabletRequest, FixedLocationProvider, KeysType, ManagerConfig,
    PublishOutcome, RowsetMetadata, SchemaRegistry, Tablet, TabletId, TabletManager,
    TabletSchema, TxnId, TxnLog, Version,
};
use lakemeta_storage::{BlobStore, InMemoryBlobStore, LocalBlobStore};
use std::sync::Arc;
use tempfile::TempDir;

/// Root used by in-memory fixtures.
pub const MEMORY_ROOT: &str = "lake";

/// A tablet manager with automatic cleanup of its backing directory.
pub struct TestManager {
    /// The manager instance.
    pub manager: Arc<TabletManager>,
    root: String,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestManager {
    /// Creates a manager over a fresh in-memory store.
    pub fn memory() -> Self {
        Self::memory_with_config(ManagerConfig::default())
    }

    /// Creates a manager over a fresh in-memory store with `config`.
    pub fn memory_with_config(config: ManagerConfig) -> Self {
        Self::with_store(Arc::new(InMemoryBlobStore::new()), config)
    }

    /// Creates a manager over `store`, rooted at [`MEMORY_ROOT`].
    pub fn with_store(store: Arc<dyn BlobStore>, config: ManagerConfig) -> Self {
        Self {
            manager: Arc::new(TabletManager::new(
                config,
                store,
                Arc::new(FixedLocationProvider::new(MEMORY_ROOT)),
                Arc::new(SchemaRegistry::new()),
            )),
            root: MEMORY_ROOT.to_string(),
            _temp_dir: None,
        }
    }

    /// Creates a manager over a local store in a temporary directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_string_lossy().into_owned();
        let manager = TabletManager::new(
            ManagerConfig::default().sync_on_close(false),
            Arc::new(LocalBlobStore::new()),
            Arc::new(FixedLocationProvider::new(root.clone())),
            Arc::new(SchemaRegistry::new()),
        );
        Self {
            manager: Arc::new(manager),
            root,
            _temp_dir: Some(temp_dir),
        }
    }

    /// Opens a second manager over the same temporary directory, with a
    /// cold cache and its own registry.
    ///
    /// Returns `None` for in-memory fixtures.
    pub fn reopen(&self) -> Option<Arc<TabletManager>> {
        self._temp_dir.as_ref()?;
        Some(Arc::new(TabletManager::new(
            self.manager.config().clone(),
            Arc::new(LocalBlobStore::new()),
            Arc::new(FixedLocationProvider::new(self.root.clone())),
            Arc::new(SchemaRegistry::new()),
        )))
    }

    /// The directory every tablet lives under.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Creates `tablet_id` with [`test_schema`] and returns its handle.
    pub fn create_tablet(&self, tablet_id: u64) -> Tablet {
        let tablet_id = TabletId::new(tablet_id);
        self.manager
            .create_tablet(&CreateTabletRequest {
                tablet_id,
                schema: test_schema(),
            })
            .expect("Failed to create tablet");
        self.manager.get_tablet(tablet_id)
    }

    /// Writes a write txn log appending `rowset`.
    pub fn put_write_log(&self, tablet_id: TabletId, txn_id: u64, rowset: RowsetMetadata) {
        self.manager
            .put_txn_log(Arc::new(TxnLog::write(tablet_id, TxnId::new(txn_id), rowset)))
            .expect("Failed to put txn log");
    }

    /// Writes one single-segment rowset at `txn_id` and publishes it on
    /// top of `base`, returning the new version.
    pub fn load(&self, tablet_id: TabletId, base: Version, txn_id: u64, rows: u64) -> Version {
        self.put_write_log(tablet_id, txn_id, RowsetBuilder::new().rows(rows).build());
        let new_version = base.next();
        let outcome = self
            .manager
            .publish_version(tablet_id, base, new_version, &[TxnId::new(txn_id)])
            .expect("Failed to publish");
        assert_eq!(outcome, PublishOutcome::Published);
        new_version
    }
}

impl std::ops::Deref for TestManager {
    type Target = Arc<TabletManager>;

    fn deref(&self) -> &Self::Target {
        &self.manager
    }
}

/// Schema shared by fixture tablets.
pub fn test_schema() -> TabletSchema {
    TabletSchema::new(
        1001,
        KeysType::Duplicate,
        vec![
            ColumnSchema::key(0, "id", "BIGINT"),
            ColumnSchema::value(1, "name", "VARCHAR"),
            ColumnSchema::value(2, "amount", "DECIMAL"),
        ],
    )
}

/// Builder for [`RowsetMetadata`].
#[derive(Debug, Clone)]
pub struct RowsetBuilder {
    segments: Vec<String>,
    num_rows: u64,
    data_size: Option<u64>,
}

impl Default for RowsetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RowsetBuilder {
    /// A one-segment rowset with ten rows.
    pub fn new() -> Self {
        Self {
            segments: vec!["segment_0.dat".to_string()],
            num_rows: 10,
            data_size: None,
        }
    }

    /// Sets the number of rows.
    #[must_use]
    pub fn rows(mut self, rows: u64) -> Self {
        self.num_rows = rows;
        self
    }

    /// Replaces the segments with `count` generated names.
    #[must_use]
    pub fn segments(mut self, count: usize) -> Self {
        self.segments = (0..count).map(|i| format!("segment_{i}.dat")).collect();
        self
    }

    /// Replaces the segments with the given names.
    #[must_use]
    pub fn segment_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.segments = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the data size. Defaults to 100 bytes per row.
    #[must_use]
    pub fn data_size(mut self, bytes: u64) -> Self {
        self.data_size = Some(bytes);
        self
    }

    /// Builds the rowset.
    pub fn build(self) -> RowsetMetadata {
        let data_size = self.data_size.unwrap_or(self.num_rows * 100);
        RowsetMetadata::new(self.segments, self.num_rows, data_size)
    }
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates `tablet_id` and publishes `count` single-segment loads, one
    /// per version, using txn ids `1..=count`.
    ///
    /// Returns the fixture and the latest version (`count + 1`).
    pub fn tablet_with_loads(tablet_id: u64, count: u64) -> (TestManager, Version) {
        let fixture = TestManager::memory();
        fixture.create_tablet(tablet_id);
        let mut version = Version::INITIAL;
        for txn in 1..=count {
            version = fixture.load(TabletId::new(tablet_id), version, txn, 10);
        }
        (fixture, version)
    }
}
