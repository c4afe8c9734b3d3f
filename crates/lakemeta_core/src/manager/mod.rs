//! The tablet manager.
//!
//! [`TabletManager`] is the entry point of the metadata layer. It owns the
//! metadata cache and ties together the blob store, the location provider
//! and the schema registry. Store operations are split across submodules:
//!
//! - `metadata_store`: versioned snapshots
//! - `txn_log_store`: pending transaction logs
//! - `schema`: schema resolution through the registry
//!
//! Publish lives in [`crate::publish`] and compaction planning in
//! [`crate::compaction`]; both are methods on the manager.

mod list;
mod metadata_store;
mod schema;
mod txn_log_store;

pub use list::{ListIter, MetadataIter, TxnLogIter};

use crate::cache::{CacheValue, MetaCache};
use crate::config::ManagerConfig;
use crate::error::{CoreError, CoreResult};
use crate::location::{FixedLocationProvider, LocationProvider};
use crate::metadata::TabletMetadata;
use crate::schema::{SchemaRegistry, TabletSchema};
use crate::stats::{ManagerStats, StatsSnapshot};
use crate::tablet::Tablet;
use crate::txn_log::TxnLog;
use crate::types::TabletId;
use lakemeta_storage::{BlobStore, InMemoryBlobStore, WriteOptions};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Request to create a tablet.
#[derive(Debug, Clone)]
pub struct CreateTabletRequest {
    /// Id of the new tablet.
    pub tablet_id: TabletId,
    /// Schema of the new tablet.
    pub schema: TabletSchema,
}

/// Manages tablet snapshots and transaction logs over a blob store.
///
/// All methods take `&self` and are safe to call from many threads. The
/// cache lock is never held across a store call.
pub struct TabletManager {
    config: ManagerConfig,
    store: Arc<dyn BlobStore>,
    locations: Arc<dyn LocationProvider>,
    registry: Arc<SchemaRegistry>,
    cache: MetaCache,
    stats: ManagerStats,
}

impl fmt::Debug for TabletManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabletManager")
            .field("config", &self.config)
            .field("cache_len", &self.cache.len())
            .field("cache_usage", &self.cache.usage())
            .finish_non_exhaustive()
    }
}

impl TabletManager {
    /// Creates a manager over `store`.
    pub fn new(
        config: ManagerConfig,
        store: Arc<dyn BlobStore>,
        locations: Arc<dyn LocationProvider>,
        registry: Arc<SchemaRegistry>,
    ) -> Self {
        let cache = MetaCache::new(config.metacache_capacity);
        Self {
            config,
            store,
            locations,
            registry,
            cache,
            stats: ManagerStats::new(),
        }
    }

    /// Creates a manager over a fresh in-memory store with default config.
    #[must_use]
    pub fn open_in_memory() -> Self {
        Self::new(
            ManagerConfig::default(),
            Arc::new(InMemoryBlobStore::new()),
            Arc::new(FixedLocationProvider::new("lake")),
            Arc::new(SchemaRegistry::new()),
        )
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// The underlying blob store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    /// The location provider.
    #[must_use]
    pub fn locations(&self) -> &Arc<dyn LocationProvider> {
        &self.locations
    }

    /// The schema registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// The metadata cache.
    #[must_use]
    pub fn metacache(&self) -> &MetaCache {
        &self.cache
    }

    /// Returns a point-in-time copy of the counters.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub(crate) fn stats_ref(&self) -> &ManagerStats {
        &self.stats
    }

    /// Returns a handle to `tablet_id`. Does not touch the store.
    pub fn get_tablet(self: &Arc<Self>, tablet_id: TabletId) -> Tablet {
        Tablet::new(Arc::clone(self), tablet_id)
    }

    /// Creates a tablet by writing its initial snapshot.
    ///
    /// The snapshot has version 1, no rowsets and `next_rowset_id` 1. An
    /// existing version 1 is overwritten.
    ///
    /// # Errors
    ///
    /// Propagates store and encoding failures.
    pub fn create_tablet(&self, request: &CreateTabletRequest) -> CoreResult<()> {
        let metadata = TabletMetadata::new(request.tablet_id, request.schema.clone());
        self.put_tablet_metadata(Arc::new(metadata))
    }

    /// Deletes every snapshot and txn log of `tablet_id`.
    ///
    /// Individual delete failures are logged and skipped. The schema cache
    /// entry of the tablet is evicted last.
    ///
    /// # Errors
    ///
    /// Returns an error only if the blobs cannot be listed.
    pub fn drop_tablet(&self, tablet_id: TabletId) -> CoreResult<()> {
        let mut locations = self.list_tablet_metadata(tablet_id, true)?.into_locations();
        locations.extend(self.list_txn_logs(tablet_id, true)?.into_locations());

        for location in &locations {
            self.cache.erase(location);
            if let Err(e) = self.store.delete_blob(location) {
                warn!(tablet = %tablet_id, %location, error = %e, "failed to delete tablet blob");
            }
        }
        self.cache.erase(&schema_cache_key(tablet_id));
        debug!(tablet = %tablet_id, blobs = locations.len(), "dropped tablet");
        Ok(())
    }

    // === Cache ===

    /// Looks up a cached snapshot by location.
    pub fn lookup_tablet_metadata(&self, key: &str) -> Option<Arc<TabletMetadata>> {
        let found = self.lookup(key).and_then(|v| v.as_metadata().cloned());
        self.record_lookup(found.is_some());
        found
    }

    /// Looks up a cached txn log by location.
    pub fn lookup_txn_log(&self, key: &str) -> Option<Arc<TxnLog>> {
        let found = self.lookup(key).and_then(|v| v.as_txn_log().cloned());
        self.record_lookup(found.is_some());
        found
    }

    /// Looks up a cached schema by its schema key.
    pub fn lookup_tablet_schema(&self, key: &str) -> Option<Arc<TabletSchema>> {
        let found = self.lookup(key).and_then(|v| v.as_schema().cloned());
        self.record_lookup(found.is_some());
        found
    }

    /// Evicts `key` from the cache. The persisted blob is untouched.
    pub fn erase_metacache(&self, key: &str) {
        self.cache.erase(key);
    }

    /// Evicts every cache entry.
    pub fn prune_metacache(&self) {
        self.cache.prune();
    }

    fn lookup(&self, key: &str) -> Option<CacheValue> {
        if self.cache.capacity() == 0 {
            return None;
        }
        self.cache.lookup(key)
    }

    fn record_lookup(&self, hit: bool) {
        if hit {
            self.stats.record_cache_hit();
        } else {
            self.stats.record_cache_miss();
        }
    }

    pub(crate) fn fill_metacache(&self, key: &str, value: CacheValue, charge: usize) {
        if self.cache.capacity() == 0 {
            return;
        }
        if !self.cache.insert(key, value, charge) {
            self.stats.record_cache_rejected();
            warn!(%key, charge, capacity = self.cache.capacity(), "failed to fill metacache");
        }
    }

    // === Blob I/O ===

    pub(crate) fn write_options(&self) -> WriteOptions {
        WriteOptions {
            sync_on_close: self.config.sync_on_close,
            ..WriteOptions::default()
        }
    }

    /// Reads a whole blob, rejecting sizes above `max_blob_size`.
    pub(crate) fn read_blob(&self, location: &str) -> CoreResult<Vec<u8>> {
        let blob = self.store.new_random_access(location)?;
        let size = blob.size()?;
        if size > self.config.max_blob_size {
            return Err(CoreError::corruption(format!(
                "{location}: size {size} exceeds limit {}",
                self.config.max_blob_size
            )));
        }
        let len = usize::try_from(size).map_err(|_| {
            CoreError::corruption(format!("{location}: size {size} is not addressable"))
        })?;
        Ok(blob.read_at_fully(0, len)?)
    }
}

/// Cache key of the schema of `tablet_id`.
#[must_use]
pub fn schema_cache_key(tablet_id: TabletId) -> String {
    format!("schema_{}", tablet_id.as_u64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnSchema, KeysType};
    use crate::types::{TxnId, Version};

    fn request(id: u64) -> CreateTabletRequest {
        CreateTabletRequest {
            tablet_id: TabletId::new(id),
            schema: TabletSchema::new(1, KeysType::Duplicate, vec![ColumnSchema::key(0, "k", "INT")]),
        }
    }

    #[test]
    fn create_tablet_writes_version_one() {
        let manager = TabletManager::open_in_memory();
        manager.create_tablet(&request(7)).unwrap();

        let metadata = manager
            .get_tablet_metadata(TabletId::new(7), Version::INITIAL)
            .unwrap();
        assert_eq!(metadata.next_rowset_id, 1);
        assert!(metadata.rowsets.is_empty());
    }

    #[test]
    fn drop_tablet_removes_only_its_blobs() {
        let manager = TabletManager::open_in_memory();
        manager.create_tablet(&request(7)).unwrap();
        manager.create_tablet(&request(8)).unwrap();
        let log = TxnLog::compaction(TabletId::new(7), TxnId::new(1), vec![], None);
        manager.put_txn_log(Arc::new(log)).unwrap();
        manager.get_tablet_schema(TabletId::new(7)).unwrap();

        manager.drop_tablet(TabletId::new(7)).unwrap();

        let err = manager
            .get_tablet_metadata(TabletId::new(7), Version::INITIAL)
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(manager.get_txn_log(TabletId::new(7), TxnId::new(1)).unwrap_err().is_not_found());
        assert!(manager
            .lookup_tablet_schema(&schema_cache_key(TabletId::new(7)))
            .is_none());
        assert!(manager
            .get_tablet_metadata(TabletId::new(8), Version::INITIAL)
            .is_ok());
    }

    #[test]
    fn drop_missing_tablet_is_ok() {
        let manager = TabletManager::open_in_memory();
        manager.drop_tablet(TabletId::new(404)).unwrap();
    }

    #[test]
    fn oversized_blob_is_corruption() {
        let manager = TabletManager::new(
            ManagerConfig::new().max_blob_size(4),
            Arc::new(InMemoryBlobStore::new()),
            Arc::new(FixedLocationProvider::new("lake")),
            Arc::new(SchemaRegistry::new()),
        );
        manager.store().write_blob("lake/x", b"12345", WriteOptions::default()).unwrap();
        assert!(manager.read_blob("lake/x").unwrap_err().is_corruption());
        assert!(manager.read_blob("lake/missing").unwrap_err().is_not_found());
    }

    #[test]
    fn stats_track_cache_lookups() {
        let manager = TabletManager::open_in_memory();
        manager.create_tablet(&request(7)).unwrap();
        manager.get_tablet_metadata(TabletId::new(7), Version::INITIAL).unwrap();
        manager.prune_metacache();
        manager.get_tablet_metadata(TabletId::new(7), Version::INITIAL).unwrap();

        let stats = manager.stats();
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cache_misses, 1);
        assert_eq!(stats.metadata_reads, 1);
        assert_eq!(stats.metadata_writes, 1);
    }

    #[test]
    fn local_store_survives_manager_restart() {
        use lakemeta_storage::LocalBlobStore;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_string_lossy().into_owned();
        let open = || {
            TabletManager::new(
                ManagerConfig::default(),
                Arc::new(LocalBlobStore::new()),
                Arc::new(FixedLocationProvider::new(root.clone())),
                Arc::new(SchemaRegistry::new()),
            )
        };

        open().create_tablet(&request(7)).unwrap();

        let reopened = open();
        let metadata = reopened
            .get_tablet_metadata(TabletId::new(7), Version::INITIAL)
            .unwrap();
        assert_eq!(metadata.id, TabletId::new(7));
        assert_eq!(reopened.stats().metadata_reads, 1);
    }
}
