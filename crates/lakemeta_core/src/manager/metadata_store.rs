//! Versioned snapshot store.

use super::list::MetadataIter;
use super::TabletManager;
use crate::cache::CacheValue;
use crate::error::{CoreError, CoreResult};
use crate::location::{tablet_metadata_prefix, TABLET_METADATA_PREFIX};
use crate::metadata::TabletMetadata;
use crate::types::{TabletId, Version};
use lakemeta_codec::{Decode, Encode};
use std::sync::Arc;

impl TabletManager {
    /// Returns the snapshot `(tablet_id, version)`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the blob is absent, `Corruption` if it cannot be
    /// parsed, or a storage error.
    pub fn get_tablet_metadata(
        &self,
        tablet_id: TabletId,
        version: Version,
    ) -> CoreResult<Arc<TabletMetadata>> {
        let location = self.locations().tablet_metadata_location(tablet_id, version);
        self.get_tablet_metadata_at(&location, true)
    }

    /// Returns the snapshot stored at `location`.
    ///
    /// The cache is consulted first. On a miss the blob is read and, if
    /// `fill_cache` is set, the parsed snapshot is cached.
    ///
    /// # Errors
    ///
    /// Same as [`TabletManager::get_tablet_metadata`].
    pub fn get_tablet_metadata_at(
        &self,
        location: &str,
        fill_cache: bool,
    ) -> CoreResult<Arc<TabletMetadata>> {
        if let Some(metadata) = self.lookup_tablet_metadata(location) {
            return Ok(metadata);
        }
        let bytes = self.read_blob(location)?;
        self.stats_ref().record_metadata_read();
        let metadata = TabletMetadata::decode(&bytes)
            .map_err(|e| CoreError::corruption(format!("failed to parse {location}: {e}")))?;
        let metadata = Arc::new(metadata);
        if fill_cache {
            self.fill_metacache(
                location,
                CacheValue::Metadata(Arc::clone(&metadata)),
                bytes.len(),
            );
        }
        Ok(metadata)
    }

    /// Persists `metadata` at its version's location and caches it.
    ///
    /// The blob is written with truncate-create semantics. On failure the
    /// cache is left unchanged.
    ///
    /// # Errors
    ///
    /// Propagates encoding and store failures.
    pub fn put_tablet_metadata(&self, metadata: Arc<TabletMetadata>) -> CoreResult<()> {
        let location = self
            .locations()
            .tablet_metadata_location(metadata.id, metadata.version);
        let bytes = metadata.encode().map_err(CoreError::Codec)?;
        self.store()
            .write_blob(&location, &bytes, self.write_options())?;
        self.stats_ref().record_metadata_write();
        self.fill_metacache(&location, CacheValue::Metadata(metadata), bytes.len());
        Ok(())
    }

    /// Evicts and deletes the snapshot `(tablet_id, version)`.
    ///
    /// # Errors
    ///
    /// Propagates the store's delete failure, including `NotFound`.
    pub fn delete_tablet_metadata(&self, tablet_id: TabletId, version: Version) -> CoreResult<()> {
        let location = self.locations().tablet_metadata_location(tablet_id, version);
        self.erase_metacache(&location);
        self.store().delete_blob(&location)?;
        self.stats_ref().record_metadata_delete();
        Ok(())
    }

    /// Lists snapshots of `tablet_id`, or every snapshot under the
    /// tablet's root if `filter_by_tablet` is false.
    ///
    /// # Errors
    ///
    /// Propagates directory enumeration failures.
    pub fn list_tablet_metadata(
        &self,
        tablet_id: TabletId,
        filter_by_tablet: bool,
    ) -> CoreResult<MetadataIter<'_>> {
        let root = self.locations().root_location(tablet_id);
        let prefix = if filter_by_tablet {
            tablet_metadata_prefix(tablet_id)
        } else {
            TABLET_METADATA_PREFIX.to_string()
        };
        let locations = self.list_locations(&root, &prefix)?;
        Ok(MetadataIter::new(
            self,
            locations,
            Self::get_tablet_metadata_at,
        ))
    }
}
