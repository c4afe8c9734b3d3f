//! Tablet and rowset handles.

use crate::error::{CoreError, CoreResult};
use crate::manager::{MetadataIter, TabletManager, TxnLogIter};
use crate::metadata::{RowsetMetadata, TabletMetadata};
use crate::publish::PublishOutcome;
use crate::schema::TabletSchema;
use crate::txn_log::TxnLog;
use crate::types::{RowsetId, TabletId, TxnId, Version};
use std::fmt;
use std::sync::Arc;

/// A handle to one tablet, bound to its manager.
///
/// Cheap to create and clone. Holding a handle does not imply the tablet
/// exists; operations report `NotFound` as usual.
#[derive(Clone)]
pub struct Tablet {
    manager: Arc<TabletManager>,
    id: TabletId,
}

impl fmt::Debug for Tablet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tablet").field("id", &self.id).finish()
    }
}

impl Tablet {
    pub(crate) fn new(manager: Arc<TabletManager>, id: TabletId) -> Self {
        Self { manager, id }
    }

    /// The tablet id.
    #[must_use]
    pub fn id(&self) -> TabletId {
        self.id
    }

    /// The owning manager.
    #[must_use]
    pub fn manager(&self) -> &Arc<TabletManager> {
        &self.manager
    }

    /// Directory holding the tablet's blobs.
    #[must_use]
    pub fn root_location(&self) -> String {
        self.manager.locations().root_location(self.id)
    }

    /// Location of the snapshot at `version`.
    #[must_use]
    pub fn metadata_location(&self, version: Version) -> String {
        self.manager
            .locations()
            .tablet_metadata_location(self.id, version)
    }

    /// Location of the txn log of `txn_id`.
    #[must_use]
    pub fn txn_log_location(&self, txn_id: TxnId) -> String {
        self.manager.locations().txn_log_location(self.id, txn_id)
    }

    /// Location of a segment file.
    #[must_use]
    pub fn segment_location(&self, segment_name: &str) -> String {
        self.manager
            .locations()
            .segment_location(self.id, segment_name)
    }

    /// Returns the snapshot at `version`.
    ///
    /// # Errors
    ///
    /// See [`TabletManager::get_tablet_metadata`].
    pub fn get_metadata(&self, version: Version) -> CoreResult<Arc<TabletMetadata>> {
        self.manager.get_tablet_metadata(self.id, version)
    }

    /// Persists a snapshot of this tablet.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the snapshot belongs to another tablet, or
    /// any error from [`TabletManager::put_tablet_metadata`].
    pub fn put_metadata(&self, metadata: Arc<TabletMetadata>) -> CoreResult<()> {
        if metadata.id != self.id {
            return Err(CoreError::invalid_argument(format!(
                "metadata of {} put through {}",
                metadata.id, self.id
            )));
        }
        self.manager.put_tablet_metadata(metadata)
    }

    /// Deletes the snapshot at `version`.
    ///
    /// # Errors
    ///
    /// See [`TabletManager::delete_tablet_metadata`].
    pub fn delete_metadata(&self, version: Version) -> CoreResult<()> {
        self.manager.delete_tablet_metadata(self.id, version)
    }

    /// Lists the tablet's snapshots.
    ///
    /// # Errors
    ///
    /// Propagates directory enumeration failures.
    pub fn list_metadata(&self) -> CoreResult<MetadataIter<'_>> {
        self.manager.list_tablet_metadata(self.id, true)
    }

    /// Returns the txn log of `txn_id`.
    ///
    /// # Errors
    ///
    /// See [`TabletManager::get_txn_log`].
    pub fn get_txn_log(&self, txn_id: TxnId) -> CoreResult<Arc<TxnLog>> {
        self.manager.get_txn_log(self.id, txn_id)
    }

    /// Persists a txn log of this tablet.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the log is malformed or names another tablet.
    pub fn put_txn_log(&self, log: Arc<TxnLog>) -> CoreResult<()> {
        let (tablet_id, _) = log.validate()?;
        if tablet_id != self.id {
            return Err(CoreError::invalid_argument(format!(
                "txn log of {tablet_id} put through {}",
                self.id
            )));
        }
        self.manager.put_txn_log(log)
    }

    /// Deletes the txn log of `txn_id`.
    ///
    /// # Errors
    ///
    /// See [`TabletManager::delete_txn_log`].
    pub fn delete_txn_log(&self, txn_id: TxnId) -> CoreResult<()> {
        self.manager.delete_txn_log(self.id, txn_id)
    }

    /// Lists the tablet's pending txn logs.
    ///
    /// # Errors
    ///
    /// Propagates directory enumeration failures.
    pub fn list_txn_logs(&self) -> CoreResult<TxnLogIter<'_>> {
        self.manager.list_txn_logs(self.id, true)
    }

    /// Returns the tablet schema.
    ///
    /// # Errors
    ///
    /// See [`TabletManager::get_tablet_schema`].
    pub fn get_schema(&self) -> CoreResult<Arc<TabletSchema>> {
        self.manager.get_tablet_schema(self.id)
    }

    /// Publishes `new_version` from `base_version`.
    ///
    /// # Errors
    ///
    /// See [`TabletManager::publish_version`].
    pub fn publish_version(
        &self,
        base_version: Version,
        new_version: Version,
        txns: &[TxnId],
    ) -> CoreResult<PublishOutcome> {
        self.manager
            .publish_version(self.id, base_version, new_version, txns)
    }
}

/// A rowset of a tablet snapshot.
#[derive(Debug, Clone)]
pub struct Rowset {
    tablet: Arc<Tablet>,
    metadata: Arc<RowsetMetadata>,
}

impl Rowset {
    /// Binds `metadata` to `tablet`.
    #[must_use]
    pub fn new(tablet: Arc<Tablet>, metadata: Arc<RowsetMetadata>) -> Self {
        Self { tablet, metadata }
    }

    /// The rowset id.
    #[must_use]
    pub fn id(&self) -> RowsetId {
        self.metadata.id
    }

    /// The owning tablet.
    #[must_use]
    pub fn tablet(&self) -> &Arc<Tablet> {
        &self.tablet
    }

    /// The rowset metadata.
    #[must_use]
    pub fn metadata(&self) -> &Arc<RowsetMetadata> {
        &self.metadata
    }

    /// Number of rows.
    #[must_use]
    pub fn num_rows(&self) -> u64 {
        self.metadata.num_rows
    }

    /// Whether segments may overlap in key range.
    #[must_use]
    pub fn is_overlapped(&self) -> bool {
        self.metadata.overlapped
    }

    /// Locations of the rowset's segment files, in order.
    #[must_use]
    pub fn segment_locations(&self) -> Vec<String> {
        self.metadata
            .segments
            .iter()
            .map(|name| self.tablet.segment_location(name))
            .collect()
    }
}
