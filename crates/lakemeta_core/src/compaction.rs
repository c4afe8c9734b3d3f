//! Compaction planning.
//!
//! The manager only decides which rowsets to merge. The merge itself runs
//! elsewhere; its result comes back as a compaction txn log built by
//! [`CompactionTask::to_txn_log`] and is folded in by a publish.

use crate::error::CoreResult;
use crate::manager::TabletManager;
use crate::metadata::{RowsetMetadata, TabletMetadata};
use crate::tablet::{Rowset, Tablet};
use crate::txn_log::TxnLog;
use crate::types::{RowsetId, TabletId, TxnId, Version};
use std::sync::Arc;

/// A planned horizontal compaction of a tablet.
#[derive(Debug, Clone)]
pub struct CompactionTask {
    txn_id: TxnId,
    version: Version,
    tablet: Arc<Tablet>,
    input_rowsets: Vec<Rowset>,
}

impl CompactionTask {
    /// The transaction the output will be attached to.
    #[must_use]
    pub fn txn_id(&self) -> TxnId {
        self.txn_id
    }

    /// The snapshot version the inputs were read from.
    #[must_use]
    pub fn base_version(&self) -> Version {
        self.version
    }

    /// The tablet being compacted.
    #[must_use]
    pub fn tablet(&self) -> &Arc<Tablet> {
        &self.tablet
    }

    /// The rowsets to merge, in snapshot order.
    #[must_use]
    pub fn input_rowsets(&self) -> &[Rowset] {
        &self.input_rowsets
    }

    /// Ids of the input rowsets, in snapshot order.
    #[must_use]
    pub fn input_rowset_ids(&self) -> Vec<RowsetId> {
        self.input_rowsets.iter().map(Rowset::id).collect()
    }

    /// Total rows across the inputs.
    #[must_use]
    pub fn input_rows(&self) -> u64 {
        self.input_rowsets.iter().map(Rowset::num_rows).sum()
    }

    /// Packages the merge result as a compaction txn log.
    ///
    /// Pass `None` when the inputs merged to nothing.
    #[must_use]
    pub fn to_txn_log(&self, output: Option<RowsetMetadata>) -> TxnLog {
        TxnLog::compaction(self.tablet.id(), self.txn_id, self.input_rowset_ids(), output)
    }
}

/// Chooses the rowsets to compact.
///
/// Always a contiguous run of the snapshot's rowsets.
// TODO: pick inputs by size and age instead of taking every rowset.
#[must_use]
pub fn pick_input_rowsets(metadata: &TabletMetadata) -> Vec<RowsetMetadata> {
    metadata.rowsets.clone()
}

impl TabletManager {
    /// Plans a compaction of `tablet_id` at `version` for `txn_id`.
    ///
    /// # Errors
    ///
    /// Any error from reading the snapshot.
    pub fn compact(
        self: &Arc<Self>,
        tablet_id: TabletId,
        version: Version,
        txn_id: TxnId,
    ) -> CoreResult<CompactionTask> {
        let tablet = Arc::new(self.get_tablet(tablet_id));
        let metadata = tablet.get_metadata(version)?;
        let input_rowsets = pick_input_rowsets(&metadata)
            .into_iter()
            .map(|r| Rowset::new(Arc::clone(&tablet), Arc::new(r)))
            .collect();
        Ok(CompactionTask {
            txn_id,
            version,
            tablet,
            input_rowsets,
        })
    }
}
