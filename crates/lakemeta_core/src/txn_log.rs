//! Pending transaction logs.
//!
//! A [`TxnLog`] describes one write or compaction that has finished its
//! data work but is not yet folded into a snapshot. It is addressed by
//! `(tablet_id, txn_id)` and deleted once a publish has merged it.

use crate::error::{CoreError, CoreResult};
use crate::metadata::RowsetMetadata;
use crate::schema::TabletSchema;
use crate::types::{RowsetId, TabletId, TxnId};
use lakemeta_codec::Message;
use serde::{Deserialize, Serialize};

/// A load that appends one rowset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OpWrite {
    /// The rowset to append; ignored when absent or empty.
    pub rowset: Option<RowsetMetadata>,
}

/// A compaction that replaces a contiguous run of rowsets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OpCompaction {
    /// Ids of the rowsets being replaced, in snapshot order.
    pub input_rowsets: Vec<RowsetId>,
    /// The merged rowset; ignored when absent or empty.
    pub output_rowset: Option<RowsetMetadata>,
}

/// A schema change. Recognized but never applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpSchemaChange {
    /// The schema the tablet would move to.
    pub new_schema: TabletSchema,
}

/// The operation carried by a transaction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxnOp {
    /// Append a rowset.
    Write(OpWrite),
    /// Replace adjacent rowsets with their merge.
    Compaction(OpCompaction),
    /// Change the tablet schema.
    SchemaChange(OpSchemaChange),
}

/// A pending operation on a tablet.
///
/// `tablet_id` and `txn_id` are optional on the wire so that a malformed
/// log can be represented and rejected; [`TxnLog::validate`] requires both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxnLog {
    /// Tablet the log applies to.
    pub tablet_id: Option<TabletId>,
    /// Transaction that produced the log.
    pub txn_id: Option<TxnId>,
    /// The operation.
    pub op: TxnOp,
}

impl Message for TxnLog {
    const KIND: &'static str = "txn log";
}

impl TxnLog {
    /// Creates a log with both identity fields set.
    #[must_use]
    pub fn new(tablet_id: TabletId, txn_id: TxnId, op: TxnOp) -> Self {
        Self {
            tablet_id: Some(tablet_id),
            txn_id: Some(txn_id),
            op,
        }
    }

    /// Creates a write log appending `rowset`.
    #[must_use]
    pub fn write(tablet_id: TabletId, txn_id: TxnId, rowset: RowsetMetadata) -> Self {
        Self::new(
            tablet_id,
            txn_id,
            TxnOp::Write(OpWrite {
                rowset: Some(rowset),
            }),
        )
    }

    /// Creates a compaction log replacing `inputs` with `output`.
    #[must_use]
    pub fn compaction(
        tablet_id: TabletId,
        txn_id: TxnId,
        inputs: Vec<RowsetId>,
        output: Option<RowsetMetadata>,
    ) -> Self {
        Self::new(
            tablet_id,
            txn_id,
            TxnOp::Compaction(OpCompaction {
                input_rowsets: inputs,
                output_rowset: output,
            }),
        )
    }

    /// Checks that both identity fields are present and returns them.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] if either is missing.
    pub fn validate(&self) -> CoreResult<(TabletId, TxnId)> {
        let tablet_id = self
            .tablet_id
            .ok_or_else(|| CoreError::invalid_argument("txn log does not have tablet id"))?;
        let txn_id = self
            .txn_id
            .ok_or_else(|| CoreError::invalid_argument("txn log does not have txn id"))?;
        Ok((tablet_id, txn_id))
    }

    /// Short name of the operation, for display.
    #[must_use]
    pub fn op_name(&self) -> &'static str {
        match self.op {
            TxnOp::Write(_) => "write",
            TxnOp::Compaction(_) => "compaction",
            TxnOp::SchemaChange(_) => "schema_change",
        }
    }
}
