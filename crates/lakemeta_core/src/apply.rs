//! Folding transaction logs into snapshots.
//!
//! [`apply_txn_log`] is a pure, single-pass transform. On error the
//! snapshot is left exactly as it was.

use crate::error::{CoreError, CoreResult};
use crate::metadata::{RowsetMetadata, TabletMetadata};
use crate::txn_log::{OpCompaction, OpWrite, TxnLog, TxnOp};
use crate::types::RowsetId;

/// Applies `log` to `metadata`.
///
/// # Errors
///
/// - `Internal` if a compaction input is missing, the inputs are not
///   adjacent in the snapshot's rowset order, or the rowset id space is
///   exhausted
/// - `NotSupported` for schema changes
pub fn apply_txn_log(log: &TxnLog, metadata: &mut TabletMetadata) -> CoreResult<()> {
    match &log.op {
        TxnOp::Write(op) => apply_write(op, metadata),
        TxnOp::Compaction(op) => apply_compaction(op, metadata),
        TxnOp::SchemaChange(_) => Err(CoreError::not_supported("apply schema change log")),
    }
}

/// Assigns the next rowset id to `rowset` and reserves its id span.
///
/// Fails without touching `metadata` when the span does not fit in the
/// remaining id space.
fn assign_id(rowset: &RowsetMetadata, metadata: &mut TabletMetadata) -> CoreResult<RowsetMetadata> {
    let next = metadata
        .next_rowset_id
        .checked_add(rowset.id_span())
        .ok_or_else(|| {
            CoreError::internal(format!(
                "rowset id space exhausted at {} for {} ids",
                metadata.next_rowset_id,
                rowset.id_span()
            ))
        })?;
    let mut rowset = rowset.clone();
    rowset.id = RowsetId::new(metadata.next_rowset_id);
    metadata.next_rowset_id = next;
    Ok(rowset)
}

fn apply_write(op: &OpWrite, metadata: &mut TabletMetadata) -> CoreResult<()> {
    if let Some(rowset) = op.rowset.as_ref().filter(|r| !r.is_empty()) {
        let rowset = assign_id(rowset, metadata)?;
        metadata.rowsets.push(rowset);
    }
    Ok(())
}

fn apply_compaction(op: &OpCompaction, metadata: &mut TabletMetadata) -> CoreResult<()> {
    let output = op.output_rowset.as_ref().filter(|r| !r.is_empty());
    let Some((first_id, rest)) = op.input_rowsets.split_first() else {
        debug_assert!(output.is_none(), "compaction without inputs has an output rowset");
        return Ok(());
    };

    let first = metadata
        .rowset_position(*first_id)
        .ok_or_else(|| CoreError::internal(format!("input {first_id} not found")))?;
    let mut last = first;
    for id in rest {
        let pos = metadata
            .rowset_position(*id)
            .ok_or_else(|| CoreError::internal(format!("input {id} not found")))?;
        if pos != last + 1 {
            return Err(CoreError::internal(format!(
                "input rowsets {} and {id} are not adjacent",
                metadata.rowsets[last].id
            )));
        }
        last = pos;
    }

    let mut start = first;
    if let Some(output) = output {
        let output = assign_id(output, metadata)?;
        metadata.rowsets[first] = output;
        start += 1;
    }
    metadata.rowsets.drain(start..=last);
    Ok(())
}
