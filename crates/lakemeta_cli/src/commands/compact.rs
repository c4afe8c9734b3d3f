//! Compact command implementation.

use super::{is_json, CmdResult};
use lakemeta_core::{TabletId, TabletManager, TxnId, Version};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Description of a planned compaction.
#[derive(Debug, Serialize)]
pub struct CompactPlan {
    /// Tablet being compacted.
    pub tablet: u64,
    /// Version the inputs were taken from.
    pub version: u64,
    /// Transaction the output must be written under.
    pub txn: u64,
    /// Total rows across the inputs.
    pub input_rows: u64,
    /// Inputs in snapshot order.
    pub inputs: Vec<CompactInput>,
}

/// One input rowset.
#[derive(Debug, Serialize)]
pub struct CompactInput {
    /// Rowset id.
    pub id: u32,
    /// Rows in the rowset.
    pub rows: u64,
    /// Segment blob locations.
    pub segments: Vec<String>,
}

/// Runs the compact command.
///
/// Only plans the task; merging the segments is left to the data layer.
pub fn run(
    manager: &Arc<TabletManager>,
    tablet: u64,
    version: u64,
    txn: u64,
    format: &str,
) -> CmdResult {
    info!("Planning compaction of tablet {} at v{}", tablet, version);
    let task = manager.compact(TabletId::new(tablet), Version::new(version), TxnId::new(txn))?;

    let plan = CompactPlan {
        tablet,
        version,
        txn,
        input_rows: task.input_rows(),
        inputs: task
            .input_rowsets()
            .iter()
            .map(|rowset| CompactInput {
                id: rowset.id().as_u32(),
                rows: rowset.num_rows(),
                segments: rowset.segment_locations(),
            })
            .collect(),
    };

    if is_json(format) {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!(
        "Compaction of {} at {} under {}",
        task.tablet().id(),
        task.base_version(),
        task.txn_id()
    );
    if plan.inputs.is_empty() {
        println!("  Nothing to compact");
        return Ok(());
    }
    println!("  Inputs: {} rowsets, {} rows", plan.inputs.len(), plan.input_rows);
    for input in &plan.inputs {
        println!("    rowset {} ({} rows)", input.id, input.rows);
        for segment in &input.segments {
            println!("      {segment}");
        }
    }
    Ok(())
}
