//! List command implementation.

use super::{is_json, CmdResult};
use lakemeta_core::{
    parse_tablet_metadata_filename, parse_txn_log_filename, TabletId, TabletManager,
};
use serde::Serialize;

/// One listed blob.
#[derive(Debug, Serialize)]
pub struct ListEntry {
    /// Blob location.
    pub location: String,
    /// Tablet parsed from the name.
    pub tablet: Option<u64>,
    /// Version or txn id parsed from the name.
    pub id: Option<u64>,
    /// Summary of the decoded content, or the error that prevented decoding.
    pub detail: String,
}

/// Runs the list command.
///
/// Without a tablet the listing covers every tablet under the root.
pub fn run(manager: &TabletManager, tablet: Option<u64>, logs: bool, format: &str) -> CmdResult {
    let filter = tablet.is_some();
    let tablet_id = TabletId::new(tablet.unwrap_or_default());

    let mut entries = Vec::new();
    if logs {
        let iter = manager.list_txn_logs(tablet_id, filter)?;
        let locations = iter.into_locations();
        for location in locations {
            let parsed = parse_txn_log_filename(file_name(&location));
            let detail = match manager.get_txn_log_at(&location, false) {
                Ok(log) => log.op_name().to_string(),
                Err(e) => format!("error: {e}"),
            };
            entries.push(ListEntry {
                tablet: parsed.map(|(t, _)| t.as_u64()),
                id: parsed.map(|(_, txn)| txn.as_u64()),
                location,
                detail,
            });
        }
    } else {
        let locations = manager.list_tablet_metadata(tablet_id, filter)?.into_locations();
        for location in locations {
            let parsed = parse_tablet_metadata_filename(file_name(&location));
            let detail = match manager.get_tablet_metadata_at(&location, false) {
                Ok(metadata) => format!(
                    "{} rowsets, {} rows",
                    metadata.rowsets.len(),
                    metadata.num_rows()
                ),
                Err(e) => format!("error: {e}"),
            };
            entries.push(ListEntry {
                tablet: parsed.map(|(t, _)| t.as_u64()),
                id: parsed.map(|(_, version)| version.as_u64()),
                location,
                detail,
            });
        }
    }

    if is_json(format) {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let id_label = if logs { "txn" } else { "version" };
    println!("{:>20}  {:>20}  {}", "tablet", id_label, "detail");
    for entry in &entries {
        println!(
            "{:>20}  {:>20}  {}",
            display(entry.tablet),
            display(entry.id),
            entry.detail
        );
    }
    println!("{} entries", entries.len());
    Ok(())
}

fn file_name(location: &str) -> &str {
    location.rsplit('/').next().unwrap_or(location)
}

fn display(value: Option<u64>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}
