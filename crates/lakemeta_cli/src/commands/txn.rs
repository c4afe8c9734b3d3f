//! Txn log and publish commands.

use super::CmdResult;
use lakemeta_core::{PublishOutcome, TabletId, TabletManager, TxnId, TxnLog, Version};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Runs the put-log command.
pub fn put_log(manager: &TabletManager, path: &Path) -> CmdResult {
    info!("Reading txn log from {:?}", path);
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let log: TxnLog = serde_json::from_str(&text)?;
    let (tablet_id, txn_id) = log.validate()?;
    let op = log.op_name();

    manager.put_txn_log(Arc::new(log))?;
    println!("Wrote {op} log {txn_id} for {tablet_id}");
    Ok(())
}

/// Runs the publish command.
pub fn publish(
    manager: &TabletManager,
    tablet: u64,
    base: u64,
    new: Option<u64>,
    txns: &[u64],
) -> CmdResult {
    let tablet_id = TabletId::new(tablet);
    let base = Version::new(base);
    let new = new.map_or_else(|| base.next(), Version::new);
    let txns: Vec<TxnId> = txns.iter().copied().map(TxnId::new).collect();
    info!("Publishing {} {} from {} with {} logs", tablet_id, new, base, txns.len());

    match manager.publish_version(tablet_id, base, new, &txns)? {
        PublishOutcome::Published => {
            println!("Published {tablet_id} {new} from {base} ({} logs)", txns.len());
        }
        PublishOutcome::AlreadyPublished => {
            println!("{tablet_id} {new} was already published");
        }
    }
    Ok(())
}
