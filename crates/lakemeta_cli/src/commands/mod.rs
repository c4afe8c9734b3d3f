//! CLI command implementations.

pub mod compact;
pub mod list;
pub mod show;
pub mod tablet;
pub mod txn;

use lakemeta_core::{FixedLocationProvider, ManagerConfig, SchemaRegistry, TabletManager};
use lakemeta_storage::LocalBlobStore;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Result type shared by the commands.
pub type CmdResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Opens a manager over the metadata kept under `root`.
///
/// The CLI runs one command per process, so the metadata cache is disabled.
pub fn open(root: &Path) -> CmdResult<Arc<TabletManager>> {
    if !root.is_dir() {
        return Err(format!("No metadata directory at {}", root.display()).into());
    }
    let root = root
        .to_str()
        .ok_or_else(|| format!("Root path is not valid UTF-8: {}", root.display()))?;
    debug!(root, "opening metadata directory");
    Ok(Arc::new(TabletManager::new(
        ManagerConfig::default().metacache_capacity(0),
        Arc::new(LocalBlobStore::new()),
        Arc::new(FixedLocationProvider::new(root)),
        Arc::new(SchemaRegistry::new()),
    )))
}

/// Returns true if `format` asks for JSON output.
pub(crate) fn is_json(format: &str) -> bool {
    format.eq_ignore_ascii_case("json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lakemeta_core::{TabletId, TxnId, Version};
    use std::fs;

    const SCHEMA: &str = r#"{
        "id": 77,
        "keys_type": "Duplicate",
        "columns": [
            {"unique_id": 0, "name": "k", "type_name": "BIGINT", "is_key": true},
            {"unique_id": 1, "name": "v", "type_name": "VARCHAR", "is_key": false}
        ]
    }"#;

    const WRITE_LOG: &str = r#"{
        "tablet_id": 3,
        "txn_id": 10,
        "op": {"Write": {"rowset": {
            "id": 0,
            "overlapped": false,
            "segments": ["a.dat"],
            "num_rows": 5,
            "data_size": 512
        }}}
    }"#;

    #[test]
    fn open_requires_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(open(&dir.path().join("missing")).is_err());
        assert!(open(dir.path()).is_ok());
    }

    #[test]
    fn create_put_log_publish() {
        let dir = tempfile::tempdir().unwrap();
        let schema_path = dir.path().join("schema.json");
        let log_path = dir.path().join("log.json");
        fs::write(&schema_path, SCHEMA).unwrap();
        fs::write(&log_path, WRITE_LOG).unwrap();
        let root = dir.path().join("lake");
        fs::create_dir(&root).unwrap();
        let manager = open(&root).unwrap();

        tablet::create(&manager, 3, &schema_path).unwrap();
        txn::put_log(&manager, &log_path).unwrap();
        txn::publish(&manager, 3, 1, None, &[10]).unwrap();

        let metadata = manager
            .get_tablet_metadata(TabletId::new(3), Version::new(2))
            .unwrap();
        assert_eq!(metadata.num_rows(), 5);
        assert_eq!(metadata.schema.id, 77);
        assert!(manager
            .get_txn_log(TabletId::new(3), TxnId::new(10))
            .unwrap_err()
            .is_not_found());

        show::run(&manager, 3, 2, "json").unwrap();
        list::run(&manager, None, false, "text").unwrap();
        compact::run(&manager, 3, 2, 11, "text").unwrap();

        tablet::drop_tablet(&manager, 3).unwrap();
        assert!(manager
            .get_tablet_metadata(TabletId::new(3), Version::INITIAL)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn invalid_requests_fail() {
        let dir = tempfile::tempdir().unwrap();
        let schema_path = dir.path().join("schema.json");
        fs::write(&schema_path, SCHEMA).unwrap();
        let manager = open(dir.path()).unwrap();

        tablet::create(&manager, 4, &schema_path).unwrap();
        assert!(txn::publish(&manager, 4, 1, Some(1), &[]).is_err());
        assert!(show::run(&manager, 4, 9, "text").is_err());
    }
}
