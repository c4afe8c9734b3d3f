//! Blob naming.
//!
//! A [`LocationProvider`] maps tablet identities to blob paths. Snapshot
//! and log names embed the tablet id as a fixed-width hex prefix so a
//! prefix scan of a directory finds one tablet's blobs.

use crate::types::{TabletId, TxnId, Version};

/// Prefix shared by every snapshot blob name.
pub const TABLET_METADATA_PREFIX: &str = "tbl_";
/// Prefix shared by every txn log blob name.
pub const TXN_LOG_PREFIX: &str = "txn_";

/// Maps tablet identities to blob locations.
pub trait LocationProvider: Send + Sync {
    /// Directory holding the blobs of `tablet_id`.
    fn root_location(&self, tablet_id: TabletId) -> String;

    /// Location of the snapshot `(tablet_id, version)`.
    fn tablet_metadata_location(&self, tablet_id: TabletId, version: Version) -> String {
        join_path(
            &self.root_location(tablet_id),
            &tablet_metadata_filename(tablet_id, version),
        )
    }

    /// Location of the txn log `(tablet_id, txn_id)`.
    fn txn_log_location(&self, tablet_id: TabletId, txn_id: TxnId) -> String {
        join_path(
            &self.root_location(tablet_id),
            &txn_log_filename(tablet_id, txn_id),
        )
    }

    /// Location of a segment file of `tablet_id`.
    fn segment_location(&self, tablet_id: TabletId, segment_name: &str) -> String {
        join_path(&self.root_location(tablet_id), segment_name)
    }
}

/// Places every tablet under one root directory.
#[derive(Debug, Clone)]
pub struct FixedLocationProvider {
    root: String,
}

impl FixedLocationProvider {
    /// Creates a provider rooted at `root`.
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    /// The shared root.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }
}

impl LocationProvider for FixedLocationProvider {
    fn root_location(&self, _tablet_id: TabletId) -> String {
        self.root.clone()
    }
}

/// Joins a directory and a file name with a single separator.
#[must_use]
pub fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Snapshot blob name, `tbl_{tablet:016X}_{version:016X}`.
#[must_use]
pub fn tablet_metadata_filename(tablet_id: TabletId, version: Version) -> String {
    format!(
        "{}{:016X}",
        tablet_metadata_prefix(tablet_id),
        version.as_u64()
    )
}

/// Txn log blob name, `txn_{tablet:016X}_{txn:016X}`.
#[must_use]
pub fn txn_log_filename(tablet_id: TabletId, txn_id: TxnId) -> String {
    format!("{}{:016X}", txn_log_prefix(tablet_id), txn_id.as_u64())
}

/// Name prefix of the snapshots of one tablet.
#[must_use]
pub fn tablet_metadata_prefix(tablet_id: TabletId) -> String {
    format!("{TABLET_METADATA_PREFIX}{:016X}_", tablet_id.as_u64())
}

/// Name prefix of the txn logs of one tablet.
#[must_use]
pub fn txn_log_prefix(tablet_id: TabletId) -> String {
    format!("{TXN_LOG_PREFIX}{:016X}_", tablet_id.as_u64())
}

fn parse_name(name: &str, prefix: &str) -> Option<(u64, u64)> {
    let rest = name.strip_prefix(prefix)?;
    let (tablet, second) = rest.split_once('_')?;
    if tablet.len() != 16 || second.len() != 16 {
        return None;
    }
    let tablet = u64::from_str_radix(tablet, 16).ok()?;
    let second = u64::from_str_radix(second, 16).ok()?;
    Some((tablet, second))
}

/// Parses a snapshot blob name back into its identity.
#[must_use]
pub fn parse_tablet_metadata_filename(name: &str) -> Option<(TabletId, Version)> {
    parse_name(name, TABLET_METADATA_PREFIX).map(|(t, v)| (TabletId::new(t), Version::new(v)))
}

/// Parses a txn log blob name back into its identity.
#[must_use]
pub fn parse_txn_log_filename(name: &str) -> Option<(TabletId, TxnId)> {
    parse_name(name, TXN_LOG_PREFIX).map(|(t, x)| (TabletId::new(t), TxnId::new(x)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_fixed_width_hex() {
        assert_eq!(
            tablet_metadata_filename(TabletId::new(7), Version::new(2)),
            "tbl_0000000000000007_0000000000000002"
        );
        assert_eq!(
            txn_log_filename(TabletId::new(255), TxnId::new(100)),
            "txn_00000000000000FF_0000000000000064"
        );
        assert_eq!(tablet_metadata_prefix(TabletId::new(7)), "tbl_0000000000000007_");
    }

    #[test]
    fn provider_joins_root() {
        let provider = FixedLocationProvider::new("/data/lake");
        assert_eq!(
            provider.tablet_metadata_location(TabletId::new(1), Version::new(1)),
            "/data/lake/tbl_0000000000000001_0000000000000001"
        );
        assert_eq!(
            provider.segment_location(TabletId::new(1), "seg.dat"),
            "/data/lake/seg.dat"
        );
    }

    #[test]
    fn join_path_handles_separators() {
        assert_eq!(join_path("", "a"), "a");
        assert_eq!(join_path("root/", "a"), "root/a");
        assert_eq!(join_path("root", "a"), "root/a");
    }

    #[test]
    fn names_parse_back() {
        let name = tablet_metadata_filename(TabletId::new(9), Version::new(12));
        assert_eq!(
            parse_tablet_metadata_filename(&name),
            Some((TabletId::new(9), Version::new(12)))
        );
        let name = txn_log_filename(TabletId::new(9), TxnId::new(77));
        assert_eq!(
            parse_txn_log_filename(&name),
            Some((TabletId::new(9), TxnId::new(77)))
        );
        assert!(parse_tablet_metadata_filename("tbl_xyz").is_none());
        assert!(parse_txn_log_filename(&tablet_metadata_filename(TabletId::new(1), Version::new(1))).is_none());
    }
}
