//! Tablet snapshot model.
//!
//! A [`TabletMetadata`] is an immutable, versioned description of a
//! tablet: its schema and the ordered list of rowsets visible at that
//! version. Snapshots are never modified after they are persisted; a
//! change always produces a snapshot with a new version.
//!
//! ## Invariants
//!
//! - `(id, version)` identifies a snapshot; two persisted snapshots with
//!   the same identity are byte-identical
//! - Rowset ids are unique within a snapshot and below `next_rowset_id`
//! - Rowset order is write/compaction history and is load-bearing

use crate::schema::TabletSchema;
use crate::types::{RowsetId, TabletId, Version};
use lakemeta_codec::Message;
use serde::{Deserialize, Serialize};

/// A group of column segments written together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowsetMetadata {
    /// Assigned when the rowset is folded into a snapshot.
    pub id: RowsetId,
    /// Whether the segments may hold overlapping key ranges.
    pub overlapped: bool,
    /// Segment file names, in order.
    pub segments: Vec<String>,
    /// Number of rows across all segments.
    pub num_rows: u64,
    /// Total size of the segment files in bytes.
    pub data_size: u64,
}

impl RowsetMetadata {
    /// Creates an unassigned rowset from its segment files.
    #[must_use]
    pub fn new(segments: Vec<String>, num_rows: u64, data_size: u64) -> Self {
        Self {
            id: RowsetId::new(0),
            overlapped: segments.len() > 1,
            segments,
            num_rows,
            data_size,
        }
    }

    /// Returns true if the rowset holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    /// Returns the number of segment files.
    #[must_use]
    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    /// Number of ids this rowset reserves from `next_rowset_id`.
    ///
    /// One per segment, and at least one so an id is never handed out twice.
    #[must_use]
    pub fn id_span(&self) -> u32 {
        u32::try_from(self.segments.len()).unwrap_or(u32::MAX).max(1)
    }
}

/// An immutable, versioned snapshot of a tablet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabletMetadata {
    /// The tablet this snapshot describes.
    pub id: TabletId,
    /// Snapshot version.
    pub version: Version,
    /// Next rowset id to assign. Only ever grows.
    pub next_rowset_id: u32,
    /// Tablet schema.
    pub schema: TabletSchema,
    /// Visible rowsets in history order.
    pub rowsets: Vec<RowsetMetadata>,
}

impl Message for TabletMetadata {
    const KIND: &'static str = "tablet metadata";
}

impl TabletMetadata {
    /// Creates the initial snapshot of a new tablet.
    #[must_use]
    pub fn new(id: TabletId, schema: TabletSchema) -> Self {
        Self {
            id,
            version: Version::INITIAL,
            next_rowset_id: 1,
            schema,
            rowsets: Vec::new(),
        }
    }

    /// Returns the position of the rowset with `id`.
    #[must_use]
    pub fn rowset_position(&self, id: RowsetId) -> Option<usize> {
        self.rowsets.iter().position(|r| r.id == id)
    }

    /// Returns the rowset with `id`.
    #[must_use]
    pub fn rowset(&self, id: RowsetId) -> Option<&RowsetMetadata> {
        self.rowsets.iter().find(|r| r.id == id)
    }

    /// Total rows across visible rowsets.
    #[must_use]
    pub fn num_rows(&self) -> u64 {
        self.rowsets.iter().map(|r| r.num_rows).sum()
    }

    /// Total data size across visible rowsets.
    #[must_use]
    pub fn data_size(&self) -> u64 {
        self.rowsets.iter().map(|r| r.data_size).sum()
    }

    /// Total segment files across visible rowsets.
    #[must_use]
    pub fn num_segments(&self) -> usize {
        self.rowsets.iter().map(RowsetMetadata::num_segments).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnSchema, KeysType};
    use lakemeta_codec::{Decode, Encode};

    fn schema() -> TabletSchema {
        TabletSchema::new(1, KeysType::Duplicate, vec![ColumnSchema::key(0, "k", "INT")])
    }

    fn rowset(id: u32, rows: u64) -> RowsetMetadata {
        RowsetMetadata {
            id: RowsetId::new(id),
            ..RowsetMetadata::new(vec![format!("seg_{id}.dat")], rows, rows * 10)
        }
    }

    #[test]
    fn new_tablet_starts_at_version_one() {
        let metadata = TabletMetadata::new(TabletId::new(7), schema());
        assert_eq!(metadata.version, Version::INITIAL);
        assert_eq!(metadata.next_rowset_id, 1);
        assert!(metadata.rowsets.is_empty());
    }

    #[test]
    fn rowset_lookup_and_totals() {
        let mut metadata = TabletMetadata::new(TabletId::new(7), schema());
        metadata.rowsets = vec![rowset(1, 5), rowset(2, 7)];

        assert_eq!(metadata.rowset_position(RowsetId::new(2)), Some(1));
        assert!(metadata.rowset(RowsetId::new(3)).is_none());
        assert_eq!(metadata.num_rows(), 12);
        assert_eq!(metadata.data_size(), 120);
        assert_eq!(metadata.num_segments(), 2);
    }

    #[test]
    fn id_span_is_at_least_one() {
        let no_segments = RowsetMetadata::new(vec![], 3, 0);
        let three = RowsetMetadata::new(vec!["a".into(), "b".into(), "c".into()], 3, 0);
        assert_eq!(no_segments.id_span(), 1);
        assert_eq!(three.id_span(), 3);
        assert!(three.overlapped);
    }

    #[test]
    fn snapshot_encoding_is_stable() {
        let mut metadata = TabletMetadata::new(TabletId::new(7), schema());
        metadata.rowsets = vec![rowset(1, 5)];

        let first = metadata.encode().unwrap();
        let second = metadata.clone().encode().unwrap();
        assert_eq!(first, second);
        assert_eq!(TabletMetadata::decode(&first).unwrap(), metadata);
    }
}
