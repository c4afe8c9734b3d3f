//! Property-based test generators using proptest.
//!
//! Provides strategies for rowsets, txn logs and operation sequences over
//! a tablet.

use lakemeta_core::{RowsetMetadata, TabletId, TxnId, TxnLog};
use proptest::prelude::*;

/// Strategy for tablet ids.
pub fn tablet_id_strategy() -> impl Strategy<Value = TabletId> {
    (1u64..10_000).prop_map(TabletId::new)
}

/// Strategy for unassigned rowsets, including empty ones and rowsets
/// without segments.
pub fn rowset_strategy() -> impl Strategy<Value = RowsetMetadata> {
    (
        prop::collection::vec("[a-z0-9]{4,12}\\.dat", 0..4),
        prop_oneof![1 => Just(0u64), 4 => 1u64..10_000],
        0u64..1_000_000,
    )
        .prop_map(|(segments, rows, size)| RowsetMetadata::new(segments, rows, size))
}

/// Strategy for write logs of `tablet_id`.
pub fn write_log_strategy(tablet_id: TabletId) -> impl Strategy<Value = TxnLog> {
    (any::<u64>(), rowset_strategy())
        .prop_map(move |(txn, rowset)| TxnLog::write(tablet_id, TxnId::new(txn), rowset))
}

/// One step of a tablet history.
#[derive(Debug, Clone)]
pub enum HistoryStep {
    /// Load a rowset.
    Write(RowsetMetadata),
    /// Compact `len` rowsets starting at position `start` (both clamped to
    /// the current rowset list).
    Compact {
        /// First input position.
        start: usize,
        /// Number of inputs.
        len: usize,
        /// Merge result.
        output: RowsetMetadata,
    },
}

/// Strategy for a history step.
pub fn history_step_strategy() -> impl Strategy<Value = HistoryStep> {
    prop_oneof![
        3 => rowset_strategy().prop_map(HistoryStep::Write),
        1 => (0usize..8, 1usize..4, rowset_strategy())
            .prop_map(|(start, len, output)| HistoryStep::Compact { start, len, output }),
    ]
}

/// Operations against the metadata store, used to compare cached and
/// uncached managers.
#[derive(Debug, Clone)]
pub enum StoreOp {
    /// Put a snapshot with `rows` rows at `version`.
    Put {
        /// Version to write.
        version: u64,
        /// Rows in its single rowset.
        rows: u64,
    },
    /// Read `version`.
    Get {
        /// Version to read.
        version: u64,
    },
    /// Delete `version`.
    Delete {
        /// Version to delete.
        version: u64,
    },
    /// Evict `version` from the cache only.
    Evict {
        /// Version to evict.
        version: u64,
    },
    /// Drop every cache entry.
    Prune,
}

/// Strategy for store operations over a small version range.
pub fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        3 => (1u64..6, 0u64..100).prop_map(|(version, rows)| StoreOp::Put { version, rows }),
        4 => (1u64..6).prop_map(|version| StoreOp::Get { version }),
        1 => (1u64..6).prop_map(|version| StoreOp::Delete { version }),
        1 => (1u64..6).prop_map(|version| StoreOp::Evict { version }),
        1 => Just(StoreOp::Prune),
    ]
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn generated_rowsets_are_unassigned(rowset in rowset_strategy()) {
            prop_assert_eq!(rowset.id.as_u32(), 0);
            prop_assert!(rowset.num_segments() < 4);
        }

        #[test]
        fn generated_write_logs_validate(log in write_log_strategy(TabletId::new(7))) {
            let (tablet, _) = log.validate().unwrap();
            prop_assert_eq!(tablet, TabletId::new(7));
        }
    }
}
