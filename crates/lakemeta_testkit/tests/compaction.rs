//! Compaction planning and folding through publish.

use lakemeta_core::{
    RowsetId, TabletId, TabletMetadata, TxnId, TxnLog, Version,
};
use lakemeta_testkit::prelude::*;
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

const TABLET: TabletId = TabletId::new(7);

fn ids(metadata: &TabletMetadata) -> Vec<u32> {
    metadata.rowsets.iter().map(|r| r.id.as_u32()).collect()
}

#[test]
fn task_round_trip_through_publish() {
    let (fixture, version) = scenarios::tablet_with_loads(TABLET.as_u64(), 4);
    let task = fixture.compact(TABLET, version, TxnId::new(500)).unwrap();
    assert_eq!(task.input_rowsets().len(), 4);
    assert_eq!(task.input_rows(), 40);
    for rowset in task.input_rowsets() {
        let locations = rowset.segment_locations();
        assert_eq!(locations.len(), 1);
        assert!(locations[0].starts_with(fixture.root()));
    }

    let output = RowsetBuilder::new().segments(2).rows(40).build();
    fixture
        .put_txn_log(Arc::new(task.to_txn_log(Some(output))))
        .unwrap();
    fixture
        .publish_version(TABLET, version, version.next(), &[task.txn_id()])
        .unwrap();

    let metadata = fixture.get_tablet_metadata(TABLET, version.next()).unwrap();
    assert_eq!(ids(&metadata), vec![5]);
    assert_eq!(metadata.next_rowset_id, 7);
    assert_eq!(metadata.num_rows(), 40);
}

#[test]
fn stale_compaction_fails_and_keeps_snapshot() {
    let (fixture, version) = scenarios::tablet_with_loads(TABLET.as_u64(), 3);
    let log = TxnLog::compaction(
        TABLET,
        TxnId::new(500),
        vec![RowsetId::new(1), RowsetId::new(3)],
        Some(RowsetBuilder::new().build()),
    );
    fixture.put_txn_log(Arc::new(log)).unwrap();

    let err = fixture
        .publish_version(TABLET, version, version.next(), &[TxnId::new(500)])
        .unwrap_err();
    assert!(err.is_internal());
    assert!(fixture
        .get_tablet_metadata(TABLET, version.next())
        .unwrap_err()
        .is_not_found());
    assert_eq!(ids(&fixture.get_tablet_metadata(TABLET, version).unwrap()), vec![1, 2, 3]);
    assert!(fixture.get_txn_log(TABLET, TxnId::new(500)).is_ok());
}

#[test]
fn empty_logs_publish_as_noop() {
    let (fixture, version) = scenarios::tablet_with_loads(TABLET.as_u64(), 1);
    fixture.put_write_log(TABLET, 600, RowsetBuilder::new().rows(0).build());
    fixture
        .put_txn_log(Arc::new(TxnLog::compaction(TABLET, TxnId::new(601), vec![], None)))
        .unwrap();

    fixture
        .publish_version(TABLET, version, version.next(), &[TxnId::new(600), TxnId::new(601)])
        .unwrap();

    let before = fixture.get_tablet_metadata(TABLET, version).unwrap();
    let after = fixture.get_tablet_metadata(TABLET, version.next()).unwrap();
    assert_eq!(after.rowsets, before.rowsets);
    assert_eq!(after.next_rowset_id, before.next_rowset_id);
    assert_eq!(after.version, version.next());
}

#[test]
fn compact_missing_version_is_not_found() {
    let fixture = TestManager::memory();
    fixture.create_tablet(TABLET.as_u64());
    let err = fixture.compact(TABLET, Version::new(5), TxnId::new(1)).unwrap_err();
    assert!(err.is_not_found());
}

proptest! {
    #![proptest_config(PropTestConfig::quick().to_proptest_config())]

    #[test]
    fn published_rowset_ids_are_never_reused(
        steps in prop::collection::vec(history_step_strategy(), 1..24)
    ) {
        let fixture = TestManager::memory();
        fixture.create_tablet(TABLET.as_u64());
        let mut version = Version::INITIAL;
        let mut seen: HashSet<u32> = HashSet::new();
        let mut next_id = 1;

        for (txn, step) in (1u64..).zip(steps) {
            let current = fixture.get_tablet_metadata(TABLET, version).unwrap();
            let log = match step {
                HistoryStep::Write(rowset) => TxnLog::write(TABLET, TxnId::new(txn), rowset),
                HistoryStep::Compact { start, len, output } => {
                    let inputs: Vec<RowsetId> = current
                        .rowsets
                        .iter()
                        .skip(start)
                        .take(len)
                        .map(|r| r.id)
                        .collect();
                    let output = (!inputs.is_empty()).then_some(output);
                    TxnLog::compaction(TABLET, TxnId::new(txn), inputs, output)
                }
            };
            fixture.put_txn_log(Arc::new(log)).unwrap();
            fixture
                .publish_version(TABLET, version, version.next(), &[TxnId::new(txn)])
                .unwrap();
            version = version.next();

            let published = fixture.get_tablet_metadata(TABLET, version).unwrap();
            prop_assert!(published.next_rowset_id >= next_id);
            for id in ids(&published) {
                prop_assert!(id < published.next_rowset_id);
                if id >= next_id {
                    prop_assert!(seen.insert(id), "rowset id {} reused", id);
                }
            }
            next_id = published.next_rowset_id;
        }
    }
}
