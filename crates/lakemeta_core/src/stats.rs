//! Tablet manager statistics.
//!
//! All counters are atomic and can be read while operations are in
//! progress. Values only grow.
//!
//! # Usage
//!
//! ```rust,ignore
//! let manager = TabletManager::open_in_memory();
//!
//! // Perform operations...
//! manager.publish_version(tablet, base, new, &txns)?;
//!
//! let stats = manager.stats();
//! println!("Publishes: {}", stats.publishes);
//! println!("Cache hits: {}", stats.cache_hits);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by a [`crate::TabletManager`].
#[derive(Debug, Default)]
pub struct ManagerStats {
    // Cache counters
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    cache_rejected_inserts: AtomicU64,

    // Snapshot counters
    metadata_reads: AtomicU64,
    metadata_writes: AtomicU64,
    metadata_deletes: AtomicU64,

    // Txn log counters
    txn_log_reads: AtomicU64,
    txn_log_writes: AtomicU64,
    txn_log_deletes: AtomicU64,

    // Publish counters
    publishes: AtomicU64,
    publish_short_circuits: AtomicU64,
    publish_failures: AtomicU64,
}

impl ManagerStats {
    /// Creates a zeroed stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cache_rejected(&self) {
        self.cache_rejected_inserts.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a snapshot blob read from the store.
    pub(crate) fn record_metadata_read(&self) {
        self.metadata_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_metadata_write(&self) {
        self.metadata_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_metadata_delete(&self) {
        self.metadata_deletes.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a txn log blob read from the store.
    pub(crate) fn record_txn_log_read(&self) {
        self.txn_log_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_txn_log_write(&self) {
        self.txn_log_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_txn_log_delete(&self) {
        self.txn_log_deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_publish(&self) {
        self.publishes.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a publish that succeeded through an existence check.
    pub(crate) fn record_publish_short_circuit(&self) {
        self.publish_short_circuits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_publish_failure(&self) {
        self.publish_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of cache hits.
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// Returns the number of cache misses.
    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cache_hits: self.cache_hits(),
            cache_misses: self.cache_misses(),
            cache_rejected_inserts: self.cache_rejected_inserts.load(Ordering::Relaxed),
            metadata_reads: self.metadata_reads.load(Ordering::Relaxed),
            metadata_writes: self.metadata_writes.load(Ordering::Relaxed),
            metadata_deletes: self.metadata_deletes.load(Ordering::Relaxed),
            txn_log_reads: self.txn_log_reads.load(Ordering::Relaxed),
            txn_log_writes: self.txn_log_writes.load(Ordering::Relaxed),
            txn_log_deletes: self.txn_log_deletes.load(Ordering::Relaxed),
            publishes: self.publishes.load(Ordering::Relaxed),
            publish_short_circuits: self.publish_short_circuits.load(Ordering::Relaxed),
            publish_failures: self.publish_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`ManagerStats`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Cache lookups that found an entry.
    pub cache_hits: u64,
    /// Cache lookups that found nothing.
    pub cache_misses: u64,
    /// Inserts the cache refused for lack of budget.
    pub cache_rejected_inserts: u64,
    /// Snapshot blobs read from the store.
    pub metadata_reads: u64,
    /// Snapshot blobs written.
    pub metadata_writes: u64,
    /// Snapshot blobs deleted.
    pub metadata_deletes: u64,
    /// Txn log blobs read from the store.
    pub txn_log_reads: u64,
    /// Txn log blobs written.
    pub txn_log_writes: u64,
    /// Txn log blobs deleted.
    pub txn_log_deletes: u64,
    /// Publishes that persisted a new snapshot.
    pub publishes: u64,
    /// Publishes answered by the idempotency checks.
    pub publish_short_circuits: u64,
    /// Publishes that returned an error.
    pub publish_failures: u64,
}

impl StatsSnapshot {
    /// Fraction of cache lookups that hit, if any lookup happened.
    #[must_use]
    pub fn cache_hit_rate(&self) -> Option<f64> {
        let total = self.cache_hits.saturating_add(self.cache_misses);
        if total == 0 {
            return None;
        }
        Some(self.cache_hits as f64 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stats_are_zero() {
        let stats = ManagerStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
        assert!(stats.snapshot().cache_hit_rate().is_none());
    }

    #[test]
    fn snapshot_reflects_records() {
        let stats = ManagerStats::new();
        stats.record_cache_hit();
        stats.record_cache_hit();
        stats.record_cache_miss();
        stats.record_metadata_write();
        stats.record_publish();
        stats.record_publish_short_circuit();

        let snap = stats.snapshot();
        assert_eq!(snap.cache_hits, 2);
        assert_eq!(snap.cache_misses, 1);
        assert_eq!(snap.metadata_writes, 1);
        assert_eq!(snap.publishes, 1);
        assert_eq!(snap.publish_short_circuits, 1);
        let rate = snap.cache_hit_rate().unwrap();
        assert!((rate - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn concurrent_updates() {
        use std::sync::Arc;
        use std::thread;

        let stats = Arc::new(ManagerStats::new());
        let mut handles = vec![];

        for _ in 0..8 {
            let s = Arc::clone(&stats);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    s.record_txn_log_read();
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(stats.snapshot().txn_log_reads, 800);
    }
}
