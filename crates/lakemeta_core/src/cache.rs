//! Byte-budgeted metadata cache.
//!
//! Holds shared, immutable snapshots, transaction logs and schemas keyed
//! by blob location (or the synthetic `schema_{tablet_id}` key). Capacity
//! is a byte budget: each entry carries a charge and the least recently
//! used entries are evicted until the new entry fits.
//!
//! The cache is advisory. A rejected insert means "not cached" and is
//! never an error; eviction drops the cache's reference only.

use crate::metadata::TabletMetadata;
use crate::schema::TabletSchema;
use crate::txn_log::TxnLog;
use lru::LruCache;
use parking_lot::Mutex;
use std::sync::Arc;

/// A value held by the [`MetaCache`].
#[derive(Debug, Clone)]
pub enum CacheValue {
    /// A tablet snapshot.
    Metadata(Arc<TabletMetadata>),
    /// An interned tablet schema.
    Schema(Arc<TabletSchema>),
    /// A pending transaction log.
    TxnLog(Arc<TxnLog>),
}

impl CacheValue {
    /// Returns the snapshot, if this is one.
    #[must_use]
    pub fn as_metadata(&self) -> Option<&Arc<TabletMetadata>> {
        match self {
            Self::Metadata(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the schema, if this is one.
    #[must_use]
    pub fn as_schema(&self) -> Option<&Arc<TabletSchema>> {
        match self {
            Self::Schema(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the transaction log, if this is one.
    #[must_use]
    pub fn as_txn_log(&self) -> Option<&Arc<TxnLog>> {
        match self {
            Self::TxnLog(l) => Some(l),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Entry {
    value: CacheValue,
    charge: usize,
}

#[derive(Debug)]
struct Inner {
    entries: LruCache<String, Entry>,
    usage: usize,
}

/// An LRU cache bounded by the total charge of its entries.
#[derive(Debug)]
pub struct MetaCache {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl MetaCache {
    /// Creates a cache with a byte budget of `capacity`. Zero disables it.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::unbounded(),
                usage: 0,
            }),
            capacity,
        }
    }

    /// Returns the entry under `key` and marks it recently used.
    pub fn lookup(&self, key: &str) -> Option<CacheValue> {
        self.inner.lock().entries.get(key).map(|e| e.value.clone())
    }

    /// Inserts `value` under `key`, replacing any previous entry.
    ///
    /// Returns false if the entry cannot fit the budget at all; the cache
    /// is left without an entry for `key` in that case.
    pub fn insert(&self, key: impl Into<String>, value: CacheValue, charge: usize) -> bool {
        let key = key.into();
        let mut inner = self.inner.lock();
        if let Some(old) = inner.entries.pop(&key) {
            inner.usage -= old.charge;
        }
        if self.capacity == 0 || charge > self.capacity {
            return false;
        }
        while inner.usage + charge > self.capacity {
            match inner.entries.pop_lru() {
                Some((_, evicted)) => inner.usage -= evicted.charge,
                None => break,
            }
        }
        inner.usage += charge;
        inner.entries.put(key, Entry { value, charge });
        true
    }

    /// Removes the entry under `key`, if any.
    pub fn erase(&self, key: &str) {
        let mut inner = self.inner.lock();
        if let Some(old) = inner.entries.pop(key) {
            inner.usage -= old.charge;
        }
    }

    /// Removes every entry.
    pub fn prune(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.usage = 0;
    }

    /// Total charge of the current entries.
    #[must_use]
    pub fn usage(&self) -> usize {
        self.inner.lock().usage
    }

    /// The byte budget.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Returns true if the cache holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
