//! Transaction log store.

use super::list::TxnLogIter;
use super::TabletManager;
use crate::cache::CacheValue;
use crate::error::{CoreError, CoreResult};
use crate::location::{txn_log_prefix, TXN_LOG_PREFIX};
use crate::txn_log::TxnLog;
use crate::types::{TabletId, TxnId};
use lakemeta_codec::{Decode, Encode};
use std::sync::Arc;

impl TabletManager {
    /// Returns the txn log `(tablet_id, txn_id)`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the blob is absent, `Corruption` if it cannot be
    /// parsed, or a storage error.
    pub fn get_txn_log(&self, tablet_id: TabletId, txn_id: TxnId) -> CoreResult<Arc<TxnLog>> {
        let location = self.locations().txn_log_location(tablet_id, txn_id);
        self.get_txn_log_at(&location, true)
    }

    /// Returns the txn log stored at `location`, optionally caching it.
    ///
    /// # Errors
    ///
    /// Same as [`TabletManager::get_txn_log`].
    pub fn get_txn_log_at(&self, location: &str, fill_cache: bool) -> CoreResult<Arc<TxnLog>> {
        if let Some(log) = self.lookup_txn_log(location) {
            return Ok(log);
        }
        let bytes = self.read_blob(location)?;
        self.stats_ref().record_txn_log_read();
        let log = TxnLog::decode(&bytes)
            .map_err(|e| CoreError::corruption(format!("failed to parse {location}: {e}")))?;
        let log = Arc::new(log);
        if fill_cache {
            self.fill_metacache(location, CacheValue::TxnLog(Arc::clone(&log)), bytes.len());
        }
        Ok(log)
    }

    /// Persists `log` and caches it.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` without writing anything if the log lacks its
    /// tablet id or txn id; otherwise encoding and store failures.
    pub fn put_txn_log(&self, log: Arc<TxnLog>) -> CoreResult<()> {
        let (tablet_id, txn_id) = log.validate()?;
        let location = self.locations().txn_log_location(tablet_id, txn_id);
        let bytes = log.encode().map_err(CoreError::Codec)?;
        self.store()
            .write_blob(&location, &bytes, self.write_options())?;
        self.stats_ref().record_txn_log_write();
        self.fill_metacache(&location, CacheValue::TxnLog(log), bytes.len());
        Ok(())
    }

    /// Evicts and deletes the txn log `(tablet_id, txn_id)`.
    ///
    /// # Errors
    ///
    /// Propagates the store's delete failure, including `NotFound`.
    pub fn delete_txn_log(&self, tablet_id: TabletId, txn_id: TxnId) -> CoreResult<()> {
        let location = self.locations().txn_log_location(tablet_id, txn_id);
        self.erase_metacache(&location);
        self.store().delete_blob(&location)?;
        self.stats_ref().record_txn_log_delete();
        Ok(())
    }

    /// Lists txn logs of `tablet_id`, or every txn log under the tablet's
    /// root if `filter_by_tablet` is false.
    ///
    /// # Errors
    ///
    /// Propagates directory enumeration failures.
    pub fn list_txn_logs(
        &self,
        tablet_id: TabletId,
        filter_by_tablet: bool,
    ) -> CoreResult<TxnLogIter<'_>> {
        let root = self.locations().root_location(tablet_id);
        let prefix = if filter_by_tablet {
            txn_log_prefix(tablet_id)
        } else {
            TXN_LOG_PREFIX.to_string()
        };
        let locations = self.list_locations(&root, &prefix)?;
        Ok(TxnLogIter::new(self, locations, Self::get_txn_log_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::RowsetMetadata;
    use lakemeta_storage::BlobStore;

    fn write_log(tablet: u64, txn: u64) -> Arc<TxnLog> {
        let rowset = RowsetMetadata::new(vec![format!("{txn}.dat")], 10, 100);
        Arc::new(TxnLog::write(TabletId::new(tablet), TxnId::new(txn), rowset))
    }

    #[test]
    fn put_get_delete() {
        let manager = TabletManager::open_in_memory();
        let log = write_log(7, 100);
        manager.put_txn_log(Arc::clone(&log)).unwrap();

        let loaded = manager.get_txn_log(TabletId::new(7), TxnId::new(100)).unwrap();
        assert_eq!(*loaded, *log);

        manager.delete_txn_log(TabletId::new(7), TxnId::new(100)).unwrap();
        assert!(manager
            .get_txn_log(TabletId::new(7), TxnId::new(100))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn put_rejects_missing_identity_without_writing() {
        let manager = TabletManager::open_in_memory();
        let mut log = (*write_log(7, 100)).clone();
        log.txn_id = None;

        let err = manager.put_txn_log(Arc::new(log)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument { .. }));
        let mut written = 0;
        manager
            .store()
            .iterate_dir("lake", &mut |_| {
                written += 1;
                true
            })
            .unwrap();
        assert_eq!(written, 0);
        assert_eq!(manager.stats().txn_log_writes, 0);
    }

    #[test]
    fn uncached_read_parses_blob() {
        let manager = TabletManager::open_in_memory();
        manager.put_txn_log(write_log(7, 100)).unwrap();
        manager.prune_metacache();

        let loaded = manager.get_txn_log(TabletId::new(7), TxnId::new(100)).unwrap();
        assert_eq!(loaded.op_name(), "write");
        assert_eq!(manager.stats().txn_log_reads, 1);
        assert!(manager
            .lookup_txn_log(&manager.locations().txn_log_location(TabletId::new(7), TxnId::new(100)))
            .is_some());
    }

    #[test]
    fn list_txn_logs_in_txn_order() {
        let manager = TabletManager::open_in_memory();
        for txn in [300, 100, 200] {
            manager.put_txn_log(write_log(7, txn)).unwrap();
        }
        manager.put_txn_log(write_log(9, 1)).unwrap();

        let txns: Vec<u64> = manager
            .list_txn_logs(TabletId::new(7), true)
            .unwrap()
            .map(|log| log.unwrap().txn_id.unwrap().as_u64())
            .collect();
        assert_eq!(txns, vec![100, 200, 300]);
        assert_eq!(manager.list_txn_logs(TabletId::new(7), false).unwrap().len(), 4);
    }
}
