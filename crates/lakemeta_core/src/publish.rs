//! Version publish.
//!
//! Publishing folds an ordered list of txn logs into a base snapshot and
//! persists the result as a new version. There is no lock: concurrent or
//! repeated publishes of the same version are tolerated through existence
//! checks on the new version.
//!
//! ```text
//!  load base ──NotFound──► new exists? ──yes──► AlreadyPublished
//!     │                        └─no──► error
//!     ▼
//!  for each txn: load log ──NotFound──► new exists? ──yes──► AlreadyPublished
//!     │              │                       └─no──► error
//!     │              ▼
//!     │          apply (any error aborts)
//!     ▼
//!  put new version ──error──► error, logs kept
//!     ▼
//!  delete folded logs (failures logged) ──► Published
//! ```

use crate::apply::apply_txn_log;
use crate::error::{CoreError, CoreResult};
use crate::manager::TabletManager;
use crate::types::{TabletId, TxnId, Version};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How a successful publish was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The new version was written by this call.
    Published,
    /// The new version already existed; nothing was written.
    AlreadyPublished,
}

impl TabletManager {
    /// Publishes `new_version` of `tablet_id` by applying `txns`, in the
    /// given order, to `base_version`.
    ///
    /// Folded txn logs are deleted after the new snapshot is persisted.
    /// A failure to delete them is logged and does not fail the publish.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `new_version <= base_version`
    /// - `NotFound` if the base snapshot or a txn log is missing and the
    ///   new version does not exist
    /// - any error from applying a log or writing the new snapshot; no log
    ///   is deleted in that case
    pub fn publish_version(
        &self,
        tablet_id: TabletId,
        base_version: Version,
        new_version: Version,
        txns: &[TxnId],
    ) -> CoreResult<PublishOutcome> {
        if new_version <= base_version {
            return Err(CoreError::invalid_argument(format!(
                "new version {new_version} is not after base version {base_version}"
            )));
        }
        let result = self.do_publish(tablet_id, base_version, new_version, txns);
        match &result {
            Ok(PublishOutcome::Published) => {
                self.stats_ref().record_publish();
                debug!(tablet = %tablet_id, base = %base_version, new = %new_version, txns = txns.len(), "published version");
            }
            Ok(PublishOutcome::AlreadyPublished) => self.stats_ref().record_publish_short_circuit(),
            Err(_) => self.stats_ref().record_publish_failure(),
        }
        result
    }

    fn do_publish(
        &self,
        tablet_id: TabletId,
        base_version: Version,
        new_version: Version,
        txns: &[TxnId],
    ) -> CoreResult<PublishOutcome> {
        let base = match self.get_tablet_metadata(tablet_id, base_version) {
            Ok(base) => base,
            Err(e) => {
                if e.is_not_found() && self.version_exists(tablet_id, new_version)? {
                    info!(tablet = %tablet_id, version = %new_version, "base version missing but new version exists, skip publish");
                    return Ok(PublishOutcome::AlreadyPublished);
                }
                let location = self.locations().tablet_metadata_location(tablet_id, base_version);
                warn!(%location, error = %e, "failed to get base tablet metadata");
                return Err(e);
            }
        };

        let mut metadata = (*base).clone();
        metadata.version = new_version;

        for &txn_id in txns {
            let log = match self.get_txn_log(tablet_id, txn_id) {
                Ok(log) => log,
                Err(e) => {
                    if e.is_not_found() && self.version_exists(tablet_id, new_version)? {
                        info!(tablet = %tablet_id, %txn_id, version = %new_version, "txn log missing but new version exists, skip publish");
                        return Ok(PublishOutcome::AlreadyPublished);
                    }
                    let location = self.locations().txn_log_location(tablet_id, txn_id);
                    warn!(%location, error = %e, "failed to get txn log");
                    return Err(e);
                }
            };
            if let Err(e) = apply_txn_log(&log, &mut metadata) {
                warn!(tablet = %tablet_id, %txn_id, op = log.op_name(), error = %e, "failed to apply txn log");
                return Err(e);
            }
        }

        if let Err(e) = self.put_tablet_metadata(Arc::new(metadata)) {
            let location = self.locations().tablet_metadata_location(tablet_id, new_version);
            warn!(%location, error = %e, "failed to put tablet metadata");
            return Err(e);
        }

        for &txn_id in txns {
            if let Err(e) = self.delete_txn_log(tablet_id, txn_id) {
                let location = self.locations().txn_log_location(tablet_id, txn_id);
                warn!(%location, error = %e, "failed to delete txn log");
            }
        }
        Ok(PublishOutcome::Published)
    }

    /// Whether `version` is readable. Errors other than `NotFound` propagate,
    /// so a corrupt new version is never mistaken for a missing one.
    fn version_exists(&self, tablet_id: TabletId, version: Version) -> CoreResult<bool> {
        match self.get_tablet_metadata(tablet_id, version) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => {
                let location = self.locations().tablet_metadata_location(tablet_id, version);
                warn!(%location, error = %e, "failed to check published tablet metadata");
                Err(e)
            }
        }
    }
}
