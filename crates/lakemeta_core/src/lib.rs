//! # lakemeta core
//!
//! Tablet metadata and transaction-log management over a blob store.
//!
//! This crate provides:
//! - Immutable, versioned tablet snapshots ([`TabletMetadata`])
//! - Pending transaction logs ([`TxnLog`]) for writes and compactions
//! - A byte-budgeted metadata cache ([`MetaCache`])
//! - Idempotent version publish ([`TabletManager::publish_version`])
//! - Compaction planning ([`TabletManager::compact`])
//!
//! ## Example
//!
//! ```rust
//! use lakemeta_core::{
//!     ColumnSchema, CreateTabletRequest, KeysType, RowsetMetadata, TabletId,
//!     TabletManager, TabletSchema, TxnId, TxnLog, Version,
//! };
//! use std::sync::Arc;
//!
//! let manager = TabletManager::open_in_memory();
//! let tablet_id = TabletId::new(7);
//! let schema = TabletSchema::new(1, KeysType::Duplicate, vec![ColumnSchema::key(0, "k", "INT")]);
//! manager.create_tablet(&CreateTabletRequest { tablet_id, schema }).unwrap();
//!
//! let rowset = RowsetMetadata::new(vec!["seg.dat".into()], 10, 1024);
//! manager.put_txn_log(Arc::new(TxnLog::write(tablet_id, TxnId::new(100), rowset))).unwrap();
//! manager
//!     .publish_version(tablet_id, Version::new(1), Version::new(2), &[TxnId::new(100)])
//!     .unwrap();
//!
//! let metadata = manager.get_tablet_metadata(tablet_id, Version::new(2)).unwrap();
//! assert_eq!(metadata.rowsets.len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod apply;
mod cache;
mod compaction;
mod config;
mod error;
mod location;
mod manager;
mod metadata;
mod publish;
mod schema;
mod stats;
mod tablet;
mod txn_log;
mod types;

pub use apply::apply_txn_log;
pub use cache::{CacheValue, MetaCache};
pub use compaction::{pick_input_rowsets, CompactionTask};
pub use config::ManagerConfig;
pub use error::{CoreError, CoreResult};
pub use location::{
    join_path, parse_tablet_metadata_filename, parse_txn_log_filename, tablet_metadata_filename,
    tablet_metadata_prefix, txn_log_filename, txn_log_prefix, FixedLocationProvider,
    LocationProvider, TABLET_METADATA_PREFIX, TXN_LOG_PREFIX,
};
pub use manager::{
    schema_cache_key, CreateTabletRequest, ListIter, MetadataIter, TabletManager, TxnLogIter,
};
pub use metadata::{RowsetMetadata, TabletMetadata};
pub use publish::PublishOutcome;
pub use schema::{ColumnSchema, KeysType, SchemaRegistry, TabletSchema};
pub use stats::{ManagerStats, StatsSnapshot};
pub use tablet::{Rowset, Tablet};
pub use txn_log::{OpCompaction, OpSchemaChange, OpWrite, TxnLog, TxnOp};
pub use types::{RowsetId, TabletId, TxnId, Version};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
