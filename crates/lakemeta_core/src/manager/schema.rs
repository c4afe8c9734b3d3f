//! Schema resolution.

use super::{schema_cache_key, TabletManager};
use crate::cache::CacheValue;
use crate::error::{CoreError, CoreResult};
use crate::schema::TabletSchema;
use crate::types::TabletId;
use std::sync::Arc;

impl TabletManager {
    /// Returns the schema of `tablet_id`.
    ///
    /// Served from the `schema_{tablet_id}` cache entry when present.
    /// Otherwise the schema is taken from any snapshot of the tablet,
    /// interned through the registry and cached.
    ///
    /// # Errors
    ///
    /// `NotFound` if the tablet has no snapshot, `Internal` if interning
    /// fails, or any error from reading the snapshot.
    pub fn get_tablet_schema(&self, tablet_id: TabletId) -> CoreResult<Arc<TabletSchema>> {
        let key = schema_cache_key(tablet_id);
        if let Some(schema) = self.lookup_tablet_schema(&key) {
            return Ok(schema);
        }

        let metadata = self
            .list_tablet_metadata(tablet_id, true)?
            .next()
            .ok_or_else(|| CoreError::not_found(format!("{tablet_id} has no metadata")))??;

        let (schema, inserted) = self.registry().emplace(&metadata.schema).ok_or_else(|| {
            CoreError::internal(format!(
                "failed to emplace schema {} of {tablet_id}",
                metadata.schema.id
            ))
        })?;
        let charge = if inserted { schema.mem_usage() } else { 0 };
        self.fill_metacache(&key, CacheValue::Schema(Arc::clone(&schema)), charge);
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::CreateTabletRequest;
    use crate::schema::{ColumnSchema, KeysType};

    fn schema(column: &str) -> TabletSchema {
        TabletSchema::new(
            42,
            KeysType::Duplicate,
            vec![ColumnSchema::key(0, column, "BIGINT")],
        )
    }

    fn create(manager: &TabletManager, tablet: u64, schema: TabletSchema) {
        manager
            .create_tablet(&CreateTabletRequest {
                tablet_id: TabletId::new(tablet),
                schema,
            })
            .unwrap();
    }

    #[test]
    fn tablets_share_interned_schema() {
        let manager = TabletManager::open_in_memory();
        create(&manager, 1, schema("k"));
        create(&manager, 2, schema("k"));

        let a = manager.get_tablet_schema(TabletId::new(1)).unwrap();
        let b = manager.get_tablet_schema(TabletId::new(2)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(manager.registry().len(), 1);
    }

    #[test]
    fn second_lookup_is_cached() {
        let manager = TabletManager::open_in_memory();
        create(&manager, 1, schema("k"));
        manager.prune_metacache();

        manager.get_tablet_schema(TabletId::new(1)).unwrap();
        let reads = manager.stats().metadata_reads;
        manager.get_tablet_schema(TabletId::new(1)).unwrap();
        assert_eq!(manager.stats().metadata_reads, reads);
    }

    #[test]
    fn missing_tablet_is_not_found() {
        let manager = TabletManager::open_in_memory();
        let err = manager.get_tablet_schema(TabletId::new(5)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn conflicting_schema_is_internal() {
        let manager = TabletManager::open_in_memory();
        create(&manager, 1, schema("k"));
        create(&manager, 2, schema("other"));

        let _held = manager.get_tablet_schema(TabletId::new(1)).unwrap();
        let err = manager.get_tablet_schema(TabletId::new(2)).unwrap_err();
        assert!(err.is_internal());
    }
}
