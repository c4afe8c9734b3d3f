//! Deduplicating schema registry.
//!
//! Many tablets of one index share a structurally identical schema. The
//! registry interns schemas by id so those tablets hold one shared
//! instance. Entries are weak: a schema is dropped from memory once no
//! cache entry or caller holds it.

use super::TabletSchema;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Interns [`TabletSchema`] values.
///
/// A registry is an explicit object owned by whoever builds the
/// [`crate::TabletManager`]; several managers may share one through an
/// `Arc`, and tests can use an isolated registry each.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: Mutex<HashMap<u64, Weak<TabletSchema>>>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `schema`.
    ///
    /// Returns the shared instance and whether this call created it.
    /// Returns `None` if a live schema with the same id but different
    /// content is already registered.
    pub fn emplace(&self, schema: &TabletSchema) -> Option<(Arc<TabletSchema>, bool)> {
        let mut schemas = self.schemas.lock();
        if let Some(existing) = schemas.get(&schema.id).and_then(Weak::upgrade) {
            return (*existing == *schema).then_some((existing, false));
        }
        let interned = Arc::new(schema.clone());
        schemas.insert(schema.id, Arc::downgrade(&interned));
        Some((interned, true))
    }

    /// Returns the live schema registered under `id`.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<Arc<TabletSchema>> {
        self.schemas.lock().get(&id).and_then(Weak::upgrade)
    }

    /// Drops entries whose schema is no longer referenced.
    pub fn purge_expired(&self) {
        self.schemas.lock().retain(|_, weak| weak.strong_count() > 0);
    }

    /// Returns the number of live schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas
            .lock()
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Returns true if no live schema is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnSchema, KeysType};

    fn schema(id: u64, column: &str) -> TabletSchema {
        TabletSchema::new(id, KeysType::Duplicate, vec![ColumnSchema::key(0, column, "INT")])
    }

    #[test]
    fn identical_schemas_share_one_instance() {
        let registry = SchemaRegistry::new();
        let (a, inserted_a) = registry.emplace(&schema(1, "k")).unwrap();
        let (b, inserted_b) = registry.emplace(&schema(1, "k")).unwrap();

        assert!(inserted_a);
        assert!(!inserted_b);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn conflicting_content_is_rejected() {
        let registry = SchemaRegistry::new();
        let (_held, _) = registry.emplace(&schema(1, "k")).unwrap();
        assert!(registry.emplace(&schema(1, "other")).is_none());
    }

    #[test]
    fn dropped_schema_can_be_replaced() {
        let registry = SchemaRegistry::new();
        let (held, _) = registry.emplace(&schema(1, "k")).unwrap();
        drop(held);

        assert!(registry.get(1).is_none());
        assert!(registry.is_empty());
        let (_, inserted) = registry.emplace(&schema(1, "other")).unwrap();
        assert!(inserted);
    }

    #[test]
    fn purge_removes_dead_entries() {
        let registry = SchemaRegistry::new();
        let (held, _) = registry.emplace(&schema(1, "k")).unwrap();
        let (dropped, _) = registry.emplace(&schema(2, "k")).unwrap();
        drop(dropped);

        registry.purge_expired();
        assert_eq!(registry.schemas.lock().len(), 1);
        assert!(Arc::ptr_eq(&registry.get(1).unwrap(), &held));
    }

    #[test]
    fn registries_are_isolated() {
        let first = SchemaRegistry::new();
        let second = SchemaRegistry::new();
        let (a, _) = first.emplace(&schema(1, "k")).unwrap();
        let (b, inserted) = second.emplace(&schema(1, "k")).unwrap();
        assert!(inserted);
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
