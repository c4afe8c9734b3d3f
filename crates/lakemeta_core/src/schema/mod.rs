//! Tablet schema model and the interning registry.

mod registry;

pub use registry::SchemaRegistry;

use serde::{Deserialize, Serialize};
use std::mem::size_of;

/// How rows with equal keys are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeysType {
    /// Rows are kept as written.
    Duplicate,
    /// Later rows replace earlier rows with the same key.
    Unique,
    /// Value columns are aggregated per key.
    Aggregate,
    /// Rows are upserted by primary key.
    Primary,
}

/// A column of a tablet schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Stable column identifier, unaffected by renames.
    pub unique_id: u32,
    /// Column name.
    pub name: String,
    /// Logical type name, e.g. `"BIGINT"`.
    pub type_name: String,
    /// Whether the column is part of the sort key.
    pub is_key: bool,
    /// Whether the column admits nulls.
    pub is_nullable: bool,
    /// Declared length for variable-width types, zero otherwise.
    pub length: u32,
}

impl ColumnSchema {
    /// Creates a non-nullable key column.
    pub fn key(unique_id: u32, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            unique_id,
            name: name.into(),
            type_name: type_name.into(),
            is_key: true,
            is_nullable: false,
            length: 0,
        }
    }

    /// Creates a nullable value column.
    pub fn value(unique_id: u32, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            unique_id,
            name: name.into(),
            type_name: type_name.into(),
            is_key: false,
            is_nullable: true,
            length: 0,
        }
    }

    fn mem_usage(&self) -> usize {
        size_of::<Self>() + self.name.capacity() + self.type_name.capacity()
    }
}

/// Schema of a tablet.
///
/// Assumed invariant across a tablet's versions; schema change is not
/// applied by this layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabletSchema {
    /// Schema identifier, shared by every tablet of the same index.
    pub id: u64,
    /// Key model.
    pub keys_type: KeysType,
    /// Columns in storage order.
    pub columns: Vec<ColumnSchema>,
    /// Number of leading key columns used for the short-key index.
    pub num_short_key_columns: u32,
    /// Next unique id to assign to an added column.
    pub next_column_unique_id: u32,
}

impl TabletSchema {
    /// Creates a schema, deriving `next_column_unique_id` from the columns.
    #[must_use]
    pub fn new(id: u64, keys_type: KeysType, columns: Vec<ColumnSchema>) -> Self {
        let next_column_unique_id = columns
            .iter()
            .map(|c| c.unique_id + 1)
            .max()
            .unwrap_or(0);
        let num_short_key_columns =
            u32::try_from(columns.iter().filter(|c| c.is_key).count()).unwrap_or(u32::MAX);
        Self {
            id,
            keys_type,
            columns,
            num_short_key_columns,
            next_column_unique_id,
        }
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns the number of key columns.
    #[must_use]
    pub fn num_key_columns(&self) -> usize {
        self.columns.iter().filter(|c| c.is_key).count()
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Approximate heap footprint in bytes, used as the cache charge.
    #[must_use]
    pub fn mem_usage(&self) -> usize {
        size_of::<Self>()
            + (self.columns.capacity() - self.columns.len()) * size_of::<ColumnSchema>()
            + self.columns.iter().map(ColumnSchema::mem_usage).sum::<usize>()
    }
}
