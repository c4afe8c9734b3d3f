//! Tablet create, schema and drop commands.

use super::{is_json, CmdResult};
use lakemeta_core::{
    ColumnSchema, CreateTabletRequest, KeysType, TabletId, TabletManager, TabletSchema, Version,
};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Schema file accepted by `create`.
#[derive(Debug, Deserialize)]
pub struct SchemaFile {
    /// Schema id.
    pub id: u64,
    /// Key model.
    pub keys_type: KeysType,
    /// Columns in storage order.
    pub columns: Vec<ColumnFile>,
}

/// One column of a [`SchemaFile`].
#[derive(Debug, Deserialize)]
pub struct ColumnFile {
    /// Stable id; defaults to the column's position.
    #[serde(default)]
    pub unique_id: Option<u32>,
    /// Column name.
    pub name: String,
    /// Logical type name.
    pub type_name: String,
    /// Part of the sort key.
    #[serde(default)]
    pub is_key: bool,
    /// Admits nulls. Defaults to true for value columns.
    #[serde(default)]
    pub is_nullable: Option<bool>,
    /// Declared length for variable-width types.
    #[serde(default)]
    pub length: u32,
}

impl SchemaFile {
    /// Builds the tablet schema.
    pub fn into_schema(self) -> CmdResult<TabletSchema> {
        if self.columns.is_empty() {
            return Err("Schema has no columns".into());
        }
        let mut columns = Vec::with_capacity(self.columns.len());
        for (position, column) in self.columns.into_iter().enumerate() {
            let unique_id = match column.unique_id {
                Some(id) => id,
                None => u32::try_from(position)?,
            };
            let mut schema = if column.is_key {
                ColumnSchema::key(unique_id, column.name, column.type_name)
            } else {
                ColumnSchema::value(unique_id, column.name, column.type_name)
            };
            if let Some(nullable) = column.is_nullable {
                schema.is_nullable = nullable;
            }
            schema.length = column.length;
            columns.push(schema);
        }
        Ok(TabletSchema::new(self.id, self.keys_type, columns))
    }
}

/// Runs the create command.
pub fn create(manager: &TabletManager, tablet: u64, schema_path: &Path) -> CmdResult {
    let text = fs::read_to_string(schema_path)
        .map_err(|e| format!("Failed to read {}: {e}", schema_path.display()))?;
    let schema = serde_json::from_str::<SchemaFile>(&text)?.into_schema()?;
    let tablet_id = TabletId::new(tablet);
    info!("Creating {} with schema {} from {:?}", tablet_id, schema.id, schema_path);

    match manager.get_tablet_metadata(tablet_id, Version::INITIAL) {
        Ok(_) => return Err(format!("{tablet_id} already exists").into()),
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e.into()),
    }

    manager.create_tablet(&CreateTabletRequest { tablet_id, schema })?;
    println!("Created {tablet_id} at v1");
    Ok(())
}

/// Runs the schema command.
pub fn schema(manager: &TabletManager, tablet: u64, format: &str) -> CmdResult {
    let tablet_id = TabletId::new(tablet);
    let schema = manager.get_tablet_schema(tablet_id)?;

    if is_json(format) {
        println!("{}", serde_json::to_string_pretty(&*schema)?);
        return Ok(());
    }

    println!("Schema {} of {tablet_id} ({:?})", schema.id, schema.keys_type);
    println!(
        "  {:>4}  {:<24} {:<12} {:<4} {}",
        "id", "name", "type", "key", "nullable"
    );
    for column in &schema.columns {
        println!(
            "  {:>4}  {:<24} {:<12} {:<4} {}",
            column.unique_id,
            column.name,
            column.type_name,
            if column.is_key { "yes" } else { "" },
            if column.is_nullable { "yes" } else { "no" }
        );
    }
    Ok(())
}

/// Runs the drop command.
pub fn drop_tablet(manager: &TabletManager, tablet: u64) -> CmdResult {
    let tablet_id = TabletId::new(tablet);
    info!("Dropping {}", tablet_id);
    manager.drop_tablet(tablet_id)?;
    println!("Dropped {tablet_id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_file_defaults() {
        let file: SchemaFile = serde_json::from_str(
            r#"{"id": 5, "keys_type": "Unique", "columns": [
                {"name": "k", "type_name": "INT", "is_key": true},
                {"name": "v", "type_name": "VARCHAR", "length": 64}
            ]}"#,
        )
        .unwrap();
        let schema = file.into_schema().unwrap();

        assert_eq!(schema.num_columns(), 2);
        assert_eq!(schema.num_key_columns(), 1);
        assert_eq!(schema.columns[1].unique_id, 1);
        assert!(schema.columns[1].is_nullable);
        assert_eq!(schema.columns[1].length, 64);
        assert_eq!(schema.next_column_unique_id, 2);
    }

    #[test]
    fn empty_schema_is_rejected() {
        let file: SchemaFile =
            serde_json::from_str(r#"{"id": 5, "keys_type": "Duplicate", "columns": []}"#)
                .unwrap();
        assert!(file.into_schema().is_err());
    }
}
