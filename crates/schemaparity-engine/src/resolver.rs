//! Correlates a remote table with its local schema file and loads both sides

use crate::error::CompareError;
use schemaparity_catalog::{DatasetIdentifier, LocalSchemaStore, TableIdentifier, WarehouseAdapter};
use schemaparity_core::{RawSchema, TablesConfig};
use std::path::PathBuf;
use tracing::debug;

/// Both raw schemas for one remote table
#[derive(Debug, Clone)]
pub struct ResolvedTable {
    /// The remote table
    pub table: TableIdentifier,

    /// Base name used to find the local file
    pub base_table: String,

    /// Old source identifier (`project.dataset.table`)
    pub old_source: String,

    /// New source identifier (the local match rule)
    pub new_source: String,

    /// The local file that was read
    pub new_path: PathBuf,

    /// Schema fetched from the warehouse
    pub old: RawSchema,

    /// Schema read from the local file
    pub new: RawSchema,
}

/// Resolves remote tables against a local schema directory
pub struct TableResolver<'a> {
    adapter: &'a dyn WarehouseAdapter,
    store: &'a LocalSchemaStore,
    dataset: DatasetIdentifier,
    tables: TablesConfig,
}

impl<'a> TableResolver<'a> {
    pub fn new(
        adapter: &'a dyn WarehouseAdapter,
        store: &'a LocalSchemaStore,
        dataset: DatasetIdentifier,
        tables: TablesConfig,
    ) -> Self {
        Self {
            adapter,
            store,
            dataset,
            tables,
        }
    }

    pub fn dataset(&self) -> &DatasetIdentifier {
        &self.dataset
    }

    pub fn adapter(&self) -> &dyn WarehouseAdapter {
        self.adapter
    }

    /// Base name of a remote table
    pub fn base_table_name<'t>(&self, table: &'t str) -> &'t str {
        self.tables.base_table_name(table)
    }

    /// Fetch the remote schema and load the matching local one
    pub async fn resolve(&self, table: &str) -> Result<ResolvedTable, CompareError> {
        let base_table = self.base_table_name(table).to_string();
        let table_id = self.dataset.table(table);

        let old = self.adapter
            .fetch_schema(&table_id)
            .await
            .map_err(|source| CompareError::RemoteLookup {
                table: table_id.fqn(),
                source,
            })?;

        let local = self.store.load(&base_table)?;

        debug!(
            table = %table_id,
            base_table = %base_table,
            old_fields = old.len(),
            new_fields = local.schema.len(),
            "resolved table"
        );

        Ok(ResolvedTable {
            old_source: table_id.fqn(),
            new_source: self.store.pattern(&base_table),
            new_path: local.path,
            table: table_id,
            base_table,
            old,
            new: local.schema,
        })
    }
}
