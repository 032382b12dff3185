//! Mock warehouse adapter for testing
//!
//! Returns predefined schemas without connecting to any warehouse. Useful for
//! exercising the batch comparison without credentials and for simulating
//! lookup failures on particular tables.
//!
//! ```rust,ignore
//! use schemaparity_catalog::{MockAdapterBuilder, WarehouseAdapter, TableIdentifier};
//! use schemaparity_core::{RawField, RawSchema};
//!
//! let adapter = MockAdapterBuilder::new()
//!     .with_schema("project", "dataset", "users", RawSchema::from_fields(vec![
//!         RawField::new("id", "INTEGER"),
//!     ]))
//!     .build();
//! ```

use crate::adapter::{DatasetIdentifier, FetchError, TableIdentifier, WarehouseAdapter};
use schemaparity_core::RawSchema;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Mock warehouse adapter for testing
///
/// Schemas are stored in memory keyed by fully qualified name. Listing a
/// dataset returns every stored or erroring table in it, sorted by name.
/// Clones share state.
pub struct MockAdapter {
    /// Predefined schemas by table FQN
    schemas: Arc<RwLock<BTreeMap<String, RawSchema>>>,

    /// Errors to return for specific tables
    errors: Arc<RwLock<HashMap<String, FetchError>>>,

    /// Datasets whose listing fails
    failing_datasets: Arc<RwLock<HashSet<String>>>,

    /// Simulate connection failure
    fail_connection: bool,

    /// Name to return from name() method
    adapter_name: &'static str,
}

impl MockAdapter {
    /// Create a new mock adapter with no predefined schemas
    pub fn new() -> Self {
        MockAdapterBuilder::new().build()
    }

    /// Add a schema for a specific table
    pub async fn add_schema(&self, table: TableIdentifier, schema: RawSchema) {
        self.schemas.write().await.insert(table.fqn(), schema);
    }

    /// Configure an error to be returned for a specific table
    ///
    /// The table still shows up in listings.
    pub async fn add_error_for_table(&self, table: TableIdentifier, error: FetchError) {
        self.errors.write().await.insert(table.fqn(), error);
    }

    /// Make listing a dataset fail
    pub async fn fail_listing(&self, dataset: &DatasetIdentifier) {
        self.failing_datasets.write().await.insert(dataset.to_string());
    }

    /// Configure to fail all connection tests
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Set a custom adapter name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.adapter_name = name;
        self
    }

    /// Get the number of schemas stored in the adapter
    pub async fn schema_count(&self) -> usize {
        self.schemas.read().await.len()
    }

    /// Check if a schema exists for a table
    pub async fn has_schema(&self, table: &TableIdentifier) -> bool {
        self.schemas.read().await.contains_key(&table.fqn())
    }
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockAdapter {
    fn clone(&self) -> Self {
        Self {
            schemas: Arc::clone(&self.schemas),
            errors: Arc::clone(&self.errors),
            failing_datasets: Arc::clone(&self.failing_datasets),
            fail_connection: self.fail_connection,
            adapter_name: self.adapter_name,
        }
    }
}

#[async_trait::async_trait]
impl WarehouseAdapter for MockAdapter {
    fn name(&self) -> &'static str {
        self.adapter_name
    }

    async fn list_tables(&self, dataset: &DatasetIdentifier) -> Result<Vec<String>, FetchError> {
        let key = dataset.to_string();
        if self.failing_datasets.read().await.contains(&key) {
            return Err(FetchError::DatasetNotFound(key));
        }

        let prefix = format!("{}.", key);
        let schemas = self.schemas.read().await;
        let errors = self.errors.read().await;
        let mut tables: Vec<String> = schemas
            .keys()
            .chain(errors.keys())
            .filter_map(|fqn| fqn.strip_prefix(&prefix))
            .map(str::to_string)
            .collect();

        tables.sort();
        tables.dedup();
        Ok(tables)
    }

    async fn fetch_schema(&self, table: &TableIdentifier) -> Result<RawSchema, FetchError> {
        // Configured errors take precedence
        if let Some(error) = self.errors.read().await.get(&table.fqn()) {
            return Err(error.clone());
        }

        self.schemas.read().await
            .get(&table.fqn())
            .cloned()
            .ok_or_else(|| FetchError::TableNotFound(table.fqn()))
    }

    async fn test_connection(&self) -> Result<(), FetchError> {
        if self.fail_connection {
            Err(FetchError::NetworkError("Simulated connection failure".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Builder for creating MockAdapter with multiple schemas
pub struct MockAdapterBuilder {
    schemas: BTreeMap<String, RawSchema>,
    errors: HashMap<String, FetchError>,
    failing_datasets: HashSet<String>,
    fail_connection: bool,
    adapter_name: &'static str,
}

impl MockAdapterBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            schemas: BTreeMap::new(),
            errors: HashMap::new(),
            failing_datasets: HashSet::new(),
            fail_connection: false,
            adapter_name: "Mock",
        }
    }

    /// Add a schema for a table
    pub fn with_schema(mut self, project: &str, dataset: &str, table: &str, schema: RawSchema) -> Self {
        self.schemas.insert(TableIdentifier::new(project, dataset, table).fqn(), schema);
        self
    }

    /// Add an error for a specific table
    pub fn with_error(mut self, project: &str, dataset: &str, table: &str, error: FetchError) -> Self {
        self.errors.insert(TableIdentifier::new(project, dataset, table).fqn(), error);
        self
    }

    /// Make listing a dataset fail
    pub fn with_listing_failure(mut self, project: &str, dataset: &str) -> Self {
        self.failing_datasets.insert(DatasetIdentifier::new(project, dataset).to_string());
        self
    }

    /// Configure connection failure
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Set adapter name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.adapter_name = name;
        self
    }

    /// Build the MockAdapter
    pub fn build(self) -> MockAdapter {
        MockAdapter {
            schemas: Arc::new(RwLock::new(self.schemas)),
            errors: Arc::new(RwLock::new(self.errors)),
            failing_datasets: Arc::new(RwLock::new(self.failing_datasets)),
            fail_connection: self.fail_connection,
            adapter_name: self.adapter_name,
        }
    }
}

impl Default for MockAdapterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemaparity_core::RawField;

    fn id_schema() -> RawSchema {
        RawSchema::from_fields(vec![RawField::new("id", "INTEGER")])
    }

    #[tokio::test]
    async fn test_mock_adapter_basic() {
        let adapter = MockAdapter::new();
        let table = TableIdentifier::new("project", "dataset", "users");
        let schema = RawSchema::from_fields(vec![
            RawField::new("id", "INTEGER").with_mode("REQUIRED"),
            RawField::new("name", "STRING"),
        ]);

        adapter.add_schema(table.clone(), schema).await;

        let fetched = adapter.fetch_schema(&table).await.unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched.fields[0].name.as_deref(), Some("id"));
        assert_eq!(fetched.fields[0].mode.as_deref(), Some("REQUIRED"));
    }

    #[tokio::test]
    async fn test_mock_adapter_table_not_found() {
        let adapter = MockAdapter::new();
        let table = TableIdentifier::new("project", "dataset", "nonexistent");

        let result = adapter.fetch_schema(&table).await;
        assert!(matches!(result, Err(FetchError::TableNotFound(_))));
    }

    #[tokio::test]
    async fn test_mock_adapter_lists_one_dataset() {
        let adapter = MockAdapterBuilder::new()
            .with_schema("p", "flat", "orders", id_schema())
            .with_schema("p", "flat", "module1_JP", id_schema())
            .with_schema("p", "other", "ignored", id_schema())
            .with_error("p", "flat", "broken", FetchError::QueryError("boom".into()))
            .build();

        let tables = adapter.list_tables(&DatasetIdentifier::new("p", "flat")).await.unwrap();
        assert_eq!(tables, vec!["broken", "module1_JP", "orders"]);
    }

    #[tokio::test]
    async fn test_mock_adapter_listing_failure() {
        let adapter = MockAdapterBuilder::new()
            .with_listing_failure("p", "flat")
            .build();

        let result = adapter.list_tables(&DatasetIdentifier::new("p", "flat")).await;
        assert!(matches!(result, Err(FetchError::DatasetNotFound(_))));

        let other = adapter.list_tables(&DatasetIdentifier::new("p", "other")).await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_mock_adapter_custom_error() {
        let adapter = MockAdapter::new();
        let table = TableIdentifier::new("project", "dataset", "restricted");

        adapter.add_schema(table.clone(), id_schema()).await;
        adapter
            .add_error_for_table(
                table.clone(),
                FetchError::PermissionDenied("Access denied to restricted table".to_string()),
            )
            .await;

        let result = adapter.fetch_schema(&table).await;
        assert!(matches!(result, Err(FetchError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_mock_adapter_connection() {
        assert!(MockAdapter::new().test_connection().await.is_ok());

        let adapter = MockAdapter::new().with_connection_failure();
        assert!(matches!(adapter.test_connection().await, Err(FetchError::NetworkError(_))));
    }

    #[tokio::test]
    async fn test_mock_adapter_clone_shares_state() {
        let adapter = MockAdapter::new().with_name("TestBigQuery");
        let cloned = adapter.clone();
        let table = TableIdentifier::new("db", "schema", "table");

        adapter.add_schema(table.clone(), id_schema()).await;

        assert!(cloned.has_schema(&table).await);
        assert_eq!(cloned.schema_count().await, 1);
        assert_eq!(cloned.name(), "TestBigQuery");
    }
}
