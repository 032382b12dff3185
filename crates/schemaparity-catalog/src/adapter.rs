//! Warehouse adapter trait for listing tables and fetching their schemas

use schemaparity_core::RawSchema;
use std::fmt;

/// Identifies a dataset in a warehouse
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetIdentifier {
    /// Project name
    pub project: String,

    /// Dataset name
    pub dataset: String,
}

impl DatasetIdentifier {
    /// Create a new dataset identifier
    pub fn new(project: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            dataset: dataset.into(),
        }
    }

    /// Identifier of a table inside this dataset
    pub fn table(&self, table: impl Into<String>) -> TableIdentifier {
        TableIdentifier::new(self.project.clone(), self.dataset.clone(), table)
    }
}

impl fmt::Display for DatasetIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.project, self.dataset)
    }
}

/// Identifies a table in a warehouse
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableIdentifier {
    /// Project name
    pub project: String,

    /// Dataset name
    pub dataset: String,

    /// Table name
    pub table: String,
}

impl TableIdentifier {
    /// Create a new table identifier
    pub fn new(project: impl Into<String>, dataset: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            dataset: dataset.into(),
            table: table.into(),
        }
    }

    /// Get fully qualified name
    pub fn fqn(&self) -> String {
        format!("{}.{}.{}", self.project, self.dataset, self.table)
    }

    /// The dataset this table lives in
    pub fn dataset_id(&self) -> DatasetIdentifier {
        DatasetIdentifier::new(self.project.clone(), self.dataset.clone())
    }
}

impl fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}

/// Errors that can occur when talking to a warehouse
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Query failed: {0}")]
    QueryError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Trait for warehouse adapters that can enumerate tables and fetch schemas
///
/// `fetch_schema` returns the fields in the warehouse's own order with their
/// declared type and mode; normalization happens later.
#[async_trait::async_trait]
pub trait WarehouseAdapter: Send + Sync {
    /// Get the adapter name (e.g., "BigQuery")
    fn name(&self) -> &'static str;

    /// List the names of all tables in a dataset
    async fn list_tables(&self, dataset: &DatasetIdentifier) -> Result<Vec<String>, FetchError>;

    /// Fetch the top-level fields of a table
    async fn fetch_schema(&self, table: &TableIdentifier) -> Result<RawSchema, FetchError>;

    /// Test the connection to the warehouse
    ///
    /// Useful for validating credentials before a batch starts.
    async fn test_connection(&self) -> Result<(), FetchError>;
}
