//! BigQuery warehouse adapter
//!
//! Tables are enumerated with a query against the dataset's
//! `INFORMATION_SCHEMA.TABLES` view. Schemas come from the tables API rather
//! than `INFORMATION_SCHEMA.COLUMNS`, because the tables API reports the same
//! legacy type names (`INTEGER`, `FLOAT`, `RECORD`) that `bq show --schema`
//! writes into exported schema files. Comparing against those files with
//! standard SQL names (`INT64`) would flag every column.
//!
//! Required IAM permissions:
//! - bigquery.tables.get
//! - bigquery.tables.list
//! - bigquery.jobs.create (for the listing query)
//!
//! ## Authentication
//!
//! 1. Service account JSON file (explicit path)
//! 2. Application Default Credentials (ADC)
//!
//! ```rust,ignore
//! let adapter = BigQueryAdapter::with_adc("my-project").await?;
//! let adapter = BigQueryAdapter::from_service_account_file("my-project", "sa.json").await?;
//! ```

use crate::adapter::{DatasetIdentifier, FetchError, TableIdentifier, WarehouseAdapter};
use schemaparity_core::RawSchema;

#[cfg(feature = "bigquery")]
use gcp_bigquery_client::{
    error::BQError,
    model::{query_request::QueryRequest, query_response::ResultSet},
    Client as BigQueryClient,
};
#[cfg(feature = "bigquery")]
use schemaparity_core::RawField;

#[cfg(not(feature = "bigquery"))]
const NOT_COMPILED: &str = "BigQuery support not compiled. Rebuild with: cargo build --features bigquery";

/// BigQuery warehouse adapter
pub struct BigQueryAdapter {
    /// Project that runs the listing query (billing project)
    project_id: String,

    /// BigQuery client (only available with bigquery feature)
    #[cfg(feature = "bigquery")]
    client: BigQueryClient,
}

impl BigQueryAdapter {
    /// Create a new BigQuery adapter using Application Default Credentials (ADC)
    ///
    /// ADC automatically detects credentials from:
    /// - GOOGLE_APPLICATION_CREDENTIALS environment variable
    /// - gcloud CLI default credentials
    /// - GCE/GKE metadata service
    #[cfg(feature = "bigquery")]
    pub async fn with_adc(project_id: impl Into<String>) -> Result<Self, FetchError> {
        let project_id = project_id.into();

        let client = BigQueryClient::from_application_default_credentials()
            .await
            .map_err(|e| FetchError::AuthenticationError(format!(
                "Failed to authenticate with ADC: {}. \
                 Ensure GOOGLE_APPLICATION_CREDENTIALS is set or run 'gcloud auth application-default login'",
                e
            )))?;

        Ok(Self { project_id, client })
    }

    /// Create adapter without bigquery feature (returns error)
    #[cfg(not(feature = "bigquery"))]
    pub async fn with_adc(project_id: impl Into<String>) -> Result<Self, FetchError> {
        let _ = project_id.into();
        Err(FetchError::ConfigError(NOT_COMPILED.to_string()))
    }

    /// Create a new BigQuery adapter using a service account key file
    #[cfg(feature = "bigquery")]
    pub async fn from_service_account_file(
        project_id: impl Into<String>,
        key_path: impl AsRef<std::path::Path>,
    ) -> Result<Self, FetchError> {
        let project_id = project_id.into();
        let key_path_str = key_path.as_ref().to_string_lossy().to_string();

        let client = BigQueryClient::from_service_account_key_file(&key_path_str)
            .await
            .map_err(|e| FetchError::AuthenticationError(format!(
                "Failed to read service account key file '{}': {}",
                key_path_str, e
            )))?;

        Ok(Self { project_id, client })
    }

    /// Create adapter without bigquery feature (returns error)
    #[cfg(not(feature = "bigquery"))]
    pub async fn from_service_account_file(
        project_id: impl Into<String>,
        _key_path: impl AsRef<std::path::Path>,
    ) -> Result<Self, FetchError> {
        let _ = project_id.into();
        Err(FetchError::ConfigError(NOT_COMPILED.to_string()))
    }

    /// Billing project
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Query listing every table name in a dataset
    pub fn list_tables_query(dataset: &DatasetIdentifier) -> String {
        format!(
            "SELECT table_name FROM `{}.{}.INFORMATION_SCHEMA.TABLES` ORDER BY table_name",
            dataset.project, dataset.dataset
        )
    }

    /// Reject a listing response that does not hold every row
    ///
    /// An unfinished job or a paged result would otherwise read as a dataset
    /// with fewer (or no) tables.
    pub fn ensure_listing_complete(
        dataset: &DatasetIdentifier,
        job_complete: Option<bool>,
        page_token: Option<&str>,
    ) -> Result<(), FetchError> {
        if job_complete == Some(false) {
            return Err(FetchError::QueryError(format!(
                "Listing tables in {} did not finish before the query timeout",
                dataset
            )));
        }
        if page_token.is_some() {
            return Err(FetchError::QueryError(format!(
                "Listing tables in {} returned a partial result",
                dataset
            )));
        }
        Ok(())
    }

    /// Map a client error onto a fetch error for `what`
    #[cfg(feature = "bigquery")]
    fn classify(err: BQError, what: &str, not_found: impl FnOnce(String) -> FetchError) -> FetchError {
        let err_str = err.to_string();
        if err_str.contains("Not found") || err_str.contains("notFound") {
            not_found(what.to_string())
        } else if err_str.contains("Access Denied") || err_str.contains("Permission") {
            FetchError::PermissionDenied(format!("Cannot access {}: {}", what, err_str))
        } else {
            FetchError::QueryError(err_str)
        }
    }
}

#[async_trait::async_trait]
impl WarehouseAdapter for BigQueryAdapter {
    fn name(&self) -> &'static str {
        "BigQuery"
    }

    #[cfg(feature = "bigquery")]
    async fn list_tables(&self, dataset: &DatasetIdentifier) -> Result<Vec<String>, FetchError> {
        let request = QueryRequest::new(Self::list_tables_query(dataset));
        let response = self.client
            .job()
            .query(&self.project_id, request)
            .await
            .map_err(|e| Self::classify(e, &dataset.to_string(), FetchError::DatasetNotFound))?;

        Self::ensure_listing_complete(dataset, response.job_complete, response.page_token.as_deref())?;

        let mut tables = Vec::new();
        let mut rs = ResultSet::new_from_query_response(response);

        while rs.next_row() {
            let name = rs.get_string_by_name("table_name")
                .map_err(|e| FetchError::InvalidResponse(format!("Failed to get table_name: {}", e)))?;
            if let Some(name) = name {
                tables.push(name);
            }
        }

        Ok(tables)
    }

    #[cfg(not(feature = "bigquery"))]
    async fn list_tables(&self, _dataset: &DatasetIdentifier) -> Result<Vec<String>, FetchError> {
        Err(FetchError::ConfigError(NOT_COMPILED.to_string()))
    }

    #[cfg(feature = "bigquery")]
    async fn fetch_schema(&self, table: &TableIdentifier) -> Result<RawSchema, FetchError> {
        let resource = self.client
            .table()
            .get(&table.project, &table.dataset, &table.table, None)
            .await
            .map_err(|e| Self::classify(e, &table.fqn(), FetchError::TableNotFound))?;

        let fields = resource.schema.fields.unwrap_or_default();
        let mut raw = Vec::with_capacity(fields.len());

        for field in fields {
            // FieldType serializes to the API's own spelling ("STRING", "INTEGER", ...)
            let field_type = match serde_json::to_value(&field.r#type) {
                Ok(serde_json::Value::String(s)) => s,
                Ok(other) => {
                    return Err(FetchError::InvalidResponse(format!(
                        "Unexpected type for field '{}' of {}: {}",
                        field.name, table.fqn(), other
                    )))
                }
                Err(e) => return Err(FetchError::InvalidResponse(e.to_string())),
            };

            let mut raw_field = RawField::new(field.name, field_type);
            raw_field.mode = field.mode;
            raw.push(raw_field);
        }

        Ok(RawSchema::from_fields(raw))
    }

    #[cfg(not(feature = "bigquery"))]
    async fn fetch_schema(&self, _table: &TableIdentifier) -> Result<RawSchema, FetchError> {
        Err(FetchError::ConfigError(NOT_COMPILED.to_string()))
    }

    #[cfg(feature = "bigquery")]
    async fn test_connection(&self) -> Result<(), FetchError> {
        let request = QueryRequest::new("SELECT 1".to_string());

        self.client
            .job()
            .query(&self.project_id, request)
            .await
            .map_err(|e| FetchError::QueryError(format!("Connection test failed: {}", e)))?;

        Ok(())
    }

    #[cfg(not(feature = "bigquery"))]
    async fn test_connection(&self) -> Result<(), FetchError> {
        Err(FetchError::ConfigError(NOT_COMPILED.to_string()))
    }
}
