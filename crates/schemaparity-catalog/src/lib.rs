//! Schema sources for comparison
//!
//! The "old" side of a comparison lives in a warehouse and is reached through
//! a [`WarehouseAdapter`]; the "new" side is a directory of schema files read
//! by [`LocalSchemaStore`].
//!
//! ## Features
//!
//! - `bigquery` - Google BigQuery support (without it the adapter's
//!   constructors return a configuration error)
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemaparity_catalog::{BigQueryAdapter, DatasetIdentifier, WarehouseAdapter};
//!
//! let adapter = BigQueryAdapter::with_adc("my-project").await?;
//! let dataset = DatasetIdentifier::new("my-project", "my_dataset");
//! for table in adapter.list_tables(&dataset).await? {
//!     let schema = adapter.fetch_schema(&dataset.table(table)).await?;
//! }
//! ```

pub mod adapter;
pub mod bigquery;
pub mod local;
pub mod mock;

pub use adapter::{DatasetIdentifier, FetchError, TableIdentifier, WarehouseAdapter};
pub use bigquery::BigQueryAdapter;
pub use local::{LocalSchema, LocalSchemaError, LocalSchemaStore};
pub use mock::{MockAdapter, MockAdapterBuilder};
