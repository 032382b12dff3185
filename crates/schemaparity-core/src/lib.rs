//! SchemaParity Core
//!
//! Schema model shared by every crate: raw field records as sources deliver
//! them, the canonical name -> type form used for comparison, and the
//! configuration file format.

pub mod schema;
pub mod config;

pub use schema::{normalize, CanonicalSchema, Field, MalformedSchemaError, MissingAttribute, RawField, RawSchema};
pub use config::{Config, ConfigError, LocalConfig, MatchPolicy, OutputConfig, RemoteConfig, TablesConfig, DEFAULT_CONFIG_FILE};
