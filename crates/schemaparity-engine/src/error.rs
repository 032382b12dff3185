//! Error types for table comparison and batch runs

use schemaparity_catalog::{FetchError, LocalSchemaError};
use schemaparity_core::MalformedSchemaError;
use std::path::PathBuf;

/// Why a single table could not be compared
///
/// Per-table failures never stop a batch; the table is left out of the report.
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    /// Remote metadata lookup failed
    #[error("Remote lookup failed for {table}: {source}")]
    RemoteLookup {
        table: String,
        #[source]
        source: FetchError,
    },

    /// No usable local schema file
    #[error(transparent)]
    LocalResource(#[from] LocalSchemaError),

    /// A schema record lacked a name or type
    #[error("{side} schema from {origin}: {source}")]
    MalformedSchema {
        side: Side,
        origin: String,
        #[source]
        source: MalformedSchemaError,
    },
}

impl CompareError {
    /// Stable identifier of the failure kind, for logs and summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RemoteLookup { .. } => "remote_lookup",
            Self::LocalResource(LocalSchemaError::NotFound { .. }) => "local_resource_not_found",
            Self::LocalResource(LocalSchemaError::Ambiguous { .. }) => "ambiguous_local_resource",
            Self::LocalResource(LocalSchemaError::Io { .. }) => "local_resource_unreadable",
            Self::LocalResource(LocalSchemaError::Parse { .. }) => "malformed_schema",
            Self::MalformedSchema { .. } => "malformed_schema",
        }
    }
}

/// Which side of a comparison a schema belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Old,
    New,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Old => write!(f, "old"),
            Self::New => write!(f, "new"),
        }
    }
}

/// Failures that abort a whole batch run
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Failed to list tables in {dataset}: {source}")]
    ListTables {
        dataset: String,
        #[source]
        source: FetchError,
    },

    #[error("Failed to write report to {}: {source}", .path.display())]
    WriteReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
