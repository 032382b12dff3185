//! SchemaParity engine
//!
//! - Schema diff: field-level comparison of two canonical schemas
//! - Table resolution: remote table -> base name -> both raw schemas
//! - Batch orchestration and the comparison report

pub mod error;
pub mod schema_diff;
pub mod resolver;
pub mod report;
pub mod batch;

pub use error::{BatchError, CompareError, Side};
pub use schema_diff::{diff, SchemaDiff, TypeChange};
pub use resolver::{ResolvedTable, TableResolver};
pub use report::{ComparisonReport, TableComparison};
pub use batch::{compare_resolved, BatchOrchestrator, BatchRun, BatchSummary, TableOutcome};
