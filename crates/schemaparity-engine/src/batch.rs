//! Batch comparison of every table in a remote dataset
//!
//! Tables are processed one at a time. Each produces a [`TableOutcome`];
//! failures are logged and kept out of the report, and never stop the run.
//! Only listing the dataset and writing the report can fail the batch.

use crate::error::{BatchError, CompareError, Side};
use crate::report::{ComparisonReport, TableComparison};
use crate::resolver::{ResolvedTable, TableResolver};
use crate::schema_diff::SchemaDiff;
use schemaparity_catalog::DatasetIdentifier;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result of comparing one remote table
#[derive(Debug)]
pub struct TableOutcome {
    /// Remote table name
    pub table: String,

    /// Base name the report is keyed by
    pub base_table: String,

    /// The comparison, or why there is none
    pub result: Result<TableComparison, CompareError>,
}

impl TableOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Every outcome of a batch, in processing order
#[derive(Debug)]
pub struct BatchRun {
    /// Dataset that was enumerated
    pub dataset: DatasetIdentifier,

    /// One outcome per listed table
    pub outcomes: Vec<TableOutcome>,
}

impl BatchRun {
    /// Build the report from the successful outcomes
    pub fn report(&self) -> ComparisonReport {
        let mut report = ComparisonReport::new();
        for outcome in &self.outcomes {
            if let Ok(comparison) = &outcome.result {
                report.insert(outcome.base_table.clone(), comparison.clone());
            }
        }
        report
    }

    /// Number of tables listed
    pub fn tables_listed(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of tables compared successfully
    pub fn tables_compared(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Outcomes that failed
    pub fn failures(&self) -> impl Iterator<Item = (&TableOutcome, &CompareError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o, e)))
    }
}

/// A finished batch whose report was written
#[derive(Debug)]
pub struct BatchSummary {
    /// Per-table outcomes
    pub run: BatchRun,

    /// The report that was written
    pub report: ComparisonReport,

    /// Where it was written
    pub output: PathBuf,
}

impl BatchSummary {
    pub fn tables_failed(&self) -> usize {
        self.run.tables_listed() - self.run.tables_compared()
    }
}

/// Normalize both sides of a resolved table and diff them
pub fn compare_resolved(resolved: &ResolvedTable) -> Result<TableComparison, CompareError> {
    let old = resolved.old.normalize().map_err(|source| CompareError::MalformedSchema {
        side: Side::Old,
        origin: resolved.old_source.clone(),
        source,
    })?;

    let new = resolved.new.normalize().map_err(|source| CompareError::MalformedSchema {
        side: Side::New,
        origin: resolved.new_path.display().to_string(),
        source,
    })?;

    Ok(TableComparison {
        old_table: resolved.old_source.clone(),
        new_schema: resolved.new_source.clone(),
        differences: SchemaDiff::compute(&old, &new),
    })
}

/// Drives a comparison over every table of the resolver's dataset
pub struct BatchOrchestrator<'a> {
    resolver: TableResolver<'a>,
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(resolver: TableResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Compare a single remote table
    pub async fn compare_table(&self, table: &str) -> TableOutcome {
        let base_table = self.resolver.base_table_name(table).to_string();

        let result = match self.resolver.resolve(table).await {
            Ok(resolved) => compare_resolved(&resolved),
            Err(e) => Err(e),
        };

        match &result {
            Ok(comparison) => debug!(
                table,
                base_table = %base_table,
                changes = comparison.differences.change_count(),
                "compared table"
            ),
            Err(e) => warn!(
                table,
                base_table = %base_table,
                kind = e.kind(),
                error = %e,
                "skipping table"
            ),
        }

        TableOutcome {
            table: table.to_string(),
            base_table,
            result,
        }
    }

    /// List the dataset and compare every table, calling `on_table` as each finishes
    pub async fn compare_all<F>(&self, mut on_table: F) -> Result<BatchRun, BatchError>
    where
        F: FnMut(&TableOutcome),
    {
        let dataset = self.resolver.dataset().clone();

        let tables = self.resolver
            .adapter()
            .list_tables(&dataset)
            .await
            .map_err(|source| BatchError::ListTables {
                dataset: dataset.to_string(),
                source,
            })?;

        info!(dataset = %dataset, tables = tables.len(), "comparing tables");

        let mut outcomes = Vec::with_capacity(tables.len());
        for table in &tables {
            let outcome = self.compare_table(table).await;
            on_table(&outcome);
            outcomes.push(outcome);
        }

        Ok(BatchRun { dataset, outcomes })
    }

    /// Compare every table and write the report to `output`
    pub async fn run<F>(&self, output: &Path, on_table: F) -> Result<BatchSummary, BatchError>
    where
        F: FnMut(&TableOutcome),
    {
        let run = self.compare_all(on_table).await?;
        let report = run.report();

        report.save_to_file(output).map_err(|source| BatchError::WriteReport {
            path: output.to_path_buf(),
            source,
        })?;

        info!(
            compared = run.tables_compared(),
            failed = run.tables_listed() - run.tables_compared(),
            with_differences = report.tables_with_differences(),
            output = %output.display(),
            "comparison report written"
        );

        Ok(BatchSummary {
            run,
            report,
            output: output.to_path_buf(),
        })
    }
}
