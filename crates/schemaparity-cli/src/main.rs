use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use schemaparity_catalog::{BigQueryAdapter, DatasetIdentifier, LocalSchemaStore, WarehouseAdapter};
use schemaparity_core::{Config, DEFAULT_CONFIG_FILE};
use schemaparity_engine::{BatchOrchestrator, BatchSummary, SchemaDiff, TableOutcome, TableResolver};

/// SchemaParity - compare warehouse table schemas with local schema files
#[derive(Parser)]
#[command(name = "schemaparity")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: schemaparity.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare every table of the remote dataset with its local schema file
    Compare {
        /// Output file for the comparison report (overrides the config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare two local schema files
    Diff {
        /// Old schema file
        old: PathBuf,

        /// New schema file
        new: PathBuf,
    },

    /// List remote tables and the local file each one resolves to
    List,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Compare { output } => {
            let config = load_config(cli.config.as_deref())?;
            compare_command(&config, output).await
        }
        Commands::Diff { old, new } => diff_command(&old, &new),
        Commands::List => {
            let config = load_config(cli.config.as_deref())?;
            list_command(&config).await
        }
    }
}

/// Log to stderr; RUST_LOG wins over the default level
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    let config = Config::from_file(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    tracing::debug!(
        project = %config.remote.project,
        dataset = %config.remote.dataset,
        schemas = %config.schema_dir().display(),
        "loaded config"
    );

    Ok(config)
}

async fn connect(config: &Config) -> Result<Box<dyn WarehouseAdapter>> {
    let project = &config.remote.project;

    let adapter = match config.credentials_path() {
        Some(key) => BigQueryAdapter::from_service_account_file(project, &key).await?,
        None => BigQueryAdapter::with_adc(project).await?,
    };

    adapter.test_connection().await
        .map_err(|e| anyhow::anyhow!("Failed to connect to warehouse: {}", e))?;

    tracing::info!(project = %project, "connected to {}", adapter.name());
    Ok(Box::new(adapter))
}

fn local_store(config: &Config) -> LocalSchemaStore {
    LocalSchemaStore::new(config.schema_dir(), config.local.extension.clone())
        .with_policy(config.local.multi_match)
}

/// Compare command - run the batch and write the report
async fn compare_command(config: &Config, output: Option<PathBuf>) -> Result<()> {
    let adapter = connect(config).await?;
    let store = local_store(config);
    let dataset = DatasetIdentifier::new(&config.remote.project, &config.remote.dataset);
    let output = output.unwrap_or_else(|| config.output_path());

    let resolver = TableResolver::new(adapter.as_ref(), &store, dataset, config.tables.clone());
    let orchestrator = BatchOrchestrator::new(resolver);

    let summary = orchestrator.run(&output, print_outcome).await?;

    println!("Comparison results written to {}", output.display());
    print_summary(&summary);

    Ok(())
}

/// Print one table as soon as it has been compared
fn print_outcome(outcome: &TableOutcome) {
    match &outcome.result {
        Ok(comparison) => {
            println!(
                "Differences for table '{}' (base: '{}'):",
                outcome.table.bold(),
                outcome.base_table
            );
            println!("{}", render_diff(&comparison.differences));
            println!("\n{}\n", "=".repeat(80));
        }
        Err(e) => {
            println!(
                "{} '{}' (base: '{}'): {}",
                "Error comparing table".red(),
                outcome.table,
                outcome.base_table,
                e
            );
        }
    }
}

fn render_diff(diff: &SchemaDiff) -> String {
    let json = serde_json::to_string_pretty(diff).unwrap_or_else(|_| "{}".to_string());
    if diff.is_empty() {
        json.green().to_string()
    } else {
        json.yellow().to_string()
    }
}

fn print_summary(summary: &BatchSummary) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Schema Comparison Summary".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Dataset: {}", summary.run.dataset);
    println!("Tables listed:   {}", summary.run.tables_listed());
    println!("Tables compared: {}", summary.run.tables_compared());

    let with_differences = summary.report.tables_with_differences();
    if with_differences > 0 {
        println!("With differences: {}", with_differences.to_string().yellow().bold());
    } else {
        println!("With differences: {}", with_differences.to_string().green());
    }

    let failed = summary.tables_failed();
    if failed > 0 {
        println!("Skipped (errors): {}", failed.to_string().red().bold());
        println!();
        println!("{}", "Skipped tables (not in report):".bold());
        for (outcome, error) in summary.run.failures() {
            println!("  [{}] {}: {}", error.kind().red(), outcome.table, error);
        }
    } else {
        println!("Skipped (errors): {}", failed.to_string().green());
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}

/// Diff command - compare two local schema files
fn diff_command(old: &Path, new: &Path) -> Result<()> {
    let old_schema = LocalSchemaStore::read(old)?
        .normalize()
        .with_context(|| format!("Invalid schema in {}", old.display()))?;
    let new_schema = LocalSchemaStore::read(new)?
        .normalize()
        .with_context(|| format!("Invalid schema in {}", new.display()))?;

    let diff = SchemaDiff::compute(&old_schema, &new_schema);

    println!("Differences between '{}' and '{}':", old.display(), new.display());
    println!("{}", render_diff(&diff));

    Ok(())
}

/// List command - show how remote tables map to local files
async fn list_command(config: &Config) -> Result<()> {
    let adapter = connect(config).await?;
    let store = local_store(config);
    let dataset = DatasetIdentifier::new(&config.remote.project, &config.remote.dataset);

    let tables = adapter.list_tables(&dataset).await
        .with_context(|| format!("Failed to list tables in {}", dataset))?;

    println!("{} ({} tables)", dataset.to_string().bold(), tables.len());

    for table in &tables {
        let base_table = config.tables.base_table_name(table);
        match store.locate(base_table) {
            Ok(path) => println!("  {} -> {} {}", table, base_table, path.display().to_string().green()),
            Err(e) => println!("  {} -> {} {}", table, base_table, e.to_string().red()),
        }
    }

    Ok(())
}
