//! Configuration schema (schemaparity.toml)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "schemaparity.toml";

/// Remote ("old") dataset to enumerate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Warehouse project id
    pub project: String,

    /// Dataset whose tables are compared
    pub dataset: String,

    /// Optional service-account key file; Application Default Credentials otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<PathBuf>,
}

/// What to do when more than one local file matches a base table name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Use the lexicographically first match
    #[default]
    First,

    /// Treat multiple matches as an error
    Strict,
}

/// Local ("new") schema files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Directory holding one `<base_table><anything><extension>` file per table
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// File extension, including the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Multi-match policy
    #[serde(default)]
    pub multi_match: MatchPolicy,
}

fn default_directory() -> PathBuf {
    PathBuf::from("schemas")
}

fn default_extension() -> String {
    ".json".to_string()
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            extension: default_extension(),
            multi_match: MatchPolicy::default(),
        }
    }
}

/// Table name correlation rules
///
/// No suffix is stripped unless configured. Datasets with regional variants
/// such as `module1_JP` need `strip_suffixes = ["_JP"]` to correlate with
/// `module1*.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablesConfig {
    /// Variant suffixes removed from remote table names to get the base name
    #[serde(default)]
    pub strip_suffixes: Vec<String>,
}

impl TablesConfig {
    /// Base table name for a remote table
    ///
    /// Strips the first configured suffix the name ends with. A suffix that
    /// would leave nothing behind is not stripped.
    pub fn base_table_name<'a>(&self, table: &'a str) -> &'a str {
        self.strip_suffixes
            .iter()
            .filter(|suffix| !suffix.is_empty())
            .find_map(|suffix| table.strip_suffix(suffix.as_str()).filter(|base| !base.is_empty()))
            .unwrap_or(table)
    }
}

/// Report output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Where the comparison report is written
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

fn default_output_path() -> PathBuf {
    PathBuf::from("schema_comparison_results.json")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Remote dataset
    pub remote: RemoteConfig,

    /// Local schema files
    #[serde(default)]
    pub local: LocalConfig,

    /// Table name rules
    #[serde(default)]
    pub tables: TablesConfig,

    /// Report output
    #[serde(default)]
    pub output: OutputConfig,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub project_root: PathBuf,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        let mut config = Self::from_toml(&contents)?;

        // Relative paths in the file are relative to the file itself
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.remote.project.trim().is_empty() {
            return Err(ConfigError::Invalid("remote.project must not be empty".to_string()));
        }
        if self.remote.dataset.trim().is_empty() {
            return Err(ConfigError::Invalid("remote.dataset must not be empty".to_string()));
        }
        if !self.local.extension.is_empty() && !self.local.extension.starts_with('.') {
            return Err(ConfigError::Invalid(format!(
                "local.extension must start with '.', got '{}'",
                self.local.extension
            )));
        }
        Ok(())
    }

    /// Resolve a possibly relative path against the project root
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || self.project_root.as_os_str().is_empty() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    /// Local schema directory, resolved
    pub fn schema_dir(&self) -> PathBuf {
        self.resolve_path(&self.local.directory)
    }

    /// Report output path, resolved
    pub fn output_path(&self) -> PathBuf {
        self.resolve_path(&self.output.path)
    }

    /// Credentials file, resolved
    pub fn credentials_path(&self) -> Option<PathBuf> {
        self.remote.credentials.as_deref().map(|p| self.resolve_path(p))
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
