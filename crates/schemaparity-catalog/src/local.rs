//! Local schema files
//!
//! One JSON file per base table, named `<base_table><anything><extension>`
//! (for example `module1_2024-03-01.json`) directly under a directory. The
//! content is a list of `{"name": ..., "type": ...}` records.
//!
//! Matching is done on an explicit, sorted directory listing so the choice
//! between several candidates is deterministic.

use schemaparity_core::{MatchPolicy, RawSchema};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Errors locating or reading a local schema file
#[derive(Debug, thiserror::Error)]
pub enum LocalSchemaError {
    #[error("No schema file found for table '{base_table}' matching '{pattern}'")]
    NotFound { base_table: String, pattern: String },

    #[error("Multiple schema files match '{pattern}' for table '{base_table}': {}", display_paths(.matches))]
    Ambiguous {
        base_table: String,
        pattern: String,
        matches: Vec<PathBuf>,
    },

    #[error("Cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed schema file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A local schema file that was found and parsed
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSchema {
    /// The file that was read
    pub path: PathBuf,

    /// Its records
    pub schema: RawSchema,
}

/// Directory of local schema files
#[derive(Debug, Clone)]
pub struct LocalSchemaStore {
    directory: PathBuf,
    extension: String,
    policy: MatchPolicy,
}

impl LocalSchemaStore {
    /// Create a store over `directory` for files ending in `extension`
    pub fn new(directory: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            extension: extension.into(),
            policy: MatchPolicy::default(),
        }
    }

    /// Set the multi-match policy
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Human-readable match rule for a base table, e.g. `schemas/users*.json`
    pub fn pattern(&self, base_table: &str) -> String {
        format!("{}/{}*{}", self.directory.display(), base_table, self.extension)
    }

    fn matches(&self, base_table: &str, file_name: &str) -> bool {
        file_name.len() >= base_table.len() + self.extension.len()
            && file_name.starts_with(base_table)
            && file_name.ends_with(self.extension.as_str())
    }

    /// All files matching a base table, sorted by file name
    pub fn candidates(&self, base_table: &str) -> Result<Vec<PathBuf>, LocalSchemaError> {
        let mut found = Vec::new();

        for entry in WalkDir::new(&self.directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| LocalSchemaError::Io {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| self.directory.clone()),
                source: e.into(),
            })?;

            // Symlinks count when they point at a regular file
            if !entry.file_type().is_file() && !entry.path().is_file() {
                continue;
            }

            if let Some(name) = entry.file_name().to_str() {
                if self.matches(base_table, name) {
                    found.push(entry.into_path());
                }
            }
        }

        Ok(found)
    }

    /// Locate the single file for a base table
    pub fn locate(&self, base_table: &str) -> Result<PathBuf, LocalSchemaError> {
        let mut candidates = self.candidates(base_table)?;

        match candidates.len() {
            0 => Err(LocalSchemaError::NotFound {
                base_table: base_table.to_string(),
                pattern: self.pattern(base_table),
            }),
            1 => Ok(candidates.remove(0)),
            n => match self.policy {
                MatchPolicy::First => {
                    warn!(
                        base_table,
                        matches = n,
                        ignored = %display_paths(&candidates[1..]),
                        "multiple schema files match, using {}",
                        candidates[0].display()
                    );
                    Ok(candidates.remove(0))
                }
                MatchPolicy::Strict => Err(LocalSchemaError::Ambiguous {
                    base_table: base_table.to_string(),
                    pattern: self.pattern(base_table),
                    matches: candidates,
                }),
            },
        }
    }

    /// Locate and parse the schema file for a base table
    pub fn load(&self, base_table: &str) -> Result<LocalSchema, LocalSchemaError> {
        let path = self.locate(base_table)?;
        let schema = Self::read(&path)?;
        debug!(base_table, path = %path.display(), fields = schema.len(), "loaded local schema");
        Ok(LocalSchema { path, schema })
    }

    /// Parse a schema file
    pub fn read(path: &Path) -> Result<RawSchema, LocalSchemaError> {
        let contents = std::fs::read_to_string(path).map_err(|source| LocalSchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| LocalSchemaError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const USERS: &str = r#"[{"name": "id", "type": "INTEGER"}, {"name": "email", "type": "STRING"}]"#;

    fn store_with(files: &[(&str, &str)]) -> (tempfile::TempDir, LocalSchemaStore) {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in files {
            fs::write(dir.path().join(name), contents).unwrap();
        }
        let store = LocalSchemaStore::new(dir.path(), ".json");
        (dir, store)
    }

    #[test]
    fn loads_dated_file() {
        let (_dir, store) = store_with(&[("users_2024-03-01.json", USERS), ("orders.json", "[]")]);

        let local = store.load("users").unwrap();
        assert!(local.path.ends_with("users_2024-03-01.json"));
        assert_eq!(local.schema.len(), 2);
    }

    #[test]
    fn exact_name_matches() {
        let (_dir, store) = store_with(&[("users.json", USERS)]);
        assert!(store.load("users").is_ok());
    }

    #[test]
    fn wrong_extension_ignored() {
        let (_dir, store) = store_with(&[("users.json.bak", USERS), ("users.txt", USERS)]);

        let err = store.load("users").unwrap_err();
        assert!(matches!(err, LocalSchemaError::NotFound { .. }));
    }

    #[test]
    fn not_found_names_pattern() {
        let (dir, store) = store_with(&[]);

        let err = store.load("module1").unwrap_err();
        let expected = format!("{}/module1*.json", dir.path().display());
        match err {
            LocalSchemaError::NotFound { base_table, pattern } => {
                assert_eq!(base_table, "module1");
                assert_eq!(pattern, expected);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn first_match_wins_by_name() {
        let (_dir, store) = store_with(&[
            ("users_2024-05-01.json", "[]"),
            ("users_2024-03-01.json", USERS),
        ]);

        let local = store.load("users").unwrap();
        assert!(local.path.ends_with("users_2024-03-01.json"));
    }

    #[test]
    fn strict_policy_rejects_multiple() {
        let (_dir, store) = store_with(&[("users_a.json", USERS), ("users_b.json", USERS)]);
        let store = store.with_policy(MatchPolicy::Strict);

        match store.load("users").unwrap_err() {
            LocalSchemaError::Ambiguous { matches, .. } => assert_eq!(matches.len(), 2),
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn prefix_collision_counts_as_match() {
        // `users*` also covers `users_archive*`; that is the naming rule
        let (_dir, store) = store_with(&[("users_archive.json", "[]"), ("users_v2.json", USERS)]);

        assert_eq!(store.candidates("users").unwrap().len(), 2);
        assert_eq!(store.candidates("users_v").unwrap().len(), 1);
    }

    #[test]
    fn subdirectories_ignored() {
        let (dir, store) = store_with(&[]);
        fs::create_dir(dir.path().join("users.json")).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("users.json"), USERS).unwrap();

        assert!(matches!(store.load("users"), Err(LocalSchemaError::NotFound { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_file_matches() {
        let (dir, store) = store_with(&[("users_v1.json", USERS)]);
        let shared = tempfile::tempdir().unwrap();
        fs::write(shared.path().join("orders_export.json"), USERS).unwrap();

        std::os::unix::fs::symlink(
            shared.path().join("orders_export.json"),
            dir.path().join("orders_latest.json"),
        )
        .unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.json"), dir.path().join("stale_link.json")).unwrap();

        let local = store.load("orders").unwrap();
        assert!(local.path.ends_with("orders_latest.json"));
        assert_eq!(local.schema.len(), 2);

        // A dangling link is not a candidate
        assert!(matches!(store.load("stale"), Err(LocalSchemaError::NotFound { .. })));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let (_dir, store) = store_with(&[("users.json", r#"{"name": "id"}"#)]);

        assert!(matches!(store.load("users"), Err(LocalSchemaError::Parse { .. })));
    }

    #[test]
    fn missing_directory_is_io_error() {
        let store = LocalSchemaStore::new("/nonexistent/schemaparity/dir", ".json");

        assert!(matches!(store.load("users"), Err(LocalSchemaError::Io { .. })));
    }
}
