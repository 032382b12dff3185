//! Comparison report
//!
//! A JSON object keyed by base table name:
//!
//! ```json
//! {
//!   "module1": {
//!     "old_table": "project.dataset.module1_JP",
//!     "new_schema": "schemas/module1*.json",
//!     "differences": { "missing_in_new": ["email"] }
//!   }
//! }
//! ```
//!
//! Entries keep the order in which tables were compared.

use crate::schema_diff::SchemaDiff;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::path::Path;

/// One compared table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableComparison {
    /// Fully qualified remote table the old schema came from
    pub old_table: String,

    /// Match rule of the local file the new schema came from
    pub new_schema: String,

    /// The differences found
    pub differences: SchemaDiff,
}

/// Report of every successfully compared table, in comparison order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonReport {
    entries: Vec<(String, TableComparison)>,
}

impl ComparisonReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a table under its base name
    ///
    /// A second comparison for the same base name (e.g. `users` and
    /// `users_JP` both present remotely) replaces the first one in place.
    pub fn insert(&mut self, base_table: impl Into<String>, comparison: TableComparison) {
        let base_table = base_table.into();
        match self.entries.iter_mut().find(|(name, _)| *name == base_table) {
            Some((_, existing)) => *existing = comparison,
            None => self.entries.push((base_table, comparison)),
        }
    }

    /// Look up a table by base name
    pub fn get(&self, base_table: &str) -> Option<&TableComparison> {
        self.entries
            .iter()
            .find(|(name, _)| name == base_table)
            .map(|(_, comparison)| comparison)
    }

    /// Entries in comparison order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TableComparison)> {
        self.entries.iter().map(|(name, comparison)| (name.as_str(), comparison))
    }

    /// Base table names in comparison order
    pub fn tables(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of tables with at least one difference
    pub fn tables_with_differences(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, comparison)| !comparison.differences.is_empty())
            .count()
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

impl Serialize for ComparisonReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, comparison) in &self.entries {
            map.serialize_entry(name, comparison)?;
        }
        map.end()
    }
}
