//! Schema types and the canonical comparison form

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A top-level field: name plus declared type
///
/// The type is an opaque token ("STRING", "INTEGER", ...). It is compared by
/// exact string equality, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    /// Field name, case-sensitive as provided by the source
    pub name: String,

    /// Declared type token
    #[serde(rename = "type")]
    pub field_type: String,
}

impl Field {
    /// Create a new field
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
        }
    }
}

/// A field record as delivered by a source, before normalization
///
/// Every attribute is optional here so that a record missing its name or type
/// can be reported as malformed instead of failing deserialization of the
/// whole document. Attributes other than name, type and mode are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawField {
    /// Field name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Declared type token
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,

    /// Field mode (NULLABLE, REQUIRED, REPEATED); never compared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl RawField {
    /// Create a complete raw field
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            field_type: Some(field_type.into()),
            mode: None,
        }
    }

    /// Set the field mode
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }
}

impl From<Field> for RawField {
    fn from(field: Field) -> Self {
        Self::new(field.name, field.field_type)
    }
}

/// An ordered sequence of raw field records
///
/// Serializes as a bare JSON array, the format of local schema files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSchema {
    /// Records in source order
    pub fields: Vec<RawField>,
}

impl RawSchema {
    /// Create an empty raw schema
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Create a raw schema from records
    pub fn from_fields(fields: Vec<RawField>) -> Self {
        Self { fields }
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if there are no records
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Normalize into the canonical comparison form
    pub fn normalize(&self) -> Result<CanonicalSchema, MalformedSchemaError> {
        normalize(self)
    }
}

impl FromIterator<RawField> for RawSchema {
    fn from_iter<I: IntoIterator<Item = RawField>>(iter: I) -> Self {
        Self::from_fields(iter.into_iter().collect())
    }
}

/// Which required attribute a record was missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingAttribute {
    Name,
    Type,
}

impl std::fmt::Display for MissingAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Type => write!(f, "type"),
        }
    }
}

/// A raw record could not be normalized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed schema: field #{index} has no {missing}{}", name_suffix(.name))]
pub struct MalformedSchemaError {
    /// Zero-based position of the offending record
    pub index: usize,

    /// The attribute that was absent
    pub missing: MissingAttribute,

    /// The record's name, when it had one
    pub name: Option<String>,
}

fn name_suffix(name: &Option<String>) -> String {
    name.as_ref().map(|n| format!(" ('{}')", n)).unwrap_or_default()
}

/// Canonical, comparison-ready schema
///
/// A name -> type mapping with unique keys. Iteration is always sorted by
/// name; that order exists for presentation only, lookups are by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalSchema {
    types: BTreeMap<String, String>,
}

impl CanonicalSchema {
    /// Create an empty canonical schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from complete fields; later duplicates replace earlier ones
    pub fn from_fields(fields: impl IntoIterator<Item = Field>) -> Self {
        let types = fields
            .into_iter()
            .map(|f| (f.name, f.field_type))
            .collect();
        Self { types }
    }

    /// Type declared for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.types.get(name).map(String::as_str)
    }

    /// True if `name` is declared
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Number of distinct fields
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Field names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// (name, type) pairs in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.types.iter().map(|(n, t)| (n.as_str(), t.as_str()))
    }

    /// The sorted field sequence
    pub fn to_fields(&self) -> Vec<Field> {
        self.iter().map(|(n, t)| Field::new(n, t)).collect()
    }

    /// The sorted field sequence as raw records
    pub fn to_raw(&self) -> RawSchema {
        self.iter().map(|(n, t)| RawField::new(n, t)).collect()
    }
}

/// Normalize a raw schema into its canonical form
///
/// Keeps name and type only. Mode and any other attributes are dropped.
/// When a name occurs more than once the last record wins.
pub fn normalize(raw: &RawSchema) -> Result<CanonicalSchema, MalformedSchemaError> {
    let mut types = BTreeMap::new();

    for (index, field) in raw.fields.iter().enumerate() {
        let name = match field.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(MalformedSchemaError {
                    index,
                    missing: MissingAttribute::Name,
                    name: None,
                })
            }
        };

        let Some(field_type) = field.field_type.as_deref() else {
            return Err(MalformedSchemaError {
                index,
                missing: MissingAttribute::Type,
                name: Some(name.to_string()),
            });
        };

        types.insert(name.to_string(), field_type.to_string());
    }

    Ok(CanonicalSchema { types })
}
