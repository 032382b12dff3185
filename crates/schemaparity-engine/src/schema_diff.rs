//! Field-level comparison of two canonical schemas
//!
//! Compares top-level field names and declared types only. A name is either
//! missing on one side or present on both and compared by type; the three
//! result categories are disjoint by construction.

use schemaparity_core::CanonicalSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Declared type of a field on each side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeChange {
    /// Type in the old schema
    pub old: String,

    /// Type in the new schema
    pub new: String,
}

/// Difference between an old and a new schema
///
/// Empty categories are left out when serialized, so two equivalent schemas
/// produce `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDiff {
    /// Fields in old that are absent from new
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub missing_in_new: BTreeSet<String>,

    /// Fields in new that are absent from old
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub missing_in_old: BTreeSet<String>,

    /// Fields present on both sides whose types differ
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub field_differences: BTreeMap<String, TypeChange>,
}

impl SchemaDiff {
    /// Compare `old` against `new`
    pub fn compute(old: &CanonicalSchema, new: &CanonicalSchema) -> Self {
        let mut diff = Self::default();

        for (name, old_type) in old.iter() {
            match new.get(name) {
                None => {
                    diff.missing_in_new.insert(name.to_string());
                }
                Some(new_type) if new_type != old_type => {
                    diff.field_differences.insert(
                        name.to_string(),
                        TypeChange {
                            old: old_type.to_string(),
                            new: new_type.to_string(),
                        },
                    );
                }
                Some(_) => {}
            }
        }

        diff.missing_in_old = new
            .names()
            .filter(|name| !old.contains(name))
            .map(str::to_string)
            .collect();

        diff
    }

    /// True if the schemas are equivalent under this comparison
    pub fn is_empty(&self) -> bool {
        self.missing_in_new.is_empty()
            && self.missing_in_old.is_empty()
            && self.field_differences.is_empty()
    }

    /// Total number of differing fields
    pub fn change_count(&self) -> usize {
        self.missing_in_new.len() + self.missing_in_old.len() + self.field_differences.len()
    }
}

/// Compare `old` against `new`
pub fn diff(old: &CanonicalSchema, new: &CanonicalSchema) -> SchemaDiff {
    SchemaDiff::compute(old, new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemaparity_core::{normalize, Field, RawField, RawSchema};
    use serde_json::json;

    fn schema(fields: &[(&str, &str)]) -> CanonicalSchema {
        CanonicalSchema::from_fields(fields.iter().map(|(n, t)| Field::new(*n, *t)))
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn samples() -> Vec<CanonicalSchema> {
        vec![
            schema(&[]),
            schema(&[("id", "INTEGER")]),
            schema(&[("id", "STRING")]),
            schema(&[("id", "INTEGER"), ("email", "STRING")]),
            schema(&[("a", "INT")]),
            schema(&[("b", "INT")]),
            schema(&[("id", "integer"), ("Email", "STRING"), ("d_123", "RECORD")]),
        ]
    }

    #[test]
    fn missing_in_new() {
        let old = schema(&[("id", "INTEGER"), ("email", "STRING")]);
        let new = schema(&[("id", "INTEGER")]);

        let diff = diff(&old, &new);

        assert_eq!(diff.missing_in_new, set(&["email"]));
        assert_eq!(serde_json::to_value(&diff).unwrap(), json!({"missing_in_new": ["email"]}));
    }

    #[test]
    fn type_change() {
        let old = schema(&[("id", "INTEGER")]);
        let new = schema(&[("id", "STRING")]);

        let diff = diff(&old, &new);

        assert_eq!(
            serde_json::to_value(&diff).unwrap(),
            json!({"field_differences": {"id": {"old": "INTEGER", "new": "STRING"}}})
        );
    }

    #[test]
    fn reordered_fields_are_equivalent() {
        let old = RawSchema::from_fields(vec![
            RawField::new("id", "INTEGER"),
            RawField::new("email", "STRING").with_mode("NULLABLE"),
        ]);
        let new = RawSchema::from_fields(vec![
            RawField::new("email", "STRING").with_mode("REQUIRED"),
            RawField::new("id", "INTEGER"),
        ]);

        let diff = diff(&normalize(&old).unwrap(), &normalize(&new).unwrap());

        assert!(diff.is_empty());
        assert_eq!(serde_json::to_string(&diff).unwrap(), "{}");
    }

    #[test]
    fn disjoint_names() {
        let diff = diff(&schema(&[("a", "INT")]), &schema(&[("b", "INT")]));

        assert_eq!(
            serde_json::to_value(&diff).unwrap(),
            json!({"missing_in_new": ["a"], "missing_in_old": ["b"]})
        );
        assert_eq!(diff.change_count(), 2);
    }

    #[test]
    fn type_comparison_is_case_sensitive() {
        let diff = diff(&schema(&[("id", "INTEGER")]), &schema(&[("id", "integer")]));
        assert_eq!(diff.field_differences.len(), 1);
    }

    #[test]
    fn names_sorted_in_output() {
        let old = schema(&[("zeta", "STRING"), ("alpha", "STRING"), ("mid", "STRING")]);
        let diff = diff(&old, &schema(&[]));

        let json = serde_json::to_string(&diff).unwrap();
        assert_eq!(json, r#"{"missing_in_new":["alpha","mid","zeta"]}"#);
    }

    #[test]
    fn reflexive() {
        for a in samples() {
            let diff = diff(&a, &a);
            assert!(diff.is_empty());
            assert_eq!(serde_json::to_value(&diff).unwrap(), json!({}));
        }
    }

    #[test]
    fn symmetric() {
        for a in samples() {
            for b in samples() {
                let ab = diff(&a, &b);
                let ba = diff(&b, &a);

                assert_eq!(ab.missing_in_new, ba.missing_in_old);
                assert_eq!(ab.missing_in_old, ba.missing_in_new);
                assert_eq!(ab.field_differences.len(), ba.field_differences.len());
                for (name, change) in &ab.field_differences {
                    assert_eq!(ba.field_differences[name].old, change.new);
                    assert_eq!(ba.field_differences[name].new, change.old);
                }
            }
        }
    }

    #[test]
    fn categories_disjoint() {
        for a in samples() {
            for b in samples() {
                let d = diff(&a, &b);
                let mut seen = BTreeSet::new();
                let names = d.missing_in_new.iter()
                    .chain(d.missing_in_old.iter())
                    .chain(d.field_differences.keys());
                for name in names {
                    assert!(seen.insert(name.clone()), "'{}' appears in two categories", name);
                }
                assert_eq!(seen.len(), d.change_count());
            }
        }
    }

    #[test]
    fn deserializes_partial_output() {
        let diff: SchemaDiff = serde_json::from_str(r#"{"missing_in_old": ["b"]}"#).unwrap();
        assert_eq!(diff.missing_in_old, set(&["b"]));
        assert!(diff.missing_in_new.is_empty());
        assert!(diff.field_differences.is_empty());
    }
}
