//! Test fixtures for adapter and local store integration tests
//!
//! Schemas are written the way the warehouse reports them: legacy type
//! names and an optional mode.

#![allow(dead_code)]

use schemaparity_core::{RawField, RawSchema};
use std::path::Path;

/// A typical users table
pub fn users_schema() -> RawSchema {
    RawSchema::from_fields(vec![
        RawField::new("id", "INTEGER").with_mode("REQUIRED"),
        RawField::new("email", "STRING").with_mode("REQUIRED"),
        RawField::new("name", "STRING").with_mode("NULLABLE"),
        RawField::new("created_at", "TIMESTAMP").with_mode("REQUIRED"),
        RawField::new("is_active", "BOOLEAN").with_mode("REQUIRED"),
    ])
}

/// A typical orders table
pub fn orders_schema() -> RawSchema {
    RawSchema::from_fields(vec![
        RawField::new("id", "INTEGER"),
        RawField::new("user_id", "INTEGER"),
        RawField::new("total_amount", "NUMERIC"),
        RawField::new("status", "STRING"),
        RawField::new("ordered_at", "TIMESTAMP"),
    ])
}

/// Survey module with a repeated record column
pub fn module_schema() -> RawSchema {
    RawSchema::from_fields(vec![
        RawField::new("Connect_ID", "STRING"),
        RawField::new("d_100767870", "INTEGER"),
        RawField::new("d_949302066", "STRING"),
        RawField::new("answers", "RECORD").with_mode("REPEATED"),
    ])
}

/// Write a schema file into `dir`
pub fn write_schema(dir: &Path, file_name: &str, schema: &RawSchema) {
    let json = serde_json::to_string_pretty(schema).unwrap();
    std::fs::write(dir.join(file_name), json).unwrap();
}
