//! Model⇄Graph transformation.
//!
//! ```text
//! JSON ──parse_model──▶ SchemaModel ──import_model──▶ Graph
//! JSON ◀─render_model── SchemaModel ◀─export_model─── Graph
//! ```
//!
//! Both directions are all-or-nothing: a conversion either returns a
//! complete value or an error, and never touches caller state.

mod export;
mod import;

pub use export::export_model;
pub use import::{import_model, PLACEHOLDER_ROW_HEIGHT};

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::schema::SchemaModel;

/// File name offered for exported documents.
pub const DEFAULT_EXPORT_FILE: &str = "data_model.json";

/// Indent width of exported documents.
pub const DEFAULT_INDENT: usize = 2;

/// Errors raised while reading a schema document into a graph.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Failed to parse schema document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid entity name: '{0}'")]
    InvalidEntityName(String),

    #[error("Invalid field name '{field}' on entity '{entity}'")]
    InvalidFieldName { entity: String, field: String },

    #[error("Entities '{first}' and '{second}' both resolve to '{id}'")]
    DuplicateEntity {
        id: String,
        first: String,
        second: String,
    },

    #[error("Failed to read schema document: {0}")]
    Io(#[from] std::io::Error),
}

pub type ImportResult<T> = Result<T, ImportError>;

/// Errors raised while writing a schema document.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Exported document is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Failed to write schema document: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Parse a schema document.
///
/// Invalid JSON and documents of the wrong shape are both rejected.
pub fn parse_model(json: &str) -> ImportResult<SchemaModel> {
    let model = serde_json::from_str(json)?;
    Ok(model)
}

/// Render a schema document as pretty-printed JSON.
pub fn render_model(model: &SchemaModel, indent: usize) -> ExportResult<String> {
    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    model.serialize(&mut serializer)?;
    Ok(String::from_utf8(buf)?)
}

/// Read and parse a schema document from disk.
pub fn read_model_file<P: AsRef<Path>>(path: P) -> ImportResult<SchemaModel> {
    let content = fs::read_to_string(path)?;
    parse_model(&content)
}

/// Render and write a schema document to disk.
pub fn write_model_file<P: AsRef<Path>>(
    path: P,
    model: &SchemaModel,
    indent: usize,
) -> ExportResult<()> {
    let json = render_model(model, indent)?;
    fs::write(path, json)?;
    Ok(())
}
