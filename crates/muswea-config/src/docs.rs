// crates/muswea-config/src/docs.rs
// ============================================================================
// Module: Config Docs Generator
// Description: Markdown generator for muswea.toml documentation.
// Purpose: Keep config docs in sync with schema and validation.
// Dependencies: serde_json, std
// ============================================================================

//! ## Overview
//! Generates `Docs/configuration/muswea.toml.md` from the canonical
//! configuration schema. This output is deterministic so drift can be
//! checked in CI.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write;
use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::config::ConfigKey;
use crate::examples::config_toml_example;
use crate::schema::config_schema;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default output path for generated configuration docs.
const DOCS_PATH: &str = "Docs/configuration/muswea.toml.md";

/// Notes appended after the key table.
const CONSTRAINT_NOTES: &str = "\
## Cross-Field Constraints\n\n\
- `WINDOW_SIZE_START` must be less than `WINDOW_SIZE_END`.\n\
- `WINDOW_SIZE_STEP` must not exceed `WINDOW_SIZE_END - WINDOW_SIZE_START`.\n\n\
Constraints are checked after every key passes its own check, ordering first.\n\n\
## Defaults\n\n\
Absent keys are filled from the default table before they are checked.\n\
`CHEMICAL_SUBSTANCES` has no injected default: it is validated only when\n\
present unless the validator runs with a required-with-default policy.\n\
Unknown keys are preserved unless the validator rejects them.\n";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when generating or verifying config docs.
#[derive(Debug, Error)]
pub enum DocsError {
    /// IO failure while writing docs.
    #[error("docs io error: {0}")]
    Io(String),
    /// Schema traversal or rendering error.
    #[error("docs schema error: {0}")]
    Schema(String),
    /// Generated docs do not match the committed file.
    #[error("docs drift: {0}")]
    Drift(String),
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Generates the configuration markdown documentation.
///
/// # Errors
///
/// Returns [`DocsError`] when schema traversal fails.
pub fn config_docs_markdown() -> Result<String, DocsError> {
    let schema = config_schema();
    let mut out = String::new();

    out.push_str("<!--\n");
    out.push_str("Docs/configuration/muswea.toml.md\n");
    out.push_str("============================================================================\n");
    out.push_str("Document: MuSWEA Workflow Configuration\n");
    out.push_str("Description: Reference for muswea.toml configuration keys.\n");
    out.push_str("Generated: This file is auto-generated; do not edit manually.\n");
    out.push_str("============================================================================\n");
    out.push_str("-->\n\n");

    out.push_str("# muswea.toml Configuration\n\n");
    out.push_str("## Overview\n\n");
    out.push_str("`muswea.toml` configures cross-validation, the multiscale sliding-window\n");
    out.push_str("elimination search, and PLS regression. All keys live at the top level.\n");
    out.push_str("Validation fails on the first invalid key.\n\n");

    out.push_str("## Keys\n\n");
    out.push_str(&render_table(&schema).map_err(DocsError::Schema)?);
    out.push('\n');
    out.push_str(CONSTRAINT_NOTES);

    out.push_str("\n## Example\n\n```toml\n");
    out.push_str(&config_toml_example());
    out.push_str("```\n");

    Ok(out)
}

/// Writes the generated docs to the standard location.
///
/// # Errors
///
/// Returns [`DocsError`] when file output fails.
pub fn write_config_docs(path: Option<&Path>) -> Result<(), DocsError> {
    let path = path.unwrap_or_else(|| Path::new(DOCS_PATH));
    let content = config_docs_markdown()?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|err| DocsError::Io(err.to_string()))?;
    }
    fs::write(path, content.as_bytes()).map_err(|err| DocsError::Io(err.to_string()))
}

/// Verifies the on-disk docs match the generated output.
///
/// # Errors
///
/// Returns [`DocsError`] when the docs drift.
pub fn verify_config_docs(path: Option<&Path>) -> Result<(), DocsError> {
    let path = path.unwrap_or_else(|| Path::new(DOCS_PATH));
    let content = config_docs_markdown()?;
    let existing = fs::read_to_string(path).map_err(|err| DocsError::Io(err.to_string()))?;
    if existing != content {
        return Err(DocsError::Drift(format!("docs mismatch: {}", path.display())));
    }
    Ok(())
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the key table in reporting order.
fn render_table(schema: &Value) -> Result<String, String> {
    let props = schema
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| "schema properties missing".to_string())?;
    if props.len() != ConfigKey::ALL.len() {
        return Err(format!(
            "schema documents {} keys, expected {}",
            props.len(),
            ConfigKey::ALL.len()
        ));
    }

    let mut table = String::new();
    table.push_str("| Key | Type | Default | Notes |\n");
    table.push_str("| --- | --- | --- | --- |\n");
    for key in ConfigKey::ALL {
        let field = key.as_str();
        let prop = props.get(field).ok_or_else(|| format!("missing field schema: {field}"))?;
        let field_type = format_schema_type(prop);
        let default_value =
            prop.get("default").map_or_else(|| "n/a".to_string(), format_default_value);
        let notes = prop.get("description").and_then(Value::as_str).unwrap_or("");
        let _ = writeln!(&mut table, "| `{field}` | {field_type} | {default_value} | {notes} |");
    }
    Ok(table)
}

/// Formats a property schema as a short type label with its bounds.
fn format_schema_type(schema: &Value) -> String {
    match schema.get("type").and_then(Value::as_str) {
        Some("integer") => match schema.get("minimum").and_then(Value::as_i64) {
            Some(1) => "integer (> 0)".to_string(),
            _ => "integer".to_string(),
        },
        Some("number") => "number (0 < x < 1)".to_string(),
        Some("boolean") => "bool".to_string(),
        Some("array") => "array of integers (non-empty)".to_string(),
        Some(other) => other.to_string(),
        None => "unknown".to_string(),
    }
}

/// Formats schema defaults for display in docs.
fn format_default_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(val) => val.to_string(),
        Value::Number(val) => val.to_string(),
        Value::String(val) => format!("\"{val}\""),
        Value::Array(arr) => {
            let items = arr.iter().map(Value::to_string).collect::<Vec<String>>();
            format!("[{}]", items.join(", "))
        }
        Value::Object(_) => "{...}".to_string(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
