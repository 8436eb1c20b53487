// crates/muswea-config/src/schema.rs
// ============================================================================
// Module: Config Schemas
// Description: JSON schema builders for muswea.toml.
// Purpose: Provide canonical validation schema for config artifacts.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! This module defines the JSON Schema for MuSWEA configuration. The schema
//! is derived from [`ConfigKey`] so key names, types, and defaults cannot
//! drift from the validator. Cross-field window constraints are not
//! expressible in JSON Schema and are only enforced by the validator.

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::config::ConfigKey;
use crate::config::ValueKind;

/// Returns the JSON schema for `muswea.toml`.
#[must_use]
pub fn config_schema() -> Value {
    let mut properties = Map::new();
    for key in ConfigKey::ALL {
        properties.insert(key.as_str().to_string(), key_schema(key));
    }
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "muswea://contract/schemas/config.schema.json",
        "title": "MuSWEA Workflow Configuration",
        "description": "Cross-validation, sliding-window, and PLS settings for the MuSWEA workflow.",
        "type": "object",
        "properties": Value::Object(properties),
        "additionalProperties": true
    })
}

/// Schema for a single configuration key.
fn key_schema(key: ConfigKey) -> Value {
    let mut schema = match key.kind() {
        ValueKind::PositiveInteger => json!({ "type": "integer", "minimum": 1 }),
        ValueKind::Boolean => json!({ "type": "boolean" }),
        ValueKind::UnitInterval => {
            json!({ "type": "number", "exclusiveMinimum": 0, "exclusiveMaximum": 1 })
        }
        ValueKind::IntegerSequence => {
            json!({ "type": "array", "items": { "type": "integer" }, "minItems": 1 })
        }
    };
    if let Value::Object(map) = &mut schema {
        map.insert("description".to_string(), Value::String(key.description().to_string()));
        if let Some(default) = key.default_value().and_then(|value| serde_json::to_value(value).ok())
        {
            map.insert("default".to_string(), default);
        }
    }
    schema
}

// ============================================================================
// SECTION: Tests
// ============================================================================
