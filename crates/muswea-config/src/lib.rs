// crates/muswea-config/src/lib.rs
// ============================================================================
// Module: MuSWEA Config Library
// Description: Canonical config model, validation, and artifact generation.
// Purpose: Single source of truth for muswea.toml semantics.
// Dependencies: serde, serde_json, thiserror, toml
// ============================================================================

//! ## Overview
//! `muswea-config` defines the canonical configuration model for the MuSWEA
//! workflow (multiscale sliding-window elimination with PLS regression). It
//! fills missing keys from a fixed default table, performs strict
//! validate-or-fail checks, and hands out a typed [`MusweaConfig`] that
//! downstream steps read. It also provides deterministic generators for the
//! config schema, example, and docs, plus structured validation events.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod docs;
pub mod events;
pub mod examples;
pub mod schema;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use docs::DocsError;
pub use docs::config_docs_markdown;
pub use docs::verify_config_docs;
pub use docs::write_config_docs;
pub use events::EventSink;
pub use events::FileEventSink;
pub use events::NoopEventSink;
pub use events::SplitEvent;
pub use events::StderrEventSink;
pub use events::ValidationEvent;
pub use examples::config_toml_example;
pub use schema::config_schema;
