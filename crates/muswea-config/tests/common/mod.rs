// crates/muswea-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for muswea-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::sync::Mutex;

use muswea_config::ConfigError;
use muswea_config::ConfigKey;
use muswea_config::EventSink;
use muswea_config::RawConfig;
use muswea_config::ValidationEvent;
use muswea_config::Violation;

/// Result type used by test functions.
pub type TestResult = Result<(), String>;

/// Parses a TOML string into a `RawConfig` for tests.
pub fn raw_from_toml(toml_str: &str) -> Result<RawConfig, String> {
    RawConfig::from_toml_str(toml_str).map_err(|err| err.to_string())
}

/// The literal end-to-end mapping: every default-bearing key at its default.
pub fn full_literal_config() -> RawConfig {
    RawConfig::new()
        .with(ConfigKey::WindowSizeStart, 6)
        .with(ConfigKey::WindowSizeEnd, 12)
        .with(ConfigKey::WindowSizeStep, 2)
        .with(ConfigKey::AlphaThreshold, 0.05)
        .with(ConfigKey::PlsComponents, 10)
        .with(ConfigKey::NumFolds, 5)
        .with(ConfigKey::RandomSeed, 42)
        .with(ConfigKey::ShuffleData, true)
}

/// Asserts a result is an `InvalidConfiguration` for `key` with `violation`.
pub fn assert_invalid<T>(
    result: Result<T, ConfigError>,
    key: &str,
    violation: Violation,
) -> TestResult {
    match result {
        Err(ConfigError::InvalidConfiguration {
            key: actual_key,
            violation: actual,
        }) => {
            if actual_key == key && actual == violation {
                Ok(())
            } else {
                Err(format!("expected {key} {violation}, got {actual_key} {actual}"))
            }
        }
        Err(other) => Err(format!("expected invalid configuration, got {other}")),
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

/// Event sink that keeps every validation event in memory.
#[derive(Default)]
pub struct RecordingSink {
    /// Recorded validation events.
    pub events: Mutex<Vec<ValidationEvent>>,
}

impl EventSink for RecordingSink {
    fn record_validation(&self, event: &ValidationEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
