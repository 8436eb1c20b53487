//! Config load validation tests for muswea-config.
// crates/muswea-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// Purpose: Ensure file input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use muswea_config::ConfigError;
use muswea_config::ConfigValidator;
use muswea_config::MusweaConfig;
use tempfile::NamedTempFile;

mod common;

use common::RecordingSink;
use common::TestResult;

fn assert_load_error(result: Result<MusweaConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(contents: &str) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(contents.as_bytes()).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_reads_partial_file_and_fills_defaults() -> TestResult {
    let file = write_config("NUM_FOLDS = 3\nSHUFFLE_DATA = false\n")?;
    let config = MusweaConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.num_folds != 3 || config.shuffle_data {
        return Err(format!("supplied values not kept: {} {}", config.num_folds, config.shuffle_data));
    }
    if config.window_size_end != 12 || config.chemical_substances.is_some() {
        return Err("unsupplied keys should take defaults".to_string());
    }
    Ok(())
}

#[test]
fn load_reads_substances_list() -> TestResult {
    let file = write_config("CHEMICAL_SUBSTANCES = [5, 7]\n")?;
    let config = MusweaConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.chemical_substances != Some(vec![5, 7]) {
        return Err("substances should load from file".to_string());
    }
    Ok(())
}

#[test]
fn load_rejects_invalid_value() -> TestResult {
    let file = write_config("ALPHA_THRESHOLD = 1.5\n")?;
    assert_load_error(
        MusweaConfig::load(Some(file.path())),
        "invalid config: ALPHA_THRESHOLD must be a number strictly between 0 and 1",
    )
}

#[test]
fn load_rejects_missing_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    match MusweaConfig::load(Some(&path)) {
        Err(ConfigError::Io(_)) => Ok(()),
        Err(other) => Err(format!("expected io error, got {other}")),
        Ok(_) => Err("expected missing file to fail".to_string()),
    }
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let file = write_config("NUM_FOLDS = = 5\n")?;
    assert_load_error(MusweaConfig::load(Some(file.path())), "config parse error")
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    assert_load_error(MusweaConfig::load(Some(Path::new(&long_path))), "config path exceeds max length")
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    assert_load_error(
        MusweaConfig::load(Some(Path::new(&long_component))),
        "config path component too long",
    )
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'#'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_load_error(MusweaConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_load_error(MusweaConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_reports_file_path_as_event_source() -> TestResult {
    let file = write_config("PLS_COMPONENTS = 4\n")?;
    let sink = Arc::new(RecordingSink::default());
    let validator = ConfigValidator::default().with_sink(sink.clone());
    MusweaConfig::load_with(Some(file.path()), &validator).map_err(|err| err.to_string())?;
    let events = sink.events.lock().map_err(|err| err.to_string())?;
    let event = events.first().ok_or("expected one event")?;
    if event.source != file.path().to_string_lossy() {
        return Err(format!("unexpected source {}", event.source));
    }
    Ok(())
}
