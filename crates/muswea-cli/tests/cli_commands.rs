// crates/muswea-cli/tests/cli_commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests for config and folds commands.
// Purpose: Ensure the binary reports valid and invalid input as documented.
// Dependencies: muswea-cli binary
// ============================================================================
//! ## Overview
//! Runs the `muswea` binary against temporary config files and checks exit
//! status, stdout, and stderr.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn muswea_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_muswea"))
}

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("muswea.toml");
    fs::write(&path, contents).expect("write config");
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(muswea_bin())
        .args(args)
        .env_remove("MUSWEA_CONFIG")
        .output()
        .expect("run muswea")
}

fn run_in(dir: &Path, args: &[&str], env_config: Option<&Path>) -> Output {
    let mut command = Command::new(muswea_bin());
    command.args(args).current_dir(dir).env_remove("MUSWEA_CONFIG");
    if let Some(path) = env_config {
        command.env("MUSWEA_CONFIG", path);
    }
    command.output().expect("run muswea")
}

fn run_with_config(subcommand: &[&str], config: &Path) -> Output {
    let path = config.to_string_lossy().into_owned();
    let mut args = subcommand.to_vec();
    args.extend(["--config", path.as_str()]);
    run(&args)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Verifies a partial config validates and prints effective values.
#[test]
fn config_validate_prints_effective_values() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(&dir, "NUM_FOLDS = 3\n");
    let output = run_with_config(&["config", "validate"], &path);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Configuration is valid."));
    assert_eq!(lines.next(), Some("NUM_FOLDS: 3"));
    assert!(text.contains("WINDOW_SIZE_END: 12"));
    assert!(!text.contains("CHEMICAL_SUBSTANCES"));
}

/// Verifies `MUSWEA_CONFIG` is used when no path is given.
#[test]
fn config_validate_reads_env_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let workdir = tempfile::tempdir().expect("workdir");
    let path = write_config(&dir, "NUM_FOLDS = 3\n");
    let output = run_in(workdir.path(), &["config", "validate"], Some(&path));
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("NUM_FOLDS: 3"));
}

/// Verifies `./muswea.toml` is used when neither a path nor the env var is set.
#[test]
fn config_validate_falls_back_to_working_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_config(&dir, "NUM_FOLDS = 7\n");
    let output = run_in(dir.path(), &["config", "validate"], None);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("NUM_FOLDS: 7"));
}

/// Verifies `MUSWEA_CONFIG` takes precedence over `./muswea.toml`.
#[test]
fn config_validate_env_path_beats_working_directory() {
    let env_dir = tempfile::tempdir().expect("env dir");
    let env_path = write_config(&env_dir, "NUM_FOLDS = 3\n");
    let workdir = tempfile::tempdir().expect("workdir");
    write_config(&workdir, "NUM_FOLDS = 7\n");
    let output = run_in(workdir.path(), &["config", "validate"], Some(&env_path));
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("NUM_FOLDS: 3"));
}

/// Verifies an explicit `--config` wins over `MUSWEA_CONFIG`.
#[test]
fn config_validate_explicit_path_beats_env() {
    let env_dir = tempfile::tempdir().expect("env dir");
    let env_path = write_config(&env_dir, "NUM_FOLDS = 3\n");
    let explicit_dir = tempfile::tempdir().expect("explicit dir");
    let explicit = write_config(&explicit_dir, "NUM_FOLDS = 9\n");
    let explicit_arg = explicit.to_string_lossy().into_owned();
    let output = run_in(
        env_dir.path(),
        &["config", "validate", "--config", explicit_arg.as_str()],
        Some(&env_path),
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("NUM_FOLDS: 9"));
}

/// Verifies a missing config file is reported as an error.
#[test]
fn config_validate_reports_missing_file() {
    let workdir = tempfile::tempdir().expect("workdir");
    let output = run_in(workdir.path(), &["config", "validate"], None);
    assert!(!output.status.success());
    assert!(stderr(&output).starts_with("Configuration error:"));
}

/// Verifies `--audit` and `--audit-log` cannot be combined.
#[test]
fn config_validate_rejects_both_audit_flags() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(&dir, "");
    let log = dir.path().join("events.jsonl");
    let log_arg = log.to_string_lossy().into_owned();
    let output = run_with_config(
        &["config", "validate", "--audit", "--audit-log", log_arg.as_str()],
        &path,
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("cannot be used with"));
    assert!(!log.exists());
}

/// Verifies invalid values fail with the offending key on stderr.
#[test]
fn config_validate_reports_invalid_key() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(&dir, "WINDOW_SIZE_START = 12\nWINDOW_SIZE_END = 6\n");
    let output = run_with_config(&["config", "validate"], &path);
    assert!(!output.status.success());
    let message = stderr(&output);
    assert!(message.starts_with("Configuration error:"), "stderr: {message}");
    assert!(message.contains("WINDOW_SIZE_START must be less than WINDOW_SIZE_END"));
    assert!(stdout(&output).is_empty());
}

/// Verifies `--require-substances` injects the default list.
#[test]
fn config_validate_requires_substances_on_request() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(&dir, "");
    let output = run_with_config(&["config", "validate", "--require-substances"], &path);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("CHEMICAL_SUBSTANCES: [5]"));
}

/// Verifies `--reject-unknown` fails on unrecognized keys.
#[test]
fn config_validate_rejects_unknown_on_request() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(&dir, "DATASET = \"spectra.csv\"\n");
    let lenient = run_with_config(&["config", "validate"], &path);
    assert!(lenient.status.success());
    let strict = run_with_config(&["config", "validate", "--reject-unknown"], &path);
    assert!(!strict.status.success());
    assert!(stderr(&strict).contains("DATASET is not a recognized configuration key"));
}

/// Verifies `--audit` writes a JSON event line to stderr.
#[test]
fn config_validate_audit_emits_event() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(&dir, "SHUFFLE_DATA = 1\n");
    let output = run_with_config(&["config", "validate", "--audit"], &path);
    assert!(!output.status.success());
    let message = stderr(&output);
    let event_line = message.lines().next().expect("event line");
    let event: serde_json::Value = serde_json::from_str(event_line).expect("json event");
    assert_eq!(event["event"], "config_rejected");
    assert_eq!(event["key"], "SHUFFLE_DATA");
}

/// Verifies the example and schema commands emit parseable output.
#[test]
fn config_example_and_schema_are_printed() {
    let example = run(&["config", "example"]);
    assert!(example.status.success());
    assert!(stdout(&example).contains("PLS_COMPONENTS = 10"));

    let schema = run(&["config", "schema"]);
    assert!(schema.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&schema)).expect("schema json");
    assert!(value.pointer("/properties/NUM_FOLDS").is_some());
}

/// Verifies docs can be written and then checked.
#[test]
fn config_docs_write_then_check() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("docs").join("muswea.toml.md");
    let path_arg = path.to_string_lossy().into_owned();
    let write = run(&["config", "docs", "--output", path_arg.as_str()]);
    assert!(write.status.success(), "stderr: {}", stderr(&write));
    let check = run(&["config", "docs", "--output", path_arg.as_str(), "--check"]);
    assert!(check.status.success(), "stderr: {}", stderr(&check));

    fs::write(&path, "stale").expect("overwrite docs");
    let drift = run(&["config", "docs", "--output", path_arg.as_str(), "--check"]);
    assert!(!drift.status.success());
}

/// Verifies `--version` prints the package version.
#[test]
fn version_flag_prints_version() {
    let output = run(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("muswea "));
}

// ============================================================================
// SECTION: Folds Commands
// ============================================================================

/// Verifies unshuffled folds print consecutive blocks.
#[test]
fn folds_split_prints_consecutive_blocks_without_shuffle() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(&dir, "NUM_FOLDS = 2\nSHUFFLE_DATA = false\n");
    let output = run_with_config(&["folds", "split", "--samples", "4"], &path);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let expected = "Fold 0:\n  Train: index=[2, 3]\n  Test:  index=[0, 1]\n\
                    Fold 1:\n  Train: index=[0, 1]\n  Test:  index=[2, 3]\n";
    assert_eq!(stdout(&output), expected);
}

/// Verifies JSON output for the default configuration.
#[test]
fn folds_split_json_uses_default_table() {
    let output = run(&["folds", "split", "--samples", "12", "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json");
    assert_eq!(value["kfold"]["n_splits"], 5);
    assert_eq!(value["kfold"]["random_state"], 42);
    assert_eq!(value["folds"].as_object().map(serde_json::Map::len), Some(5));
}

/// Verifies too few samples fail cleanly.
#[test]
fn folds_split_rejects_too_few_samples() {
    let output = run(&["folds", "split", "--samples", "3"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Split error"));
}

/// Verifies an oversized sample count fails with an error instead of aborting.
#[test]
fn folds_split_rejects_sample_count_above_limit() {
    let output = run(&["folds", "split", "--samples", "18446744073709551615"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Split error: n_samples=18446744073709551615 exceeds"));
}

/// Verifies a huge repeat count fails with an error instead of aborting.
#[test]
fn folds_robust_rejects_repeat_count_above_limit() {
    let output = run(&["folds", "robust", "--samples", "3", "--repeats", "4611686018427387903"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Split error: n_repeats=4611686018427387903 exceeds"));
}

/// Verifies seeded repeated k-fold output is reproducible.
#[test]
fn folds_robust_is_reproducible_with_seed() {
    let args = ["folds", "robust", "--samples", "10", "--repeats", "2", "--seed", "5"];
    let first = run(&args);
    let second = run(&args);
    assert!(first.status.success(), "stderr: {}", stderr(&first));
    assert_eq!(stdout(&first), stdout(&second));
    assert_eq!(stdout(&first).matches("Fold ").count(), 8);
}
