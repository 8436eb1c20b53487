// crates/muswea-config/src/events.rs
// ============================================================================
// Module: Workflow Events
// Description: Structured events for config validation and fold generation.
// Purpose: Emit JSON-line logs without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines event payloads and sinks for workflow logging. Sinks
//! are lightweight so deployments can route events to their preferred
//! logging pipeline. Every event is a single JSON object per line.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Validation outcome label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// Every check passed.
    Valid,
    /// A check failed and the configuration was rejected.
    Rejected,
}

/// Config validation event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Validation outcome.
    pub outcome: ValidationOutcome,
    /// Source label (file path or `inline`).
    pub source: String,
    /// Keys filled from the default table, in injection order.
    pub defaulted_keys: Vec<String>,
    /// Number of keys present after default injection.
    pub key_count: usize,
    /// Offending key when rejected.
    pub key: Option<String>,
    /// Rejection reason when rejected.
    pub reason: Option<String>,
}

/// Fold generation event payload.
#[derive(Debug, Clone, Serialize)]
pub struct SplitEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Number of samples split.
    pub n_samples: usize,
    /// Folds per repeat.
    pub n_splits: usize,
    /// Whether indices were shuffled.
    pub shuffle: bool,
    /// Random states used, one per repeat (empty when unseeded).
    pub random_states: Vec<u64>,
    /// Test set size of each emitted fold.
    pub test_sizes: Vec<usize>,
}

/// Inputs required to construct a validation event.
pub struct ValidationEventParams {
    /// Validation outcome.
    pub outcome: ValidationOutcome,
    /// Source label (file path or `inline`).
    pub source: String,
    /// Keys filled from the default table.
    pub defaulted_keys: Vec<String>,
    /// Number of keys present after default injection.
    pub key_count: usize,
    /// Offending key when rejected.
    pub key: Option<String>,
    /// Rejection reason when rejected.
    pub reason: Option<String>,
}

/// Inputs required to construct a split event.
pub struct SplitEventParams {
    /// Number of samples split.
    pub n_samples: usize,
    /// Folds per repeat.
    pub n_splits: usize,
    /// Whether indices were shuffled.
    pub shuffle: bool,
    /// Random states used.
    pub random_states: Vec<u64>,
    /// Test set size of each emitted fold.
    pub test_sizes: Vec<usize>,
}

impl ValidationEvent {
    /// Creates a new validation event with a consistent timestamp.
    #[must_use]
    pub fn new(params: ValidationEventParams) -> Self {
        let event = match params.outcome {
            ValidationOutcome::Valid => "config_validated",
            ValidationOutcome::Rejected => "config_rejected",
        };
        Self {
            event,
            timestamp_ms: now_ms(),
            outcome: params.outcome,
            source: params.source,
            defaulted_keys: params.defaulted_keys,
            key_count: params.key_count,
            key: params.key,
            reason: params.reason,
        }
    }
}

impl SplitEvent {
    /// Creates a new split event with a consistent timestamp.
    #[must_use]
    pub fn new(params: SplitEventParams) -> Self {
        Self {
            event: "cv_split",
            timestamp_ms: now_ms(),
            n_samples: params.n_samples,
            n_splits: params.n_splits,
            shuffle: params.shuffle,
            random_states: params.random_states,
            test_sizes: params.test_sizes,
        }
    }
}

/// Milliseconds since the unix epoch, zero if the clock is before it.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Event sink for workflow logging.
pub trait EventSink: Send + Sync {
    /// Record a config validation event.
    fn record_validation(&self, event: &ValidationEvent);

    /// Record a fold generation event.
    fn record_split(&self, _event: &SplitEvent) {}
}

/// Sink that discards every event.
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn record_validation(&self, _event: &ValidationEvent) {}
}

/// Sink that logs JSON lines to stderr.
pub struct StderrEventSink;

impl EventSink for StderrEventSink {
    fn record_validation(&self, event: &ValidationEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_split(&self, event: &SplitEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
pub struct FileEventSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileEventSink {
    /// Opens the event log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Serializes and appends one event line.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl EventSink for FileEventSink {
    fn record_validation(&self, event: &ValidationEvent) {
        self.append(event);
    }

    fn record_split(&self, event: &SplitEvent) {
        self.append(event);
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
