// crates/muswea-config/src/config.rs
// ============================================================================
// Module: MuSWEA Configuration
// Description: Configuration loading, default injection, and validation.
// Purpose: Provide strict, fail-closed config parsing for the MuSWEA workflow.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration arrives as a raw key/value mapping ([`RawConfig`]), either
//! built in code or parsed from a TOML file. [`validate_and_set_defaults`]
//! fills absent keys from the default table and checks every key in a single
//! linear pass; the first violation aborts with
//! [`ConfigError::InvalidConfiguration`]. [`load_and_validate`] then turns
//! the validated mapping into the typed [`MusweaConfig`] consumed by the
//! cross-validation and windowing steps.
//!
//! Defaults are inserted before their checks, so a broken default surfaces
//! immediately instead of being masked.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use toml::Table;
use toml::Value;

use crate::events::EventSink;
use crate::events::NoopEventSink;
use crate::events::ValidationEvent;
use crate::events::ValidationEventParams;
use crate::events::ValidationOutcome;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "muswea.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "MUSWEA_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Source label for mappings that did not come from a file.
const INLINE_SOURCE: &str = "inline";

/// Default number of cross-validation folds.
pub const DEFAULT_NUM_FOLDS: u64 = 5;
/// Default shuffle flag for cross-validation.
pub const DEFAULT_SHUFFLE_DATA: bool = true;
/// Default random seed for reproducible splits.
pub const DEFAULT_RANDOM_SEED: u64 = 42;
/// Default smallest sliding window size.
pub const DEFAULT_WINDOW_SIZE_START: u64 = 6;
/// Default largest sliding window size.
pub const DEFAULT_WINDOW_SIZE_END: u64 = 12;
/// Default step between window sizes.
pub const DEFAULT_WINDOW_SIZE_STEP: u64 = 2;
/// Default significance threshold for feature elimination.
pub const DEFAULT_ALPHA_THRESHOLD: f64 = 0.05;
/// Default number of PLS components.
pub const DEFAULT_PLS_COMPONENTS: u64 = 10;
/// Target columns shipped with the workflow's default configuration.
pub const DEFAULT_CHEMICAL_SUBSTANCES: [i64; 1] = [5];

// ============================================================================
// SECTION: Keys
// ============================================================================

/// Recognized configuration keys.
///
/// # Invariants
/// - `as_str` values are the canonical on-disk key names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKey {
    /// Number of cross-validation folds.
    NumFolds,
    /// Whether to shuffle before splitting.
    ShuffleData,
    /// Seed for reproducible shuffles.
    RandomSeed,
    /// Target columns to regress.
    ChemicalSubstances,
    /// Smallest sliding window size.
    WindowSizeStart,
    /// Largest sliding window size.
    WindowSizeEnd,
    /// Step between window sizes.
    WindowSizeStep,
    /// Significance threshold for feature elimination.
    AlphaThreshold,
    /// Number of PLS components.
    PlsComponents,
}

/// Value shape a key must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Integer greater than zero.
    PositiveInteger,
    /// Boolean.
    Boolean,
    /// Number strictly between 0 and 1.
    UnitInterval,
    /// Non-empty array of integers.
    IntegerSequence,
}

/// Keys that receive a default when absent, in injection order.
pub const DEFAULTED_KEYS: [ConfigKey; 8] = [
    ConfigKey::NumFolds,
    ConfigKey::ShuffleData,
    ConfigKey::RandomSeed,
    ConfigKey::WindowSizeStart,
    ConfigKey::WindowSizeEnd,
    ConfigKey::WindowSizeStep,
    ConfigKey::AlphaThreshold,
    ConfigKey::PlsComponents,
];

impl ConfigKey {
    /// All recognized keys in reporting order.
    pub const ALL: [Self; 9] = [
        Self::NumFolds,
        Self::ShuffleData,
        Self::RandomSeed,
        Self::ChemicalSubstances,
        Self::WindowSizeStart,
        Self::WindowSizeEnd,
        Self::WindowSizeStep,
        Self::AlphaThreshold,
        Self::PlsComponents,
    ];

    /// Returns the canonical key name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NumFolds => "NUM_FOLDS",
            Self::ShuffleData => "SHUFFLE_DATA",
            Self::RandomSeed => "RANDOM_SEED",
            Self::ChemicalSubstances => "CHEMICAL_SUBSTANCES",
            Self::WindowSizeStart => "WINDOW_SIZE_START",
            Self::WindowSizeEnd => "WINDOW_SIZE_END",
            Self::WindowSizeStep => "WINDOW_SIZE_STEP",
            Self::AlphaThreshold => "ALPHA_THRESHOLD",
            Self::PlsComponents => "PLS_COMPONENTS",
        }
    }

    /// Looks up a key by its canonical name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }

    /// Returns the value shape this key must hold.
    #[must_use]
    pub const fn kind(self) -> ValueKind {
        match self {
            Self::NumFolds
            | Self::RandomSeed
            | Self::WindowSizeStart
            | Self::WindowSizeEnd
            | Self::WindowSizeStep
            | Self::PlsComponents => ValueKind::PositiveInteger,
            Self::ShuffleData => ValueKind::Boolean,
            Self::AlphaThreshold => ValueKind::UnitInterval,
            Self::ChemicalSubstances => ValueKind::IntegerSequence,
        }
    }

    /// Returns a one-line description used by schema and docs.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::NumFolds => "Number of folds for cross-validation.",
            Self::ShuffleData => "Shuffle sample indices before splitting into folds.",
            Self::RandomSeed => "Seed for reproducible shuffles.",
            Self::ChemicalSubstances => "Target variable columns (chemical substances) to regress.",
            Self::WindowSizeStart => "Smallest sliding window size (exclusive upper bound: end).",
            Self::WindowSizeEnd => "Largest sliding window size.",
            Self::WindowSizeStep => "Step between consecutive window sizes.",
            Self::AlphaThreshold => "Significance threshold for feature elimination.",
            Self::PlsComponents => "Number of components for PLS regression.",
        }
    }

    /// Returns the default value, if the key has one.
    #[must_use]
    pub fn default_value(self) -> Option<Value> {
        let value = match self {
            Self::NumFolds => integer_value(DEFAULT_NUM_FOLDS),
            Self::ShuffleData => Value::Boolean(DEFAULT_SHUFFLE_DATA),
            Self::RandomSeed => integer_value(DEFAULT_RANDOM_SEED),
            Self::WindowSizeStart => integer_value(DEFAULT_WINDOW_SIZE_START),
            Self::WindowSizeEnd => integer_value(DEFAULT_WINDOW_SIZE_END),
            Self::WindowSizeStep => integer_value(DEFAULT_WINDOW_SIZE_STEP),
            Self::AlphaThreshold => Value::Float(DEFAULT_ALPHA_THRESHOLD),
            Self::PlsComponents => integer_value(DEFAULT_PLS_COMPONENTS),
            Self::ChemicalSubstances => return None,
        };
        Some(value)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the default table for every default-bearing key.
#[must_use]
pub fn default_table() -> RawConfig {
    let mut config = RawConfig::new();
    for (key, value) in default_entries() {
        config.insert(key.as_str(), value);
    }
    config
}

/// Default-bearing keys paired with their default values, in injection order.
fn default_entries() -> impl Iterator<Item = (ConfigKey, Value)> {
    DEFAULTED_KEYS.into_iter().filter_map(|key| key.default_value().map(|value| (key, value)))
}

// ============================================================================
// SECTION: Raw Configuration
// ============================================================================

/// Untyped configuration mapping as supplied by the caller.
///
/// # Invariants
/// - Values keep their TOML type so type checks see exactly what was written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawConfig(Table);

impl RawConfig {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self(Table::new())
    }

    /// Parses a TOML document whose top-level keys are config keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the document is not valid TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str::<Table>(content)
            .map(Self)
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Renders the mapping as a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when a value cannot be represented.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(&self.0).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Builder-style insert for literal mappings.
    #[must_use]
    pub fn with(mut self, key: ConfigKey, value: impl Into<Value>) -> Self {
        self.insert(key.as_str(), value);
        self
    }

    /// Inserts a value, returning the previous one.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.to_string(), value.into())
    }

    /// Removes a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns true when `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of keys present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no keys are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Borrows the underlying table.
    #[must_use]
    pub const fn as_table(&self) -> &Table {
        &self.0
    }

    /// Consumes the mapping, returning the underlying table.
    #[must_use]
    pub fn into_table(self) -> Table {
        self.0
    }
}

impl From<Table> for RawConfig {
    fn from(table: Table) -> Self {
        Self(table)
    }
}

// ============================================================================
// SECTION: Validation Options
// ============================================================================

/// Handling of `CHEMICAL_SUBSTANCES` when the caller omits it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubstancePolicy {
    /// Validate only when present; never injected.
    #[default]
    Optional,
    /// Inject the given list when absent, then validate it like any default.
    RequiredWithDefault(Vec<i64>),
}

/// Handling of keys outside the recognized set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeyPolicy {
    /// Leave unknown keys in the mapping untouched.
    #[default]
    Preserve,
    /// Fail on the first unknown key.
    Reject,
}

/// Validator options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationOptions {
    /// `CHEMICAL_SUBSTANCES` policy.
    pub substances: SubstancePolicy,
    /// Unknown key policy.
    pub unknown_keys: UnknownKeyPolicy,
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Validates raw mappings and reports outcomes to an event sink.
#[derive(Clone)]
pub struct ConfigValidator {
    /// Active options.
    options: ValidationOptions,
    /// Destination for validation events.
    sink: Arc<dyn EventSink>,
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new(ValidationOptions::default())
    }
}

impl ConfigValidator {
    /// Creates a validator with the given options and a no-op sink.
    #[must_use]
    pub fn new(options: ValidationOptions) -> Self {
        Self {
            options,
            sink: Arc::new(NoopEventSink),
        }
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the active options.
    #[must_use]
    pub const fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Fills absent keys from the defaults and validates the mapping.
    ///
    /// The mapping may be left partially populated on failure; callers must
    /// discard it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfiguration`] for the first violation.
    pub fn validate_and_set_defaults<'a>(
        &self,
        config: &'a mut RawConfig,
    ) -> Result<&'a mut RawConfig, ConfigError> {
        self.validate_from_source(config, INLINE_SOURCE)?;
        Ok(config)
    }

    /// Validates the mapping and converts it into a typed configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfiguration`] for the first violation.
    pub fn load_and_validate(&self, mut raw: RawConfig) -> Result<MusweaConfig, ConfigError> {
        self.validate_from_source(&mut raw, INLINE_SOURCE)?;
        MusweaConfig::from_validated(&raw)
    }

    /// Runs the validation pass and records the outcome.
    pub(crate) fn validate_from_source(
        &self,
        config: &mut RawConfig,
        source: &str,
    ) -> Result<(), ConfigError> {
        let mut defaulted = Vec::new();
        let result = self.apply(config, &mut defaulted);
        let (outcome, key, reason) = match &result {
            Ok(()) => (ValidationOutcome::Valid, None, None),
            Err(err) => (
                ValidationOutcome::Rejected,
                err.key().map(str::to_string),
                Some(err.violation().map_or_else(|| err.to_string(), |v| v.to_string())),
            ),
        };
        self.sink.record_validation(&ValidationEvent::new(ValidationEventParams {
            outcome,
            source: source.to_string(),
            defaulted_keys: defaulted.iter().map(|key| key.as_str().to_string()).collect(),
            key_count: config.len(),
            key,
            reason,
        }));
        result
    }

    /// Default injection, per-key checks, then cross-field checks.
    fn apply(
        &self,
        config: &mut RawConfig,
        defaulted: &mut Vec<ConfigKey>,
    ) -> Result<(), ConfigError> {
        for (key, default) in default_entries() {
            check_value(key, inject(config, key, default, defaulted))?;
        }

        if let SubstancePolicy::RequiredWithDefault(list) = &self.options.substances {
            let default = Value::Array(list.iter().copied().map(Value::Integer).collect());
            inject(config, ConfigKey::ChemicalSubstances, default, defaulted);
        }
        if let Some(value) = config.get(ConfigKey::ChemicalSubstances.as_str()) {
            check_value(ConfigKey::ChemicalSubstances, value)?;
        }

        if self.options.unknown_keys == UnknownKeyPolicy::Reject
            && let Some(name) = config.keys().find(|name| ConfigKey::parse(name).is_none())
        {
            return Err(ConfigError::InvalidConfiguration {
                key: name.to_string(),
                violation: Violation::UnknownKey,
            });
        }

        let start = read_positive(config, ConfigKey::WindowSizeStart)?;
        let end = read_positive(config, ConfigKey::WindowSizeEnd)?;
        let step = read_positive(config, ConfigKey::WindowSizeStep)?;
        check_window_range(start, end, step)
    }
}

/// Validates a raw mapping with default options, filling absent keys.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidConfiguration`] for the first violation.
pub fn validate_and_set_defaults(config: &mut RawConfig) -> Result<&mut RawConfig, ConfigError> {
    ConfigValidator::default().validate_and_set_defaults(config)
}

/// Validates a raw mapping with default options and returns the typed config.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidConfiguration`] for the first violation.
pub fn load_and_validate(raw: RawConfig) -> Result<MusweaConfig, ConfigError> {
    ConfigValidator::default().load_and_validate(raw)
}

/// Inserts `default` when `key` is absent and returns the stored value.
fn inject<'a>(
    config: &'a mut RawConfig,
    key: ConfigKey,
    default: Value,
    defaulted: &mut Vec<ConfigKey>,
) -> &'a Value {
    if !config.contains_key(key.as_str()) {
        defaulted.push(key);
    }
    config.0.entry(key.as_str()).or_insert(default)
}

/// Applies the type/range check for `key`.
fn check_value(key: ConfigKey, value: &Value) -> Result<(), ConfigError> {
    let result = match key.kind() {
        ValueKind::PositiveInteger => {
            positive_integer(value).map(|_| ()).ok_or(Violation::NotPositiveInteger)
        }
        ValueKind::Boolean => value.as_bool().map(|_| ()).ok_or(Violation::NotBoolean),
        ValueKind::UnitInterval => unit_interval(value).map(|_| ()).ok_or(Violation::NotUnitInterval),
        ValueKind::IntegerSequence => integer_sequence(value).map(|_| ()),
    };
    result.map_err(|violation| ConfigError::invalid(key, violation))
}

/// Cross-field window constraints, start/end ordering first.
fn check_window_range(start: u64, end: u64, step: u64) -> Result<(), ConfigError> {
    if start >= end {
        return Err(ConfigError::invalid(ConfigKey::WindowSizeStart, Violation::StartNotBeforeEnd));
    }
    if step > end - start {
        return Err(ConfigError::invalid(ConfigKey::WindowSizeStep, Violation::StepExceedsRange));
    }
    Ok(())
}

/// Returns the value as a positive integer.
fn positive_integer(value: &Value) -> Option<u64> {
    match value {
        Value::Integer(number) if *number > 0 => u64::try_from(*number).ok(),
        _ => None,
    }
}

/// Returns the value when it is a float strictly inside (0, 1).
fn unit_interval(value: &Value) -> Option<f64> {
    // Integers are accepted as numbers but none lies strictly inside (0, 1).
    match value {
        Value::Float(number) if *number > 0.0 && *number < 1.0 => Some(*number),
        _ => None,
    }
}

/// Returns the value as a non-empty list of integers.
fn integer_sequence(value: &Value) -> Result<Vec<i64>, Violation> {
    let Value::Array(items) = value else {
        return Err(Violation::NotIntegerSequence);
    };
    if items.is_empty() {
        return Err(Violation::EmptySequence);
    }
    items.iter().map(|item| item.as_integer().ok_or(Violation::NotIntegerSequence)).collect()
}

/// Reads a positive integer key from a mapping.
fn read_positive(config: &RawConfig, key: ConfigKey) -> Result<u64, ConfigError> {
    config
        .get(key.as_str())
        .and_then(positive_integer)
        .ok_or_else(|| ConfigError::invalid(key, Violation::NotPositiveInteger))
}

/// Converts an unsigned setting to a TOML integer.
///
/// Validated settings never exceed `i64::MAX`; larger values saturate.
fn integer_value(value: u64) -> Value {
    Value::Integer(i64::try_from(value).unwrap_or(i64::MAX))
}

// ============================================================================
// SECTION: Typed Configuration
// ============================================================================

/// Validated MuSWEA workflow configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MusweaConfig {
    /// Number of cross-validation folds.
    #[serde(rename = "NUM_FOLDS")]
    pub num_folds: u64,
    /// Whether to shuffle before splitting.
    #[serde(rename = "SHUFFLE_DATA")]
    pub shuffle_data: bool,
    /// Seed for reproducible shuffles.
    #[serde(rename = "RANDOM_SEED")]
    pub random_seed: u64,
    /// Smallest sliding window size.
    #[serde(rename = "WINDOW_SIZE_START")]
    pub window_size_start: u64,
    /// Largest sliding window size.
    #[serde(rename = "WINDOW_SIZE_END")]
    pub window_size_end: u64,
    /// Step between window sizes.
    #[serde(rename = "WINDOW_SIZE_STEP")]
    pub window_size_step: u64,
    /// Significance threshold for feature elimination.
    #[serde(rename = "ALPHA_THRESHOLD")]
    pub alpha_threshold: f64,
    /// Number of PLS components.
    #[serde(rename = "PLS_COMPONENTS")]
    pub pls_components: u64,
    /// Target columns, when configured.
    #[serde(rename = "CHEMICAL_SUBSTANCES", skip_serializing_if = "Option::is_none")]
    pub chemical_substances: Option<Vec<i64>>,
}

impl Default for MusweaConfig {
    fn default() -> Self {
        Self {
            num_folds: DEFAULT_NUM_FOLDS,
            shuffle_data: DEFAULT_SHUFFLE_DATA,
            random_seed: DEFAULT_RANDOM_SEED,
            window_size_start: DEFAULT_WINDOW_SIZE_START,
            window_size_end: DEFAULT_WINDOW_SIZE_END,
            window_size_step: DEFAULT_WINDOW_SIZE_STEP,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
            pls_components: DEFAULT_PLS_COMPONENTS,
            chemical_substances: Some(DEFAULT_CHEMICAL_SUBSTANCES.to_vec()),
        }
    }
}

impl MusweaConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, &ConfigValidator::default())
    }

    /// Loads configuration from disk with an explicit validator.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with(path: Option<&Path>, validator: &ConfigValidator) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Parse("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Parse("config file must be utf-8".to_string()))?;
        let mut raw = RawConfig::from_toml_str(content)?;
        validator.validate_from_source(&mut raw, &resolved.to_string_lossy())?;
        Self::from_validated(&raw)
    }

    /// Validates a programmatically constructed configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfiguration`] for the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            (ConfigKey::NumFolds, self.num_folds),
            (ConfigKey::RandomSeed, self.random_seed),
            (ConfigKey::WindowSizeStart, self.window_size_start),
            (ConfigKey::WindowSizeEnd, self.window_size_end),
            (ConfigKey::WindowSizeStep, self.window_size_step),
        ];
        for (key, value) in positive {
            check_typed_positive(key, value)?;
        }
        if unit_interval(&Value::Float(self.alpha_threshold)).is_none() {
            return Err(ConfigError::invalid(ConfigKey::AlphaThreshold, Violation::NotUnitInterval));
        }
        check_typed_positive(ConfigKey::PlsComponents, self.pls_components)?;
        if let Some(list) = &self.chemical_substances
            && list.is_empty()
        {
            return Err(ConfigError::invalid(ConfigKey::ChemicalSubstances, Violation::EmptySequence));
        }
        check_window_range(self.window_size_start, self.window_size_end, self.window_size_step)
    }

    /// Returns `(key, value)` pairs in reporting order.
    #[must_use]
    pub fn entries(&self) -> Vec<(ConfigKey, Value)> {
        let mut entries = vec![
            (ConfigKey::NumFolds, integer_value(self.num_folds)),
            (ConfigKey::ShuffleData, Value::Boolean(self.shuffle_data)),
            (ConfigKey::RandomSeed, integer_value(self.random_seed)),
        ];
        if let Some(list) = &self.chemical_substances {
            entries.push((
                ConfigKey::ChemicalSubstances,
                Value::Array(list.iter().copied().map(Value::Integer).collect()),
            ));
        }
        entries.extend([
            (ConfigKey::WindowSizeStart, integer_value(self.window_size_start)),
            (ConfigKey::WindowSizeEnd, integer_value(self.window_size_end)),
            (ConfigKey::WindowSizeStep, integer_value(self.window_size_step)),
            (ConfigKey::AlphaThreshold, Value::Float(self.alpha_threshold)),
            (ConfigKey::PlsComponents, integer_value(self.pls_components)),
        ]);
        entries
    }

    /// Renders the configuration back into a raw mapping.
    #[must_use]
    pub fn to_raw(&self) -> RawConfig {
        let mut raw = RawConfig::new();
        for (key, value) in self.entries() {
            raw.insert(key.as_str(), value);
        }
        raw
    }

    /// Window sizes scanned by the multiscale search: `start`, `start + step`,
    /// and so on up to and including `end`.
    #[must_use]
    pub fn window_sizes(&self) -> Vec<u64> {
        let mut sizes = Vec::new();
        if self.window_size_step == 0 {
            return sizes;
        }
        let mut size = self.window_size_start;
        while size <= self.window_size_end {
            sizes.push(size);
            match size.checked_add(self.window_size_step) {
                Some(next) => size = next,
                None => break,
            }
        }
        sizes
    }

    /// Builds the typed record from an already validated mapping.
    fn from_validated(raw: &RawConfig) -> Result<Self, ConfigError> {
        let shuffle_data = raw
            .get(ConfigKey::ShuffleData.as_str())
            .and_then(Value::as_bool)
            .ok_or_else(|| ConfigError::invalid(ConfigKey::ShuffleData, Violation::NotBoolean))?;
        let alpha_threshold = raw
            .get(ConfigKey::AlphaThreshold.as_str())
            .and_then(unit_interval)
            .ok_or_else(|| {
                ConfigError::invalid(ConfigKey::AlphaThreshold, Violation::NotUnitInterval)
            })?;
        let chemical_substances = raw
            .get(ConfigKey::ChemicalSubstances.as_str())
            .map(integer_sequence)
            .transpose()
            .map_err(|violation| ConfigError::invalid(ConfigKey::ChemicalSubstances, violation))?;
        Ok(Self {
            num_folds: read_positive(raw, ConfigKey::NumFolds)?,
            shuffle_data,
            random_seed: read_positive(raw, ConfigKey::RandomSeed)?,
            window_size_start: read_positive(raw, ConfigKey::WindowSizeStart)?,
            window_size_end: read_positive(raw, ConfigKey::WindowSizeEnd)?,
            window_size_step: read_positive(raw, ConfigKey::WindowSizeStep)?,
            alpha_threshold,
            pls_components: read_positive(raw, ConfigKey::PlsComponents)?,
            chemical_substances,
        })
    }
}

/// Rejects zero and values that do not fit a TOML integer.
fn check_typed_positive(key: ConfigKey, value: u64) -> Result<(), ConfigError> {
    if value == 0 || i64::try_from(value).is_err() {
        return Err(ConfigError::invalid(key, Violation::NotPositiveInteger));
    }
    Ok(())
}

impl TryFrom<RawConfig> for MusweaConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        load_and_validate(raw)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Constraint violated by a configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// Value is not an integer greater than zero.
    NotPositiveInteger,
    /// Value is not a boolean.
    NotBoolean,
    /// Value is not a number strictly between 0 and 1.
    NotUnitInterval,
    /// Sequence is empty.
    EmptySequence,
    /// Value is not a list of integers.
    NotIntegerSequence,
    /// Key is not recognized.
    UnknownKey,
    /// `WINDOW_SIZE_START` is not below `WINDOW_SIZE_END`.
    StartNotBeforeEnd,
    /// `WINDOW_SIZE_STEP` exceeds the window size range.
    StepExceedsRange,
}

impl Violation {
    /// Returns the human-readable constraint text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotPositiveInteger => "must be a positive integer",
            Self::NotBoolean => "must be a boolean",
            Self::NotUnitInterval => "must be a number strictly between 0 and 1",
            Self::EmptySequence => "must not be empty",
            Self::NotIntegerSequence => "must be a list of integers",
            Self::UnknownKey => "is not a recognized configuration key",
            Self::StartNotBeforeEnd => "must be less than WINDOW_SIZE_END",
            Self::StepExceedsRange => {
                "must not exceed the window size range (WINDOW_SIZE_END - WINDOW_SIZE_START)"
            }
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing or size/encoding error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// A key failed its type, range, or cross-field check.
    #[error("invalid config: {key} {violation}")]
    InvalidConfiguration {
        /// Offending key.
        key: String,
        /// Violated constraint.
        violation: Violation,
    },
}

impl ConfigError {
    /// Builds an [`ConfigError::InvalidConfiguration`] for a recognized key.
    fn invalid(key: ConfigKey, violation: Violation) -> Self {
        Self::InvalidConfiguration {
            key: key.as_str().to_string(),
            violation,
        }
    }

    /// Returns the offending key for validation errors.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::InvalidConfiguration {
                key, ..
            } => Some(key),
            Self::Io(_) | Self::Parse(_) => None,
        }
    }

    /// Returns the violated constraint for validation errors.
    #[must_use]
    pub const fn violation(&self) -> Option<Violation> {
        match self {
            Self::InvalidConfiguration {
                violation, ..
            } => Some(*violation),
            Self::Io(_) | Self::Parse(_) => None,
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Parse("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Parse("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Parse("config path component too long".to_string()));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
