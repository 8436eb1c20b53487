// crates/muswea-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payloads.
// Purpose: Deterministic examples for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for MuSWEA configuration. Output is deterministic and
//! kept in sync with the default table, schema, and docs.

/// Returns a canonical example `muswea.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r"# Cross-validation settings
NUM_FOLDS = 5
SHUFFLE_DATA = true
RANDOM_SEED = 42

# Target variable columns
CHEMICAL_SUBSTANCES = [5]

# MuSWEA (Multiscale Sliding Window Elimination Algorithm) parameters
WINDOW_SIZE_START = 6
WINDOW_SIZE_END = 12
WINDOW_SIZE_STEP = 2
ALPHA_THRESHOLD = 0.05

# Partial Least Squares (PLS) regression parameters
PLS_COMPONENTS = 10
",
    )
}
