// crates/muswea-cv/src/lib.rs
// ============================================================================
// Module: MuSWEA Cross-Validation Library
// Description: K-fold index splitting driven by the validated configuration.
// Purpose: Produce train/test index partitions for model evaluation.
// Dependencies: muswea-config, rand, serde, thiserror
// ============================================================================

//! ## Overview
//! `muswea-cv` turns a validated [`muswea_config::MusweaConfig`] into
//! train/test index partitions. [`KFold`] is the single-pass splitter;
//! [`create_kfold_splits`] wraps it with input checks and event reporting,
//! and [`robust_kfold_split`] repeats shuffled k-fold with fresh random
//! states for more stable error estimates.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod kfold;
pub mod splits;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use kfold::CvError;
pub use kfold::Fold;
pub use kfold::KFold;
pub use splits::RobustKFold;
pub use splits::create_kfold_splits;
pub use splits::robust_kfold_split;
