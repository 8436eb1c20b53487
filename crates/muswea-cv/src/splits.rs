// crates/muswea-cv/src/splits.rs
// ============================================================================
// Module: Dataset Splits
// Description: K-fold and repeated k-fold over paired input/target rows.
// Purpose: Check row counts, produce folds, and report them to an event sink.
// Dependencies: muswea-config, rand
// ============================================================================

//! ## Overview
//! Both entry points take the input and target rows only to check that they
//! line up; splitting works on indices. Each call reports one `cv_split`
//! event to the supplied [`EventSink`].

use std::collections::BTreeMap;

use muswea_config::EventSink;
use muswea_config::events::SplitEvent;
use muswea_config::events::SplitEventParams;
use rand::Rng;

use crate::kfold::CvError;
use crate::kfold::Fold;
use crate::kfold::KFold;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default folds per repeat for repeated k-fold.
pub const DEFAULT_ROBUST_SPLITS: usize = 4;
/// Default repeat count for repeated k-fold.
pub const DEFAULT_ROBUST_REPEATS: usize = 10;
/// Largest repeat count for repeated k-fold.
pub const MAX_REPEATS: usize = 1_000;
/// Random states are drawn from `1..RANDOM_STATE_BOUND`.
const RANDOM_STATE_BOUND: u64 = 1000;

// ============================================================================
// SECTION: K-Fold
// ============================================================================

/// Splits paired rows with `kfold`, keyed by fold number.
///
/// Returns the folds together with the splitter that produced them.
///
/// # Errors
///
/// Returns [`CvError::InconsistentLength`] when the row counts differ, or
/// any error raised by [`KFold::split`].
pub fn create_kfold_splits<X, Y>(
    input: &[X],
    target: &[Y],
    kfold: KFold,
    sink: &dyn EventSink,
) -> Result<(BTreeMap<usize, Fold>, KFold), CvError> {
    let n_samples = check_lengths(input, target)?;
    let folds = kfold.split(n_samples)?;
    sink.record_split(&SplitEvent::new(SplitEventParams {
        n_samples,
        n_splits: kfold.n_splits(),
        shuffle: kfold.shuffle(),
        random_states: kfold.random_state().into_iter().collect(),
        test_sizes: folds.iter().map(|fold| fold.test_index.len()).collect(),
    }));
    Ok((folds.into_iter().enumerate().collect(), kfold))
}

// ============================================================================
// SECTION: Repeated K-Fold
// ============================================================================

/// Repeated shuffled k-fold settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobustKFold {
    /// Folds per repeat.
    pub n_splits: usize,
    /// Number of repeats.
    pub n_repeats: usize,
}

impl Default for RobustKFold {
    fn default() -> Self {
        Self {
            n_splits: DEFAULT_ROBUST_SPLITS,
            n_repeats: DEFAULT_ROBUST_REPEATS,
        }
    }
}

/// Runs `n_repeats` shuffled k-fold passes, each with a random state drawn
/// from `rng`, and concatenates their folds.
///
/// # Errors
///
/// Returns [`CvError::InconsistentLength`] when the row counts differ,
/// [`CvError::TooManyRepeats`] above [`MAX_REPEATS`], or any error raised by
/// [`KFold::new`] or [`KFold::check_size`]. All checks run before any pass.
pub fn robust_kfold_split<X, Y, R>(
    input: &[X],
    target: &[Y],
    settings: &RobustKFold,
    rng: &mut R,
    sink: &dyn EventSink,
) -> Result<Vec<Fold>, CvError>
where
    R: Rng + ?Sized,
{
    let n_samples = check_lengths(input, target)?;
    if settings.n_repeats > MAX_REPEATS {
        return Err(CvError::TooManyRepeats {
            n_repeats: settings.n_repeats,
            max: MAX_REPEATS,
        });
    }
    KFold::new(settings.n_splits, true, None)?.check_size(n_samples, settings.n_repeats)?;

    let capacity = settings.n_splits.checked_mul(settings.n_repeats).unwrap_or_default();
    let mut folds = Vec::with_capacity(capacity);
    let mut random_states = Vec::with_capacity(settings.n_repeats);
    for _ in 0 .. settings.n_repeats {
        let random_state = rng.gen_range(1 .. RANDOM_STATE_BOUND);
        let kfold = KFold::new(settings.n_splits, true, Some(random_state))?;
        folds.extend(kfold.split(n_samples)?);
        random_states.push(random_state);
    }
    sink.record_split(&SplitEvent::new(SplitEventParams {
        n_samples,
        n_splits: settings.n_splits,
        shuffle: true,
        random_states,
        test_sizes: folds.iter().map(|fold| fold.test_index.len()).collect(),
    }));
    Ok(folds)
}

/// Returns the shared row count.
const fn check_lengths<X, Y>(input: &[X], target: &[Y]) -> Result<usize, CvError> {
    if input.len() != target.len() {
        return Err(CvError::InconsistentLength {
            input: input.len(),
            target: target.len(),
        });
    }
    Ok(input.len())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
