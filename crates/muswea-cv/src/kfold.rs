// crates/muswea-cv/src/kfold.rs
// ============================================================================
// Module: K-Fold Splitter
// Description: Contiguous-block k-fold over optionally shuffled indices.
// Purpose: Deterministic, seedable train/test partitions.
// Dependencies: muswea-config, rand, serde, thiserror
// ============================================================================

//! ## Overview
//! [`KFold`] splits `0..n_samples` into `n_splits` consecutive test blocks.
//! The first `n_samples % n_splits` blocks hold one extra sample. With
//! shuffling enabled the index order is permuted first, using a seeded
//! [`StdRng`] when a random state is set and an entropy-seeded one otherwise.
//!
//! Seeded permutations are stable for a given `rand` version but do not
//! reproduce any other library's shuffle.

use muswea_config::MusweaConfig;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Smallest meaningful number of folds.
pub const MIN_SPLITS: usize = 2;
/// Largest sample count a splitter accepts.
pub const MAX_SAMPLES: usize = 1_000_000;
/// Largest total of train and test index entries one call may produce.
pub const MAX_FOLD_INDICES: usize = 50_000_000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Cross-validation splitting errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CvError {
    /// Fewer than two folds requested.
    #[error("n_splits must be at least {MIN_SPLITS}, got {0}")]
    TooFewSplits(usize),
    /// More folds than samples.
    #[error(
        "cannot have n_splits={n_splits} greater than the number of samples: n_samples={n_samples}"
    )]
    TooFewSamples {
        /// Requested folds.
        n_splits: usize,
        /// Available samples.
        n_samples: usize,
    },
    /// Input and target row counts differ.
    #[error("input and target have inconsistent numbers of samples: [{input}, {target}]")]
    InconsistentLength {
        /// Input rows.
        input: usize,
        /// Target rows.
        target: usize,
    },
    /// A random state was given without shuffling.
    #[error("random_state has no effect unless shuffle is enabled")]
    SeedWithoutShuffle,
    /// Sample count above [`MAX_SAMPLES`].
    #[error("n_samples={n_samples} exceeds the limit of {max}")]
    TooManySamples {
        /// Requested samples.
        n_samples: usize,
        /// Allowed maximum.
        max: usize,
    },
    /// Repeat count above the repeated k-fold limit.
    #[error("n_repeats={n_repeats} exceeds the limit of {max}")]
    TooManyRepeats {
        /// Requested repeats.
        n_repeats: usize,
        /// Allowed maximum.
        max: usize,
    },
    /// Folds would hold more index entries than [`MAX_FOLD_INDICES`].
    #[error("splitting would produce {requested} index entries, exceeding the limit of {max}")]
    TooManyIndices {
        /// Index entries the split would produce, saturated at `usize::MAX`.
        requested: usize,
        /// Allowed maximum.
        max: usize,
    },
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// One train/test partition of sample indices.
///
/// # Invariants
/// - Both index lists are sorted ascending and disjoint.
/// - Their union is `0..n_samples`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fold {
    /// Indices used for fitting.
    pub train_index: Vec<usize>,
    /// Indices held out for evaluation.
    pub test_index: Vec<usize>,
}

/// K-fold splitter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KFold {
    /// Number of folds.
    n_splits: usize,
    /// Whether indices are permuted before blocking.
    shuffle: bool,
    /// Seed for the permutation.
    random_state: Option<u64>,
}

impl KFold {
    /// Creates a splitter.
    ///
    /// # Errors
    ///
    /// Returns [`CvError::TooFewSplits`] when `n_splits < 2` and
    /// [`CvError::SeedWithoutShuffle`] when a seed is given without shuffling.
    pub const fn new(
        n_splits: usize,
        shuffle: bool,
        random_state: Option<u64>,
    ) -> Result<Self, CvError> {
        if n_splits < MIN_SPLITS {
            return Err(CvError::TooFewSplits(n_splits));
        }
        if !shuffle && random_state.is_some() {
            return Err(CvError::SeedWithoutShuffle);
        }
        Ok(Self {
            n_splits,
            shuffle,
            random_state,
        })
    }

    /// Builds a splitter from `NUM_FOLDS`, `SHUFFLE_DATA`, and `RANDOM_SEED`.
    ///
    /// The seed is only used when shuffling.
    ///
    /// # Errors
    ///
    /// Returns [`CvError::TooFewSplits`] when `NUM_FOLDS` is 1.
    pub fn from_config(config: &MusweaConfig) -> Result<Self, CvError> {
        let n_splits = usize::try_from(config.num_folds).unwrap_or(usize::MAX);
        let random_state = config.shuffle_data.then_some(config.random_seed);
        Self::new(n_splits, config.shuffle_data, random_state)
    }

    /// Number of folds.
    #[must_use]
    pub const fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Whether indices are shuffled.
    #[must_use]
    pub const fn shuffle(&self) -> bool {
        self.shuffle
    }

    /// Seed for the permutation, if any.
    #[must_use]
    pub const fn random_state(&self) -> Option<u64> {
        self.random_state
    }

    /// Test block sizes for `n_samples`, in fold order.
    #[must_use]
    pub fn fold_sizes(&self, n_samples: usize) -> Vec<usize> {
        let base = n_samples / self.n_splits;
        let extra = n_samples % self.n_splits;
        (0 .. self.n_splits).map(|fold| base + usize::from(fold < extra)).collect()
    }

    /// Checks that `passes` runs over `n_samples` stay within the limits.
    ///
    /// # Errors
    ///
    /// Returns [`CvError::TooManySamples`] above [`MAX_SAMPLES`],
    /// [`CvError::TooFewSamples`] when `n_samples < n_splits`, and
    /// [`CvError::TooManyIndices`] when the folds would exceed
    /// [`MAX_FOLD_INDICES`] entries.
    pub const fn check_size(&self, n_samples: usize, passes: usize) -> Result<(), CvError> {
        if n_samples > MAX_SAMPLES {
            return Err(CvError::TooManySamples {
                n_samples,
                max: MAX_SAMPLES,
            });
        }
        if n_samples < self.n_splits {
            return Err(CvError::TooFewSamples {
                n_splits: self.n_splits,
                n_samples,
            });
        }
        // Every fold lists each sample once, in train or test.
        let requested = self.n_splits.saturating_mul(n_samples).saturating_mul(passes);
        if requested > MAX_FOLD_INDICES {
            return Err(CvError::TooManyIndices {
                requested,
                max: MAX_FOLD_INDICES,
            });
        }
        Ok(())
    }

    /// Splits `0..n_samples` into folds.
    ///
    /// # Errors
    ///
    /// Returns any error from [`KFold::check_size`] for a single pass.
    pub fn split(&self, n_samples: usize) -> Result<Vec<Fold>, CvError> {
        self.check_size(n_samples, 1)?;
        let mut indices: Vec<usize> = (0 .. n_samples).collect();
        if self.shuffle {
            let mut rng = match self.random_state {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            indices.shuffle(&mut rng);
        }

        let mut folds = Vec::with_capacity(self.n_splits);
        let mut start = 0;
        for size in self.fold_sizes(n_samples) {
            let end = start + size;
            let mut in_test = vec![false; n_samples];
            for &index in &indices[start .. end] {
                in_test[index] = true;
            }
            let (test_index, train_index): (Vec<usize>, Vec<usize>) =
                (0 .. n_samples).partition(|&index| in_test[index]);
            folds.push(Fold {
                train_index,
                test_index,
            });
            start = end;
        }
        Ok(folds)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
