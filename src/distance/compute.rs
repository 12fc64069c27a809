//! Module holding the logic for permutation tests on distance matrices.
//!
//! # Overview
//!
//! Each group is a list of sample pairs, and each pair contributes one
//! distance. A group is summarized by a [`Statistic`] of its distances, and
//! the test statistic is the difference between the summary of the second
//! group and that of the first.
//!
//! The null distribution is obtained by relabelling the samples: a random
//! permutation `pi` of the sample positions maps every pair `(i, j)` in both
//! groups to `(pi[i], pi[j])`, and the test statistic is recomputed. Two
//! sampling schemes are available:
//!
//! - [`distance_permute_test`] draws permutations independently, so the same
//!   permutation may be drawn more than once.
//! - [`distance_uniq_permute_test`] draws distinct permutations, never the
//!   identity. Only `n! - 1` of those exist for `n` samples, so asking for more
//!   is an error.
//!
//! P-values count the observed statistic as one of the permutations:
//! `p = (count + 1) / (permutations + 1)`, where `count` depends on the
//! [`Alternative`].

use std::collections::HashSet;

use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::distance::matrix::DistanceMatrix;

/// A pair of sample positions in a [`DistanceMatrix`].
pub type Pair = (usize, usize);

/// When there are at most this many non-identity permutations, unique sampling
/// enumerates them all instead of rejection sampling.
const ENUMERATION_LIMIT: u128 = 40_320;

/// Relative tolerance used when comparing permuted statistics against the
/// observed statistic, so that floating point noise does not break ties.
const TIE_TOLERANCE: f64 = 1e-14;

//========//
// Errors //
//========//

/// An error raised when a permutation test cannot be run on its inputs.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum PermutationError {
    /// A group contains no pairs.
    #[error("a group must contain at least one pair of samples")]
    EmptyGroup,

    /// Zero permutations were requested.
    #[error("the number of permutations must be greater than zero")]
    NoPermutations,

    /// A pair refers to a sample outside of the matrix.
    #[error("sample index {index} is out of bounds for a matrix of size {size}")]
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// The number of samples in the matrix.
        size: usize,
    },

    /// More unique permutations were requested than exist.
    #[error(
        "{requested} unique permutations were requested, but only {available} \
        non-identity permutations exist"
    )]
    InsufficientPermutations {
        /// The requested number of permutations.
        requested: usize,
        /// The number of non-identity permutations.
        available: u128,
    },
}

//============//
// Parameters //
//============//

/// How the distances within a group are summarized.
#[derive(Clone, Copy, Debug)]
pub enum Statistic {
    /// The arithmetic mean.
    Mean,

    /// The median (mean of the two middle values for even counts).
    Median,

    /// Any function from a non-empty list of distances to a single value.
    Custom(fn(&[f64]) -> f64),
}

impl Statistic {
    /// Applies the statistic to a non-empty list of values. The values may be
    /// reordered.
    pub fn apply(&self, values: &mut [f64]) -> f64 {
        match self {
            Statistic::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Statistic::Median => {
                values.sort_by(|a, b| a.total_cmp(b));
                let mid = values.len() / 2;
                if values.len() % 2 == 0 {
                    (values[mid - 1] + values[mid]) / 2.0
                } else {
                    values[mid]
                }
            }
            Statistic::Custom(f) => f(values),
        }
    }
}

/// The alternative hypothesis of the test.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alternative {
    /// The groups differ in either direction.
    TwoSided,

    /// The second group's statistic is greater than the first's.
    Greater,

    /// The second group's statistic is less than the first's.
    Less,
}

//=========//
// Results //
//=========//

/// The outcome of a permutation test.
#[derive(Debug, Serialize)]
pub struct PermutationResult {
    /// The observed difference, second group minus first group.
    pub statistic: f64,

    /// The p-value under the selected alternative.
    pub p_value: f64,

    /// The number of permutations performed.
    pub permutations: usize,

    /// The alternative hypothesis.
    pub alternative: Alternative,

    /// Whether the permutations were guaranteed to be unique.
    pub unique: bool,

    /// The test statistic under each permutation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub permuted: Vec<f64>,
}

//=============//
// Aggregation //
//=============//

/// Summarizes the distances of every pair in `group` with `statistic`.
///
/// ```
/// use recipes::distance::compute::{group_dist_agg, Statistic};
/// use recipes::distance::matrix::DistanceMatrix;
///
/// let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
/// let dm = DistanceMatrix::new(
///     ids,
///     vec![
///         vec![0.0, 1.0, 2.0],
///         vec![1.0, 0.0, 6.0],
///         vec![2.0, 6.0, 0.0],
///     ],
/// )
/// .unwrap();
///
/// let group = [(0, 1), (0, 2), (1, 2)];
/// assert_eq!(group_dist_agg(&dm, &group, Statistic::Mean).unwrap(), 3.0);
/// assert_eq!(group_dist_agg(&dm, &group, Statistic::Median).unwrap(), 2.0);
/// ```
pub fn group_dist_agg(
    matrix: &DistanceMatrix,
    group: &[Pair],
    statistic: Statistic,
) -> Result<f64, PermutationError> {
    validate_group(matrix, group)?;
    let mut values: Vec<f64> = group.iter().map(|&(i, j)| matrix.get(i, j)).collect();
    Ok(statistic.apply(&mut values))
}

fn validate_group(matrix: &DistanceMatrix, group: &[Pair]) -> Result<(), PermutationError> {
    if group.is_empty() {
        return Err(PermutationError::EmptyGroup);
    }

    let size = matrix.len();
    for &(i, j) in group {
        for index in [i, j] {
            if index >= size {
                return Err(PermutationError::IndexOutOfBounds { index, size });
            }
        }
    }

    Ok(())
}

//==================//
// Permutation test //
//==================//

/// A two-group comparison on a distance matrix whose null distribution is
/// built by relabelling samples.
pub struct PermutationTest<'a> {
    matrix: &'a DistanceMatrix,
    group_1: &'a [Pair],
    group_2: &'a [Pair],
    statistic: Statistic,
    observed: f64,
    buffer: Vec<f64>,
}

impl<'a> PermutationTest<'a> {
    /// Validates the groups and computes the observed statistic.
    pub fn new(
        matrix: &'a DistanceMatrix,
        group_1: &'a [Pair],
        group_2: &'a [Pair],
        statistic: Statistic,
    ) -> Result<Self, PermutationError> {
        let observed = group_dist_agg(matrix, group_2, statistic)?
            - group_dist_agg(matrix, group_1, statistic)?;

        Ok(PermutationTest {
            matrix,
            group_1,
            group_2,
            statistic,
            observed,
            buffer: Vec::with_capacity(group_1.len().max(group_2.len())),
        })
    }

    /// The observed difference, second group minus first group.
    pub fn observed(&self) -> f64 {
        self.observed
    }

    /// The number of samples being permuted.
    pub fn num_samples(&self) -> usize {
        self.matrix.len()
    }

    /// The difference between the groups after relabelling every sample `i`
    /// as `permutation[i]`.
    pub fn permuted(&mut self, permutation: &[usize]) -> f64 {
        let second = self.remapped(self.group_2, permutation);
        let first = self.remapped(self.group_1, permutation);
        second - first
    }

    fn remapped(&mut self, group: &[Pair], permutation: &[usize]) -> f64 {
        self.buffer.clear();
        self.buffer.extend(
            group
                .iter()
                .map(|&(i, j)| self.matrix.get(permutation[i], permutation[j])),
        );
        self.statistic.apply(&mut self.buffer)
    }
}

//==========//
// Sampling //
//==========//

/// Computes `n!`, returning [`None`] when it does not fit in a `u128`.
///
/// ```
/// use recipes::distance::compute::factorial;
///
/// assert_eq!(factorial(0), Some(1));
/// assert_eq!(factorial(5), Some(120));
/// assert_eq!(factorial(40), None);
/// ```
pub fn factorial(n: usize) -> Option<u128> {
    (1..=n as u128).try_fold(1u128, |acc, k| acc.checked_mul(k))
}

/// Produces the permutations used by a [`PermutationTest`].
pub enum PermutationSampler {
    /// Independent uniform permutations.
    Random {
        /// The number of samples.
        n: usize,
    },

    /// Distinct, non-identity permutations found by rejection sampling.
    Unique {
        /// The number of samples.
        n: usize,
        /// Every permutation handed out so far.
        seen: HashSet<Vec<usize>>,
    },

    /// A pre-shuffled list of every non-identity permutation, consumed from
    /// the back.
    Enumerated(Vec<Vec<usize>>),
}

impl PermutationSampler {
    /// A sampler of independent uniform permutations of `n` positions.
    pub fn random(n: usize) -> Self {
        PermutationSampler::Random { n }
    }

    /// A sampler that hands out up to `requested` distinct, non-identity
    /// permutations of `n` positions.
    pub fn unique<R>(n: usize, requested: usize, rng: &mut R) -> Result<Self, PermutationError>
    where
        R: Rng + ?Sized,
    {
        let available = factorial(n).map(|f| f - 1);

        if let Some(available) = available {
            if requested as u128 > available {
                return Err(PermutationError::InsufficientPermutations {
                    requested,
                    available,
                });
            }

            if available <= ENUMERATION_LIMIT {
                debug!(
                    "Enumerating all {} non-identity permutations of {} samples.",
                    available, n
                );
                let mut all: Vec<Vec<usize>> = (0..n).permutations(n).skip(1).collect();
                all.shuffle(rng);
                all.truncate(requested);
                return Ok(PermutationSampler::Enumerated(all));
            }
        }

        Ok(PermutationSampler::Unique {
            n,
            seen: HashSet::with_capacity(requested),
        })
    }

    /// Draws the next permutation. An enumerating sampler returns [`None`]
    /// once exhausted.
    pub fn draw<R>(&mut self, rng: &mut R) -> Option<Vec<usize>>
    where
        R: Rng + ?Sized,
    {
        match self {
            PermutationSampler::Random { n } => {
                let mut permutation: Vec<usize> = (0..*n).collect();
                permutation.shuffle(rng);
                Some(permutation)
            }
            PermutationSampler::Unique { n, seen } => {
                let mut permutation: Vec<usize> = (0..*n).collect();
                loop {
                    permutation.shuffle(rng);
                    let is_identity = permutation.iter().enumerate().all(|(i, &p)| i == p);
                    if !is_identity && !seen.contains(&permutation) {
                        seen.insert(permutation.clone());
                        return Some(permutation);
                    }
                }
            }
            PermutationSampler::Enumerated(remaining) => remaining.pop(),
        }
    }
}

//==========//
// P-values //
//==========//

/// Computes the p-value of `observed` against the `permuted` statistics.
///
/// ```
/// use recipes::distance::compute::{p_value, Alternative};
///
/// let permuted = [-3.0, -1.0, 0.5, 2.0];
/// assert_eq!(p_value(2.0, &permuted, Alternative::Greater), 0.4);
/// assert_eq!(p_value(2.0, &permuted, Alternative::Less), 1.0);
/// assert_eq!(p_value(2.0, &permuted, Alternative::TwoSided), 0.6);
/// ```
pub fn p_value(observed: f64, permuted: &[f64], alternative: Alternative) -> f64 {
    let gamma = (TIE_TOLERANCE * observed).abs();

    let count = permuted
        .iter()
        .filter(|&&x| match alternative {
            Alternative::TwoSided => x.abs() >= observed.abs() - gamma,
            Alternative::Greater => x >= observed - gamma,
            Alternative::Less => x <= observed + gamma,
        })
        .count();

    (count + 1) as f64 / (permuted.len() + 1) as f64
}

/// Runs `permutations` iterations of `test` with permutations from `sampler`,
/// calling `on_step` after each one.
pub fn run<R, F>(
    test: &mut PermutationTest<'_>,
    sampler: &mut PermutationSampler,
    permutations: usize,
    alternative: Alternative,
    rng: &mut R,
    mut on_step: F,
) -> Result<PermutationResult, PermutationError>
where
    R: Rng + ?Sized,
    F: FnMut(usize),
{
    if permutations == 0 {
        return Err(PermutationError::NoPermutations);
    }

    let mut permuted = Vec::with_capacity(permutations);
    for k in 0..permutations {
        let permutation = match sampler.draw(rng) {
            Some(p) => p,
            None => break,
        };
        permuted.push(test.permuted(&permutation));
        on_step(k + 1);
    }

    let unique = !matches!(sampler, PermutationSampler::Random { .. });
    let observed = test.observed();

    Ok(PermutationResult {
        statistic: observed,
        p_value: p_value(observed, &permuted, alternative),
        permutations: permuted.len(),
        alternative,
        unique,
        permuted,
    })
}

/// Tests whether the distances in `group_2` differ from those in `group_1`,
/// drawing `permutations` independent random relabellings of the samples.
pub fn distance_permute_test<R>(
    matrix: &DistanceMatrix,
    group_1: &[Pair],
    group_2: &[Pair],
    statistic: Statistic,
    alternative: Alternative,
    permutations: usize,
    rng: &mut R,
) -> Result<PermutationResult, PermutationError>
where
    R: Rng + ?Sized,
{
    let mut test = PermutationTest::new(matrix, group_1, group_2, statistic)?;
    let mut sampler = PermutationSampler::random(matrix.len());
    run(
        &mut test,
        &mut sampler,
        permutations,
        alternative,
        rng,
        |_| {},
    )
}

/// Like [`distance_permute_test`], but every relabelling is distinct and none
/// is the identity. Fails if fewer than `permutations` such relabellings
/// exist.
pub fn distance_uniq_permute_test<R>(
    matrix: &DistanceMatrix,
    group_1: &[Pair],
    group_2: &[Pair],
    statistic: Statistic,
    alternative: Alternative,
    permutations: usize,
    rng: &mut R,
) -> Result<PermutationResult, PermutationError>
where
    R: Rng + ?Sized,
{
    let mut test = PermutationTest::new(matrix, group_1, group_2, statistic)?;
    if permutations == 0 {
        return Err(PermutationError::NoPermutations);
    }
    let mut sampler = PermutationSampler::unique(matrix.len(), permutations, rng)?;
    run(
        &mut test,
        &mut sampler,
        permutations,
        alternative,
        rng,
        |_| {},
    )
}
