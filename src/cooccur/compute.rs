//! Module holding the logic for co-occurrence tests.
//!
//! A feature is present in a sample when its abundance is strictly greater
//! than a cutoff. The overlap of two features is the number of samples where
//! both are present relative to the prevalence of the rarer one, smoothed by a
//! pseudocount. Significance is assessed by shuffling one feature across
//! samples.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::warn;

/// An error raised when a co-occurrence test cannot be computed.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum CooccurError {
    /// The two features were measured on a different number of samples.
    #[error("features have different lengths: {0} and {1}")]
    LengthMismatch(usize, usize),

    /// A feature is absent from, or present in, every sample.
    #[error("one feature is absent or present in all samples")]
    Degenerate,

    /// Zero permutations were requested.
    #[error("the number of permutations must be greater than zero")]
    NoPermutations,
}

/// The outcome of a co-occurrence test.
#[derive(Debug, Serialize)]
pub struct CooccurResult {
    /// The observed overlap (or `1 - overlap` for mutual exclusivity).
    pub observed: f64,

    /// The fraction of shuffles scoring strictly higher than observed.
    pub p_value: f64,

    /// The scores of the shuffled features.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub distribution: Vec<f64>,
}

/// Options shared by every co-occurrence test.
#[derive(Clone, Copy, Debug)]
pub struct CooccurParams {
    /// Abundances strictly above this value count as present.
    pub cutoff: f64,

    /// Pseudocount added to the numerator and denominator of the overlap.
    pub pseudo: f64,

    /// Number of shuffles.
    pub permutations: usize,

    /// Test for mutual exclusivity instead of co-occurrence.
    pub negate: bool,
}

impl Default for CooccurParams {
    fn default() -> Self {
        CooccurParams {
            cutoff: 0.0,
            pseudo: 1.0,
            permutations: 1000,
            negate: false,
        }
    }
}

fn presence(values: &[f64], cutoff: f64) -> Vec<bool> {
    values.iter().map(|&v| v > cutoff).collect()
}

fn overlap_presence(a: &[bool], b: &[bool], pseudo: f64) -> f64 {
    let intersect = a.iter().zip(b).filter(|&(&x, &y)| x && y).count();
    let count_a = a.iter().filter(|&&x| x).count();
    let count_b = b.iter().filter(|&&x| x).count();
    (intersect as f64 + pseudo) / (count_a.min(count_b) as f64 + pseudo)
}

fn check_presence(present: &[bool]) -> Result<(), CooccurError> {
    if present.iter().all(|&p| p) || !present.iter().any(|&p| p) {
        return Err(CooccurError::Degenerate);
    }
    Ok(())
}

/// Computes the overlap of two features:
/// `(|a & b| + pseudo) / (min(|a|, |b|) + pseudo)`.
///
/// ```
/// use recipes::cooccur::compute::overlap;
///
/// let a = [0.0, 3.0, 5.0, 0.0];
/// let b = [1.0, 2.0, 0.0, 0.0];
/// assert_eq!(overlap(&a, &b, 0.0, 0.0).unwrap(), 0.5);
/// assert!(overlap(&a, &[1.0; 4], 0.0, 0.0).is_err());
/// ```
pub fn overlap(a: &[f64], b: &[f64], cutoff: f64, pseudo: f64) -> Result<f64, CooccurError> {
    if a.len() != b.len() {
        return Err(CooccurError::LengthMismatch(a.len(), b.len()));
    }

    let a = presence(a, cutoff);
    let b = presence(b, cutoff);
    check_presence(&a)?;
    check_presence(&b)?;

    Ok(overlap_presence(&a, &b, pseudo))
}

/// Tests whether two features co-occur (or, with `negate`, are mutually
/// exclusive) more than expected by shuffling `b` across samples.
pub fn cooccur<R>(
    a: &[f64],
    b: &[f64],
    params: CooccurParams,
    rng: &mut R,
) -> Result<CooccurResult, CooccurError>
where
    R: Rng + ?Sized,
{
    if params.permutations == 0 {
        return Err(CooccurError::NoPermutations);
    }

    let mut observed = overlap(a, b, params.cutoff, params.pseudo)?;

    let a = presence(a, params.cutoff);
    let mut shuffled = presence(b, params.cutoff);
    let mut distribution = Vec::with_capacity(params.permutations);

    for _ in 0..params.permutations {
        shuffled.shuffle(rng);
        distribution.push(overlap_presence(&a, &shuffled, params.pseudo));
    }

    if params.negate {
        observed = 1.0 - observed;
        for x in distribution.iter_mut() {
            *x = 1.0 - *x;
        }
    }

    let exceeding = distribution.iter().filter(|&&x| x > observed).count();
    let p_value = exceeding as f64 / params.permutations as f64;

    Ok(CooccurResult {
        observed,
        p_value,
        distribution,
    })
}

/// The result of testing one pair of features in a table.
#[derive(Debug, Serialize)]
pub struct PairResult {
    /// The first feature.
    pub feature_a: String,

    /// The second feature.
    pub feature_b: String,

    /// The observed score.
    pub observed: f64,

    /// The p-value.
    pub p_value: f64,
}

/// Tests every unordered pair of features (rows of `data`). Pairs involving a
/// degenerate feature are skipped with a warning.
pub fn cooccur_all_pairs<R>(
    feature_ids: &[String],
    data: &[Vec<f64>],
    params: CooccurParams,
    rng: &mut R,
) -> Result<Vec<PairResult>, CooccurError>
where
    R: Rng + ?Sized,
{
    let mut results = Vec::new();

    for i in 0..data.len() {
        for j in (i + 1)..data.len() {
            match cooccur(&data[i], &data[j], params, rng) {
                Ok(result) => results.push(PairResult {
                    feature_a: feature_ids[i].clone(),
                    feature_b: feature_ids[j].clone(),
                    observed: result.observed,
                    p_value: result.p_value,
                }),
                Err(CooccurError::Degenerate) => {
                    warn!(
                        "Skipping pair ({}, {}): {}",
                        feature_ids[i],
                        feature_ids[j],
                        CooccurError::Degenerate
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn repeat(parts: &[(f64, usize)]) -> Vec<f64> {
        parts
            .iter()
            .flat_map(|&(v, n)| std::iter::repeat(v).take(n))
            .collect()
    }

    // c: --========
    // d: ==--------
    // e: --------==
    // f: =====-----
    // g: ---===----
    fn c() -> Vec<f64> {
        repeat(&[(1.0, 20), (5.0, 80)])
    }

    fn d() -> Vec<f64> {
        repeat(&[(9.0, 20), (1.0, 80)])
    }

    fn e() -> Vec<f64> {
        repeat(&[(1.0, 80), (12.0, 20)])
    }

    fn f() -> Vec<f64> {
        repeat(&[(7.0, 50), (1.0, 50)])
    }

    fn g() -> Vec<f64> {
        repeat(&[(1.0, 30), (9.0, 30), (1.0, 40)])
    }

    fn params(pseudo: f64, negate: bool) -> CooccurParams {
        CooccurParams {
            cutoff: 1.0,
            pseudo,
            permutations: 1000,
            negate,
        }
    }

    fn assert_almost_equal(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-7, "{} != {}", a, b);
    }

    #[test]
    fn test_cooccur_raise() {
        let mut rng = StdRng::seed_from_u64(0);
        let absent = vec![0.0; 100];
        let everywhere = vec![1.0; 100];

        let mut p = CooccurParams::default();
        p.negate = true;
        assert_eq!(
            cooccur(&absent, &c(), p, &mut rng).unwrap_err(),
            CooccurError::Degenerate
        );
        assert_eq!(
            cooccur(&everywhere, &c(), CooccurParams::default(), &mut rng).unwrap_err(),
            CooccurError::Degenerate
        );
    }

    #[test]
    fn test_length_mismatch() {
        assert_eq!(
            overlap(&[1.0, 0.0], &[1.0, 0.0, 1.0], 0.0, 1.0).unwrap_err(),
            CooccurError::LengthMismatch(2, 3)
        );
    }

    #[test]
    fn test_cooccur_mutual_exclusivity() {
        let mut rng = StdRng::seed_from_u64(0);

        let r = cooccur(&c(), &d(), params(2.0, true), &mut rng).unwrap();
        assert_almost_equal(r.observed, 1.0 - 2.0 / (20.0 + 2.0));
        assert_almost_equal(r.p_value, 0.0);

        let r = cooccur(&c(), &c(), params(2.0, true), &mut rng).unwrap();
        assert_almost_equal(r.observed, 0.0);
        assert_almost_equal(r.p_value, 1.0);

        let r = cooccur(&c(), &e(), params(2.0, true), &mut rng).unwrap();
        assert_almost_equal(r.observed, 0.0);
        assert!(r.p_value > 0.98);

        let r = cooccur(&c(), &f(), params(2.0, true), &mut rng).unwrap();
        assert_almost_equal(r.observed, 1.0 - (30.0 + 2.0) / (50.0 + 2.0));
        assert_almost_equal(r.p_value, 0.0);

        let r = cooccur(&f(), &g(), params(2.0, true), &mut rng).unwrap();
        assert_almost_equal(r.observed, 1.0 - (20.0 + 2.0) / (30.0 + 2.0));
        assert!(r.p_value > 0.9);
    }

    #[test]
    fn test_cooccur_coexistence() {
        let mut rng = StdRng::seed_from_u64(0);

        let r = cooccur(&c(), &d(), params(0.0, false), &mut rng).unwrap();
        assert_almost_equal(r.observed, 0.0);
        assert_eq!(r.p_value, 1.0);

        let r = cooccur(&c(), &c(), params(0.0, false), &mut rng).unwrap();
        assert_almost_equal(r.observed, 1.0);
        assert_eq!(r.p_value, 0.0);
        assert_eq!(r.distribution.len(), 1000);
    }

    #[test]
    fn test_all_pairs_skips_degenerate_features() {
        let mut rng = StdRng::seed_from_u64(0);
        let ids = vec!["c".to_string(), "flat".to_string(), "f".to_string()];
        let data = vec![c(), vec![1.0; 100], f()];
        let mut p = params(1.0, false);
        p.permutations = 50;

        let results = cooccur_all_pairs(&ids, &data, p, &mut rng).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].feature_a, "c");
        assert_eq!(results[0].feature_b, "f");
    }
}
