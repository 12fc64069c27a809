//! Small scoring helpers.

/// Computes the accuracy of `predicted` against `observed`, where each
/// prediction contributes its weight when correct. Returns [`None`] if the
/// inputs have different lengths or the weights sum to zero.
///
/// ```
/// use recipes::utils::metrics::weighted_score;
///
/// let observed = ["y", "y", "n", "n", "n"];
/// let predicted = ["y", "n", "n", "y", "n"];
/// let weights = [2.0, 1.0, 2.0, 3.0, 2.0];
/// assert_eq!(weighted_score(&observed, &predicted, &weights), Some(0.6));
/// ```
pub fn weighted_score<T>(observed: &[T], predicted: &[T], weights: &[f64]) -> Option<f64>
where
    T: PartialEq,
{
    if observed.len() != predicted.len() || observed.len() != weights.len() {
        return None;
    }

    let total: f64 = weights.iter().sum();
    if total == 0.0 {
        return None;
    }

    let agreed: f64 = observed
        .iter()
        .zip(predicted)
        .zip(weights)
        .filter(|((o, p), _)| o == p)
        .map(|(_, w)| w)
        .sum();

    Some(agreed / total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_score_length_mismatch() {
        assert_eq!(weighted_score(&[1, 2], &[1], &[1.0, 1.0]), None);
    }

    #[test]
    fn test_weighted_score_all_correct() {
        assert_eq!(weighted_score(&[1, 2], &[1, 2], &[0.5, 3.0]), Some(1.0));
    }
}
