//! Summaries of abundance vectors.

/// Computes the prevalence at each abundance cutoff: the fraction of values
/// strictly above the cutoff. The cutoffs are the sorted unique values.
///
/// ```
/// use recipes::table::stats::compute_prevalence;
///
/// let (x, y) = compute_prevalence(&[0.0, 0.0, 1.0, 2.0, 4.0, 1.0]);
/// assert_eq!(x, vec![0.0, 1.0, 2.0, 4.0]);
/// assert_eq!(y, vec![4.0 / 6.0, 2.0 / 6.0, 1.0 / 6.0, 0.0]);
/// ```
pub fn compute_prevalence(abundance: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut sorted = abundance.to_vec();
    sorted.sort_by(f64::total_cmp);

    let total = sorted.len() as f64;
    let mut cutoffs: Vec<f64> = Vec::new();
    let mut prevalences = Vec::new();

    for (i, &value) in sorted.iter().enumerate() {
        // The last copy of a value sets its cumulative count.
        if sorted.get(i + 1) == Some(&value) {
            continue;
        }
        cutoffs.push(value);
        prevalences.push((total - (i + 1) as f64) / total);
    }

    (cutoffs, prevalences)
}

/// Sorts the values in descending order and drops the trailing zeros.
///
/// ```
/// use recipes::table::stats::sort_trim;
///
/// assert_eq!(sort_trim(vec![0.0, 3.0, 1.0, 0.0, 2.0]), vec![3.0, 2.0, 1.0]);
/// ```
pub fn sort_trim(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(|a, b| b.total_cmp(a));
    while values.last() == Some(&0.0) {
        values.pop();
    }
    values
}

/// The fraction of values strictly above `cutoff`.
pub fn fraction_above(values: &[f64], cutoff: f64) -> f64 {
    match values.len() {
        0 => 0.0,
        n => values.iter().filter(|&&v| v > cutoff).count() as f64 / n as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prevalence_of_constant() {
        let (x, y) = compute_prevalence(&[2.0, 2.0]);
        assert_eq!(x, vec![2.0]);
        assert_eq!(y, vec![0.0]);
    }

    #[test]
    fn test_prevalence_of_empty() {
        let (x, y) = compute_prevalence(&[]);
        assert!(x.is_empty() && y.is_empty());
    }

    #[test]
    fn test_sort_trim_all_zero() {
        assert!(sort_trim(vec![0.0, 0.0]).is_empty());
    }

    #[test]
    fn test_fraction_above() {
        assert_eq!(fraction_above(&[0.0, 1.0, 2.0, 3.0], 1.0), 0.5);
        assert_eq!(fraction_above(&[], 1.0), 0.0);
    }
}
