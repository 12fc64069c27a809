//! Assembly statistics.

/// Computes the N50 of contig lengths, considering only contigs of at least
/// `cutoff` bases. Returns 0 when no contig passes the cutoff.
///
/// ```
/// use recipes::ngs::assembly::compute_n50;
///
/// let lengths = [
///     400, 500, 502, 655, 634, 605, 590, 584, 552, 549, 545, 545, 542, 536, 526, 521, 517, 513,
/// ];
/// assert_eq!(compute_n50(lengths, 500), 545);
/// assert_eq!(compute_n50([0, 499], 500), 0);
/// ```
pub fn compute_n50<I>(lengths: I, cutoff: usize) -> usize
where
    I: IntoIterator<Item = usize>,
{
    let mut lengths: Vec<usize> = lengths.into_iter().filter(|&l| l >= cutoff).collect();
    let total: usize = lengths.iter().sum();

    lengths.sort_unstable_by(|a, b| b.cmp(a));

    let mut running = 0;
    for length in lengths {
        running += length;
        if 2 * running >= total {
            return length;
        }
    }

    0
}
