//! Functionality relating to the `recipes cooccur` subcommand itself.

use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::cooccur::compute;
use crate::cooccur::compute::CooccurParams;
use crate::utils::args::fraction_in_range;
use crate::utils::args::positive_usize;
use crate::utils::args::rng_from_seed;
use crate::utils::formats::tsv::LabelledTable;

/// Clap arguments for the `recipes cooccur` subcommand.
#[derive(Args)]
pub struct CooccurArgs {
    /// Abundance table as a TSV with features as rows and samples as columns.
    #[arg(value_name = "TSV")]
    src: PathBuf,

    /// The first feature to test. Without both features, every pair of
    /// features in the table is tested.
    #[arg(short = 'a', long, value_name = "ID", requires = "feature_b")]
    feature_a: Option<String>,

    /// The second feature to test.
    #[arg(short = 'b', long, value_name = "ID", requires = "feature_a")]
    feature_b: Option<String>,

    /// Abundances strictly above this value count as present.
    #[arg(short, long, value_name = "F64", default_value = "0")]
    cutoff: f64,

    /// Pseudocount added when computing the overlap.
    #[arg(long, value_name = "F64", default_value = "1")]
    pseudo: f64,

    /// Number of shuffles.
    #[arg(short, long, value_name = "USIZE", default_value = "1000")]
    #[arg(value_parser = positive_usize)]
    permutations: usize,

    /// Test for mutual exclusivity instead of co-occurrence.
    #[arg(short, long)]
    negate: bool,

    /// When testing all pairs, only report pairs with a p-value at or below
    /// this value.
    #[arg(long, value_name = "F64", default_value = "1.0")]
    #[arg(value_parser = fraction_in_range)]
    alpha: f64,

    /// Seed for the random number generator.
    #[arg(long, value_name = "U64")]
    seed: Option<u64>,

    /// Leave the shuffled scores out of the output.
    #[arg(long)]
    no_distribution: bool,
}

/// Main function for the `recipes cooccur` subcommand.
pub fn cooccur(args: CooccurArgs) -> anyhow::Result<()> {
    info!("Starting cooccur subcommand.");

    let table = LabelledTable::read(&args.src)
        .with_context(|| format!("reading abundance table: {}", args.src.display()))?;
    let data = table.to_numeric()?;
    info!(
        "Loaded {} features across {} samples.",
        table.row_ids.len(),
        table.column_ids.len()
    );

    let params = CooccurParams {
        cutoff: args.cutoff,
        pseudo: args.pseudo,
        permutations: args.permutations,
        negate: args.negate,
    };
    let mut rng = rng_from_seed(args.seed);

    let output = match (args.feature_a, args.feature_b) {
        (Some(a), Some(b)) => {
            let i = match table.row_index(&a) {
                Some(i) => i,
                None => bail!("feature not found in table: {}", a),
            };
            let j = match table.row_index(&b) {
                Some(j) => j,
                None => bail!("feature not found in table: {}", b),
            };

            let mut result = compute::cooccur(&data[i], &data[j], params, &mut rng)
                .with_context(|| format!("testing features {} and {}", a, b))?;

            if args.no_distribution {
                result.distribution.clear();
            }

            serde_json::to_string_pretty(&result)?
        }
        _ => {
            let mut results =
                compute::cooccur_all_pairs(&table.row_ids, &data, params, &mut rng)?;
            results.retain(|r| r.p_value <= args.alpha);
            results.sort_by(|x, y| x.p_value.total_cmp(&y.p_value));
            info!("Reporting {} feature pairs.", results.len());

            serde_json::to_string_pretty(&results)?
        }
    };

    println!("{}", output);
    Ok(())
}
