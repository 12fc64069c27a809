//! Functionality relating to the `recipes distance` subcommand itself.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use tracing::info;

use crate::distance::compute;
use crate::distance::compute::Alternative;
use crate::distance::compute::PermutationSampler;
use crate::distance::compute::PermutationTest;
use crate::distance::compute::Statistic;
use crate::distance::matrix::DistanceMatrix;
use crate::utils::args::positive_usize;
use crate::utils::args::rng_from_seed;
use crate::utils::formats::tsv::read_pairs;
use crate::utils::interact::time_block;

/// The statistics that can be selected from the command line.
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum StatisticArg {
    /// The mean of the distances in a group.
    Mean,

    /// The median of the distances in a group.
    Median,
}

impl From<StatisticArg> for Statistic {
    fn from(arg: StatisticArg) -> Self {
        match arg {
            StatisticArg::Mean => Statistic::Mean,
            StatisticArg::Median => Statistic::Median,
        }
    }
}

/// Clap arguments for the `recipes distance` subcommand.
#[derive(Args)]
pub struct DistanceArgs {
    /// Distance matrix as a TSV with sample ids in the header and first column.
    #[arg(value_name = "TSV")]
    src: PathBuf,

    /// Pairs of sample ids (two per line) making up the first group.
    #[arg(long = "group-1", value_name = "TSV")]
    group_1: PathBuf,

    /// Pairs of sample ids (two per line) making up the second group.
    #[arg(long = "group-2", value_name = "TSV")]
    group_2: PathBuf,

    /// How the distances within a group are summarized.
    #[arg(short, long, value_enum, default_value = "mean")]
    statistic: StatisticArg,

    /// The alternative hypothesis for the difference (group 2 - group 1).
    #[arg(short, long, value_enum, default_value = "two-sided")]
    alternative: Alternative,

    /// Number of permutations.
    #[arg(short, long, value_name = "USIZE", default_value = "999")]
    #[arg(value_parser = positive_usize)]
    permutations: usize,

    /// Only use distinct, non-identity permutations.
    #[arg(short, long)]
    unique: bool,

    /// Seed for the random number generator.
    #[arg(long, value_name = "U64")]
    seed: Option<u64>,

    /// Leave the permuted statistics out of the output.
    #[arg(long)]
    no_distribution: bool,
}

/// Main function for the `recipes distance` subcommand.
pub fn distance(args: DistanceArgs) -> anyhow::Result<()> {
    info!("Starting distance subcommand.");

    // (1) Load the distance matrix and resolve both groups against it.
    let matrix = DistanceMatrix::read(&args.src)
        .with_context(|| format!("reading distance matrix: {}", args.src.display()))?;
    info!("Loaded distance matrix with {} samples.", matrix.len());

    let group_1 = read_pairs(&args.group_1)
        .and_then(|pairs| matrix.resolve_pairs(&pairs))
        .with_context(|| format!("reading group 1: {}", args.group_1.display()))?;
    let group_2 = read_pairs(&args.group_2)
        .and_then(|pairs| matrix.resolve_pairs(&pairs))
        .with_context(|| format!("reading group 2: {}", args.group_2.display()))?;

    // (2) Set up the test and the permutation sampler.
    let mut rng = rng_from_seed(args.seed);
    let mut test = PermutationTest::new(&matrix, &group_1, &group_2, args.statistic.into())?;
    let mut sampler = match args.unique {
        true => PermutationSampler::unique(matrix.len(), args.permutations, &mut rng)?,
        false => PermutationSampler::random(matrix.len()),
    };
    info!("Observed difference: {}", test.observed());

    // (3) Run the permutations.
    let pb = ProgressBar::new(args.permutations as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:.cyan.bold} {spinner:.green} [{elapsed_precise}] [{bar}] {pos}/{len} ({per_sec}, {eta})")
            .progress_chars("=> "),
    );
    pb.set_prefix("Permuting");

    let mut result = time_block("Permutation test", || {
        compute::run(
            &mut test,
            &mut sampler,
            args.permutations,
            args.alternative,
            &mut rng,
            |k| {
                if k % 100 == 0 {
                    pb.set_position(k as u64);
                }
            },
        )
    })?;
    pb.finish_and_clear();

    // (4) Print the output to stdout as JSON.
    if args.no_distribution {
        result.permuted.clear();
    }

    let output = serde_json::to_string_pretty(&result)?;
    println!("{}", output);

    Ok(())
}
