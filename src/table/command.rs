//! Functionality related to the `recipes plot` command itself.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use clap::Subcommand;
use tracing::debug;
use tracing::info;

use crate::table::abundance::AbundanceTable;
use crate::table::abundance::Grouping;
use crate::table::plot::AbundancePrevalenceAveragePlot;
use crate::table::plot::AbundancePrevalencePlot;
use crate::table::plot::RankAbundancePlot;
use crate::table::plot::TablePlot;
use crate::utils::args::fraction_in_range;

//===============//
// Command setup //
//===============//

/// Command line arguments for `recipes plot`.
#[derive(Args)]
pub struct PlotArgs {
    /// The subcommand for `recipes plot`.
    #[command(subcommand)]
    pub subcommand: PlotSubcommand,
}

/// All possible subcommands for `recipes plot`.
#[derive(Subcommand)]
pub enum PlotSubcommand {
    /// Plots rank abundance curves.
    RankAbundance(RankAbundanceArgs),

    /// Plots a prevalence curve per feature.
    Prevalence(PrevalenceArgs),

    /// Plots a prevalence curve per group of samples.
    PrevalenceAverage(PrevalenceAverageArgs),
}

/// Arguments shared by every `recipes plot` subcommand.
#[derive(Args)]
pub struct TableArgs {
    /// Abundance table (TSV) with samples as rows and features as columns.
    #[arg(value_name = "TSV")]
    src: PathBuf,

    /// The table holds features as rows and samples as columns.
    #[arg(short, long)]
    transpose: bool,

    /// Headerless two-column TSV assigning each sample to a group. All
    /// samples form one group when omitted.
    #[arg(short, long, value_name = "TSV")]
    grouping: Option<PathBuf>,

    /// Plot abundances on a linear rather than a logarithmic scale.
    #[arg(long)]
    linear: bool,

    /// Opacity of the lines.
    #[arg(long, value_name = "F64", default_value = "0.5")]
    #[arg(value_parser = fraction_in_range)]
    alpha: f64,

    /// The directory to output the plot within.
    #[arg(short, long, value_name = "PATH")]
    output_directory: Option<PathBuf>,
}

/// Command line arguments for `recipes plot rank-abundance`.
#[derive(Args)]
pub struct RankAbundanceArgs {
    #[command(flatten)]
    table: TableArgs,

    /// Plot the mean of each group instead of each sample.
    #[arg(short, long)]
    average: bool,
}

/// Command line arguments for `recipes plot prevalence`.
#[derive(Args)]
pub struct PrevalenceArgs {
    #[command(flatten)]
    table: TableArgs,

    /// Only plot features present in more than this fraction of a group.
    #[arg(long, value_name = "F64", default_value = "0.2")]
    #[arg(value_parser = fraction_in_range)]
    min_prev: f64,
}

/// Command line arguments for `recipes plot prevalence-average`.
#[derive(Args)]
pub struct PrevalenceAverageArgs {
    #[command(flatten)]
    table: TableArgs,

    /// Distance between consecutive abundance cutoffs.
    #[arg(long, value_name = "F64", default_value = "0.01")]
    step: f64,
}

//==============//
// Main command //
//==============//

/// Main method for the `recipes plot` subcommand.
pub fn plot(args: PlotArgs) -> anyhow::Result<()> {
    match args.subcommand {
        PlotSubcommand::RankAbundance(args) => {
            let p = RankAbundancePlot {
                log: !args.table.linear,
                average: args.average,
                alpha: args.table.alpha,
            };
            render(args.table, &p)
        }
        PlotSubcommand::Prevalence(args) => {
            let p = AbundancePrevalencePlot {
                log: !args.table.linear,
                min_prev: args.min_prev,
                alpha: args.table.alpha,
            };
            render(args.table, &p)
        }
        PlotSubcommand::PrevalenceAverage(args) => {
            let p = AbundancePrevalenceAveragePlot {
                log: !args.table.linear,
                step: args.step,
                alpha: args.table.alpha,
            };
            render(args.table, &p)
        }
    }
}

fn render(args: TableArgs, p: &dyn TablePlot) -> anyhow::Result<()> {
    info!("Starting plot subcommand: {}", p.name());

    //========//
    // Source //
    //========//

    let table = AbundanceTable::read(&args.src, args.transpose)
        .with_context(|| format!("invalid abundance table: {}", args.src.display()))?;
    debug!(
        "  [*] Source: {} ({} samples, {} features)",
        args.src.display(),
        table.sample_ids.len(),
        table.feature_ids.len()
    );

    let grouping = match &args.grouping {
        Some(path) => Grouping::read(path, &table.sample_ids)
            .with_context(|| format!("invalid grouping: {}", path.display()))?,
        None => Grouping::single("all", table.sample_ids.len()),
    };
    debug!("  [*] Groups: {}", grouping.len());

    //==================//
    // Output Directory //
    //==================//

    let output_directory = match args.output_directory {
        Some(o) => o,
        None => std::env::current_dir().context("retrieving the current working directory")?,
    };

    let plot = p.generate(&table, &grouping)?;

    let mut filename = output_directory;
    filename.push(String::from(p.filename()) + ".html");

    info!("  [*] Writing {} to {}", p.name(), filename.display());
    plot.write_html(filename);

    Ok(())
}
