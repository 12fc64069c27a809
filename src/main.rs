use clap::CommandFactory;
use clap::FromArgMatches;
use clap::Parser;
use clap::Subcommand;
use git_testament::git_testament;
use git_testament::render_testament;
use tracing::error;

use recipes::biom;
use recipes::cooccur;
use recipes::distance;
use recipes::ngs;
use recipes::pbs;
use recipes::research;
use recipes::splitter;
use recipes::table;

git_testament!(TESTAMENT);

#[derive(Parser)]
#[command(author, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    pub subcommand: Subcommands,

    /// Only errors are printed to the stderr stream.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// All available information, including debug information, is printed to
    /// stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum Subcommands {
    /// Manipulates BIOM tables.
    Biom(biom::command::BiomArgs),

    /// Tests two features for co-occurrence or mutual exclusivity.
    Cooccur(cooccur::command::CooccurArgs),

    /// Compares two groups of distances with a permutation test.
    Distance(distance::command::DistanceArgs),

    /// Utilities for next-generation sequencing files.
    Ngs(ngs::command::NgsArgs),

    /// Generates job-array scripts for the PBS scheduler.
    Pbs(pbs::command::PbsArgs),

    /// Plots abundance tables.
    Plot(table::command::PlotArgs),

    /// Creates the files and directories of a research project.
    Research(research::command::ResearchArgs),

    /// Splits a file into chunks of multi-line entries.
    Split(splitter::command::SplitArgs),
}

fn main() {
    let version = render_testament!(TESTAMENT);
    let matches = Cli::command().version(version).get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    let level = if cli.quiet {
        tracing::Level::ERROR
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let result = match cli.subcommand {
        Subcommands::Biom(args) => biom::command::biom(args),
        Subcommands::Cooccur(args) => cooccur::command::cooccur(args),
        Subcommands::Distance(args) => distance::command::distance(args),
        Subcommands::Ngs(args) => ngs::command::ngs(args),
        Subcommands::Pbs(args) => pbs::command::pbs(args),
        Subcommands::Plot(args) => table::command::plot(args),
        Subcommands::Research(args) => research::command::research(args),
        Subcommands::Split(args) => splitter::command::split(args),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
