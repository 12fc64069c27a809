//! Functionality related to the `recipes biom` command itself.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use clap::Subcommand;
use noodles::fasta;
use tracing::info;

use crate::biom::seqs;
use crate::biom::seqs::SizeSource;
use crate::biom::table;
use crate::biom::table::BiomTable;
use crate::utils::formats;

//===============//
// Command setup //
//===============//

/// Command line arguments for `recipes biom`.
#[derive(Args)]
pub struct BiomArgs {
    /// The subcommand for `recipes biom`.
    #[command(subcommand)]
    pub subcommand: BiomSubcommand,
}

/// All possible subcommands for `recipes biom`.
#[derive(Subcommand)]
pub enum BiomSubcommand {
    /// Trims the exact sequence variants and collapses the table.
    TrimCollapse(TrimCollapseArgs),

    /// Writes the sequences of a table into a FASTA file.
    ToFasta(ToFastaArgs),
}

/// Command line arguments for `recipes biom trim-collapse`.
#[derive(Args)]
pub struct TrimCollapseArgs {
    /// Input BIOM table (JSON).
    #[arg(short, long, value_name = "BIOM")]
    input: PathBuf,

    /// Output BIOM table (JSON).
    #[arg(short, long, value_name = "BIOM")]
    output: PathBuf,

    /// Trim all sequences to this length (0 for full length).
    #[arg(short, long, value_name = "USIZE")]
    length: usize,
}

/// Command line arguments for `recipes biom to-fasta`.
#[derive(Args)]
pub struct ToFastaArgs {
    /// Input BIOM table (JSON).
    #[arg(short, long, value_name = "BIOM")]
    input: PathBuf,

    /// Output FASTA file.
    #[arg(short, long, value_name = "FASTA")]
    output: PathBuf,

    /// Put the size field in each sequence name as the sum of the sequence in
    /// the table.
    #[arg(short, long)]
    sizeout: bool,

    /// Name of the sample to get the sizes for (if --sizeout is set). All
    /// samples are summed when omitted.
    #[arg(long, value_name = "ID", requires = "sizeout")]
    sample_id: Option<String>,
}

//==============//
// Main command //
//==============//

/// Main method for the `recipes biom` subcommand.
pub fn biom(args: BiomArgs) -> anyhow::Result<()> {
    match args.subcommand {
        BiomSubcommand::TrimCollapse(args) => trim_collapse(args),
        BiomSubcommand::ToFasta(args) => to_fasta(args),
    }
}

fn trim_collapse(args: TrimCollapseArgs) -> anyhow::Result<()> {
    info!("Starting biom trim-collapse subcommand.");

    let table = BiomTable::read(&args.input)?;
    info!(
        "Read {} observations across {} samples.",
        table.observations.len(),
        table.samples.len()
    );

    let collapsed = table::trim_collapse(&table, args.length);
    info!(
        "Collapsed into {} observations at {}nt.",
        collapsed.observations.len(),
        args.length
    );

    collapsed
        .write(&args.output)
        .with_context(|| format!("writing BIOM table: {}", args.output.display()))
}

fn to_fasta(args: ToFastaArgs) -> anyhow::Result<()> {
    info!("Starting biom to-fasta subcommand.");

    let table = BiomTable::read(&args.input)?;
    let mut sink = formats::fasta::create(&args.output)?;
    let mut writer = fasta::Writer::new(&mut sink);

    let sizes = match (args.sizeout, args.sample_id.as_deref()) {
        (false, _) => SizeSource::None,
        (true, None) => SizeSource::AllSamples,
        (true, Some(id)) => SizeSource::Sample(id),
    };

    let written = seqs::seqs_to_fasta(&table, &mut writer, sizes)
        .with_context(|| format!("writing FASTA file: {}", args.output.display()))?;
    drop(writer);
    sink.flush().with_context(|| format!("writing FASTA file: {}", args.output.display()))?;

    info!("Wrote {} sequences.", written);
    Ok(())
}
