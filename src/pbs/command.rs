//! Functionality relating to the `recipes pbs` subcommand itself.

use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use clap::Args;
use clap::Subcommand;
use tracing::info;

use crate::pbs::array::create_job_arrays;
use crate::pbs::array::ArrayOptions;
use crate::pbs::array::JobArray;
use crate::pbs::resources::Resources;
use crate::pbs::scripts::ArrayDirs;
use crate::pbs::scripts::Compression;
use crate::pbs::scripts::Humann2;
use crate::pbs::scripts::Kraken;
use crate::pbs::scripts::KrakenInput;
use crate::pbs::scripts::ScriptBuilder;
use crate::utils::formats::tsv::LabelledTable;

//===============//
// Command setup //
//===============//

/// Command line arguments for `recipes pbs`.
#[derive(Args)]
pub struct PbsArgs {
    /// The subcommand for `recipes pbs`.
    #[command(subcommand)]
    pub subcommand: PbsSubcommand,
}

/// All possible subcommands for `recipes pbs`.
#[derive(Subcommand)]
pub enum PbsSubcommand {
    /// Creates a job array running HUMAnN2 on every sample.
    Humann2(Humann2Args),

    /// Creates a job array running Kraken on every sample.
    Kraken(KrakenArgs),

    /// Creates a job array from a script template.
    Array(ArrayArgs),
}

/// Arguments shared by every `recipes pbs` subcommand.
#[derive(Args)]
pub struct CommonArgs {
    /// Metadata table (TSV) whose first column holds the sample ids.
    #[arg(short, long, value_name = "TSV")]
    metadata: PathBuf,

    /// Directory holding the raw input files.
    #[arg(short, long, value_name = "DIR")]
    raw_dir: PathBuf,

    /// Where to write the launcher script. Defaults to stdout.
    #[arg(short, long, value_name = "PBS")]
    launcher: Option<PathBuf>,

    /// PBS resource requests.
    #[command(flatten)]
    resources: Resources,
}

/// Command line arguments for `recipes pbs humann2`.
#[derive(Args)]
pub struct Humann2Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Directory for the outputs and per-sample scripts.
    #[arg(short, long, value_name = "DIR")]
    out_dir: PathBuf,

    /// Metadata columns naming the input files.
    #[arg(short, long = "column", value_name = "COLUMN", required = true)]
    columns: Vec<String>,
}

/// Command line arguments for `recipes pbs kraken`.
#[derive(Args)]
pub struct KrakenArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Directory for the outputs and per-sample scripts.
    #[arg(short, long, value_name = "DIR")]
    out_dir: PathBuf,

    /// Metadata columns naming single-end input files.
    #[arg(short, long = "column", value_name = "COLUMN")]
    #[arg(conflicts_with_all = ["r1", "r2"], required_unless_present = "r1")]
    columns: Vec<String>,

    /// Metadata columns naming the first mates of paired-end reads.
    #[arg(long, value_name = "COLUMN", requires = "r2")]
    r1: Vec<String>,

    /// Metadata columns naming the second mates of paired-end reads.
    #[arg(long, value_name = "COLUMN", requires = "r1")]
    r2: Vec<String>,

    /// The Kraken database.
    #[arg(long, value_name = "DIR")]
    db: String,

    /// Compression of the input reads.
    #[arg(long, value_enum)]
    compression: Option<Compression>,

    /// The inputs are FASTA rather than FASTQ.
    #[arg(long)]
    fasta: bool,
}

/// Command line arguments for `recipes pbs array`.
#[derive(Args)]
pub struct ArrayArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Script template with `{name}` placeholders for the metadata columns,
    /// `sample`, `raw_dir`, `out` and the resources.
    #[arg(short, long, value_name = "FILE")]
    template: PathBuf,

    /// Name of each per-sample script (without `.pbs`).
    #[arg(short, long, value_name = "NAME")]
    prefix: String,

    /// Directory holding one sub-directory per sample.
    #[arg(long, value_name = "DIR")]
    parent_dir: PathBuf,

    /// Metadata column holding the sample ids. Defaults to the first column.
    #[arg(long, value_name = "COLUMN")]
    sid_column: Option<String>,
}

//==============//
// Main command //
//==============//

/// Main method for the `recipes pbs` subcommand.
pub fn pbs(args: PbsArgs) -> anyhow::Result<()> {
    match args.subcommand {
        PbsSubcommand::Humann2(args) => {
            let builder = Humann2::new(args.columns);
            job_array(args.common, args.out_dir, &builder)
        }
        PbsSubcommand::Kraken(args) => {
            let input = match args.r1.is_empty() {
                true => KrakenInput::Single(args.columns),
                false => KrakenInput::Paired {
                    r1: args.r1,
                    r2: args.r2,
                },
            };
            let mut builder = Kraken::new(input, args.db);
            builder.compression = args.compression;
            builder.fastq = !args.fasta;
            job_array(args.common, args.out_dir, &builder)
        }
        PbsSubcommand::Array(args) => array(args),
    }
}

fn open_launcher(path: Option<&PathBuf>) -> anyhow::Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating launcher: {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(std::io::stdout())),
    }
}

fn read_metadata(common: &CommonArgs) -> anyhow::Result<LabelledTable> {
    let metadata = LabelledTable::read(&common.metadata)
        .with_context(|| format!("reading metadata: {}", common.metadata.display()))?;
    if metadata.row_ids.is_empty() {
        bail!("metadata has no samples: {}", common.metadata.display());
    }
    info!("Loaded metadata for {} samples.", metadata.row_ids.len());
    Ok(metadata)
}

fn job_array(
    common: CommonArgs,
    out_dir: PathBuf,
    builder: &dyn ScriptBuilder,
) -> anyhow::Result<()> {
    info!("Starting pbs {} subcommand.", builder.name());

    let metadata = read_metadata(&common)?;
    let dirs = ArrayDirs {
        raw_dir: &common.raw_dir,
        out_dir: &out_dir,
    };

    let mut out = open_launcher(common.launcher.as_ref())?;
    JobArray::new(&metadata, builder, common.resources.clone()).create(&dirs, &mut out)?;
    out.flush()?;

    Ok(())
}

fn array(args: ArrayArgs) -> anyhow::Result<()> {
    info!("Starting pbs array subcommand.");

    let metadata = read_metadata(&args.common)?;
    let template = std::fs::read_to_string(&args.template)
        .with_context(|| format!("reading template: {}", args.template.display()))?;

    let opts = ArrayOptions {
        sid_column: args.sid_column.as_deref(),
        raw_dir: &args.common.raw_dir,
        prefix: &args.prefix,
        parent_dir: &args.parent_dir,
    };

    let mut out = open_launcher(args.common.launcher.as_ref())?;
    create_job_arrays(
        &metadata,
        &opts,
        &template,
        &args.common.resources,
        &mut out,
    )?;
    out.flush()?;

    Ok(())
}
