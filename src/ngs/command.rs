//! Functionality relating to the `recipes ngs` subcommand itself.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use clap::Subcommand;
use indexmap::IndexMap;
use regex::Regex;
use tracing::info;

use crate::ngs::assembly::compute_n50;
use crate::ngs::lines::count_lines;
use crate::ngs::paired::split_paired_end;
use crate::ngs::samples;
use crate::utils::formats;

//===============//
// Command setup //
//===============//

/// Command line arguments for `recipes ngs`.
#[derive(Args)]
pub struct NgsArgs {
    /// The subcommand for `recipes ngs`.
    #[command(subcommand)]
    pub subcommand: NgsSubcommand,
}

/// All possible subcommands for `recipes ngs`.
#[derive(Subcommand)]
pub enum NgsSubcommand {
    /// Splits an interleaved FASTQ file into R1, R2 and unpaired files.
    SplitPaired(SplitPairedArgs),

    /// Computes the N50 of the contigs in a FASTA file.
    N50(N50Args),

    /// Tabulates the raw sequence files of a directory by sample.
    SampleTable(SampleTableArgs),

    /// Counts the lines of plain or gzipped files.
    CountLines(CountLinesArgs),
}

/// Command line arguments for `recipes ngs split-paired`.
#[derive(Args)]
pub struct SplitPairedArgs {
    /// FASTQ file holding both mates.
    #[arg(value_name = "FASTQ")]
    src: PathBuf,

    /// Prefix of the four output files.
    #[arg(short, long, value_name = "PATH")]
    prefix: PathBuf,
}

/// Command line arguments for `recipes ngs n50`.
#[derive(Args)]
pub struct N50Args {
    /// Assembled contigs.
    #[arg(value_name = "FASTA")]
    src: PathBuf,

    /// Contigs shorter than this are ignored.
    #[arg(short, long, value_name = "USIZE", default_value = "500")]
    cutoff: usize,
}

/// Command line arguments for `recipes ngs sample-table`.
#[derive(Args)]
pub struct SampleTableArgs {
    /// Directory holding the raw sequence files.
    #[arg(value_name = "DIR")]
    dir: PathBuf,

    /// A column and the regex selecting its files, as `NAME=REGEX`. Can be
    /// repeated. Defaults to the paired and unpaired R1 and R2 columns.
    #[arg(short, long = "pattern", value_name = "NAME=REGEX")]
    #[arg(value_parser = named_regex)]
    patterns: Vec<(String, Regex)>,

    /// Regex splitting the sample id off the file name.
    #[arg(long, value_name = "REGEX", default_value = samples::DEFAULT_SAMPLE_ID)]
    sample_id: Regex,

    /// Regex selecting the files to include.
    #[arg(long, value_name = "REGEX", default_value = samples::DEFAULT_SELECT)]
    select: Regex,

    /// Include the files not selected instead.
    #[arg(short, long)]
    negate: bool,

    /// Write the table as a TSV file rather than printing it.
    #[arg(short, long, value_name = "TSV")]
    output: Option<PathBuf>,
}

/// Command line arguments for `recipes ngs count-lines`.
#[derive(Args)]
pub struct CountLinesArgs {
    /// Files to count.
    #[arg(value_name = "FILE", required = true)]
    src: Vec<PathBuf>,
}

/// Parses a `NAME=REGEX` column pattern.
fn named_regex(s: &str) -> Result<(String, Regex), String> {
    let (name, pattern) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=REGEX, found {}", s))?;
    let re = Regex::new(pattern).map_err(|e| e.to_string())?;
    Ok((name.to_string(), re))
}

//==============//
// Main command //
//==============//

/// Main method for the `recipes ngs` subcommand.
pub fn ngs(args: NgsArgs) -> anyhow::Result<()> {
    match args.subcommand {
        NgsSubcommand::SplitPaired(args) => split_paired(args),
        NgsSubcommand::N50(args) => n50(args),
        NgsSubcommand::SampleTable(args) => sample_table(args),
        NgsSubcommand::CountLines(args) => lines(args),
    }
}

fn split_paired(args: SplitPairedArgs) -> anyhow::Result<()> {
    info!("Starting ngs split-paired subcommand.");

    let (paths, counts) = split_paired_end(&args.src, &args.prefix)?;
    for path in &paths {
        info!("Wrote {}", path.display());
    }

    println!("{}", serde_json::to_string_pretty(&counts)?);
    Ok(())
}

fn n50(args: N50Args) -> anyhow::Result<()> {
    info!("Starting ngs n50 subcommand.");

    let lengths = formats::fasta::sequence_lengths(&args.src)?;
    info!("Read {} contigs.", lengths.len());

    println!("{}", compute_n50(lengths, args.cutoff));
    Ok(())
}

fn sample_table(args: SampleTableArgs) -> anyhow::Result<()> {
    info!("Starting ngs sample-table subcommand.");

    let patterns: IndexMap<String, Regex> = match args.patterns.is_empty() {
        true => samples::default_patterns()?,
        false => args.patterns.into_iter().collect(),
    };

    let table = samples::create_sample_table(
        &args.dir,
        &patterns,
        &args.sample_id,
        &args.select,
        args.negate,
    )?;
    info!("Found {} samples.", table.rows.len());

    match args.output {
        Some(path) => {
            let file = std::fs::File::create(&path)
                .with_context(|| format!("creating file: {}", path.display()))?;
            table.write_tsv(file)?;
        }
        None => table.to_table().printstd(),
    }

    Ok(())
}

fn lines(args: CountLinesArgs) -> anyhow::Result<()> {
    info!("Starting ngs count-lines subcommand.");

    for path in &args.src {
        let count = count_lines(path)?;
        println!("{}\t{}", path.display(), count);
    }

    Ok(())
}
