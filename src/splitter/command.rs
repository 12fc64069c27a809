//! Functionality relating to the `recipes split` subcommand itself.

use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use clap::Args;
use regex::Regex;
use tracing::info;

use crate::splitter::EntryBoundary;
use crate::splitter::EntryId;
use crate::splitter::EntryTail;
use crate::splitter::Matches;
use crate::splitter::Splitter;
use crate::utils::args::positive_usize;
use crate::utils::display::RecordCounter;
use crate::utils::formats::open_maybe_gzipped;
use crate::utils::pathbuf::AppendSuffix;

/// How entry boundaries are recognised.
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum SplitMode {
    /// Lines matching the pattern start an entry (FASTA `^>`).
    Head,

    /// Lines matching the pattern end an entry (GenBank `^//`).
    Tail,

    /// Lines sharing a column value belong to one entry (GFF).
    Id,
}

/// Clap arguments for the `recipes split` subcommand.
#[derive(Args)]
pub struct SplitArgs {
    /// The file to split.
    #[arg(value_name = "FILE")]
    src: PathBuf,

    /// How entry boundaries are recognised.
    #[arg(short, long, value_enum, default_value = "head")]
    mode: SplitMode,

    /// Regex recognising the head or tail line of an entry. Required unless
    /// the mode is `id`.
    #[arg(short, long, value_name = "REGEX")]
    pattern: Option<Regex>,

    /// Zero-based tab-delimited column holding the entry id in `id` mode.
    #[arg(short, long, value_name = "USIZE")]
    column: Option<usize>,

    /// Number of entries per output file.
    #[arg(short = 'n', long, value_name = "USIZE", default_value = "1000")]
    #[arg(value_parser = positive_usize)]
    chunk_size: usize,

    /// Prefix of the output files. Defaults to the input path without its
    /// extension.
    #[arg(short, long, value_name = "PATH")]
    output_prefix: Option<PathBuf>,

    /// Lines matching this regex are dropped.
    #[arg(short, long, value_name = "REGEX")]
    ignore: Option<Regex>,

    /// Trim surrounding whitespace from every line.
    #[arg(long)]
    trim: bool,
}

fn boundary(args: &SplitArgs) -> anyhow::Result<Box<dyn EntryBoundary>> {
    let boundary: Box<dyn EntryBoundary> = match (args.mode, &args.pattern) {
        (SplitMode::Head, Some(re)) => Box::new(Matches::new(re.clone())),
        (SplitMode::Tail, Some(re)) => {
            let re = re.clone();
            Box::new(EntryTail::new(move |line: &str| re.is_match(line)))
        }
        (SplitMode::Id, _) => {
            let column = args.column.unwrap_or(0);
            Box::new(EntryId::new(move |line: &str| {
                line.split('\t').nth(column).map(String::from)
            }))
        }
        (mode, None) => bail!("--pattern is required in {:?} mode", mode),
    };

    Ok(boundary)
}

/// Returns the path of the `k`th chunk.
fn chunk_path(prefix: &Path, k: usize, extension: &str) -> PathBuf {
    prefix.append_suffix([k.to_string().as_str(), extension])
}

/// Main function for the `recipes split` subcommand.
pub fn split(args: SplitArgs) -> anyhow::Result<()> {
    info!("Starting split subcommand.");

    // Chunks of a gzipped input are written uncompressed.
    let plain = match args.src.extension().and_then(|e| e.to_str()) {
        Some("gz") => args.src.with_extension(""),
        _ => args.src.clone(),
    };
    let extension = plain
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("txt")
        .to_string();
    let prefix = args
        .output_prefix
        .clone()
        .unwrap_or_else(|| plain.with_extension(""));

    let mut splitter = Splitter::new(boundary(&args)?);
    if args.trim {
        splitter = splitter.construct(|line| line.trim().to_string());
    }
    if let Some(re) = args.ignore.clone() {
        splitter = splitter.ignore(move |line| re.is_match(line));
    }

    let reader = open_maybe_gzipped(&args.src)
        .with_context(|| format!("opening file: {}", args.src.display()))?;

    let mut counter = RecordCounter::new(None, "entries");
    let mut writer: Option<BufWriter<File>> = None;
    let mut chunks = 0;

    for entry in splitter.entries(reader) {
        let entry = entry?;

        if counter.get() % args.chunk_size == 0 {
            if let Some(mut w) = writer.take() {
                w.flush()?;
            }

            let path = chunk_path(&prefix, chunks, &extension);
            let file = File::create(&path)
                .with_context(|| format!("creating file: {}", path.display()))?;
            writer = Some(BufWriter::new(file));
            chunks += 1;
        }

        if let Some(w) = writer.as_mut() {
            for line in &entry {
                writeln!(w, "{}", line)?;
            }
        }

        counter.inc();
    }

    if let Some(mut w) = writer {
        w.flush()?;
    }

    info!(
        "Wrote {} entries into {} files with prefix {}.",
        counter.get(),
        chunks,
        prefix.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_path() {
        assert_eq!(
            chunk_path(Path::new("out/seqs"), 2, "fa"),
            PathBuf::from("out/seqs.2.fa")
        );
    }

    #[test]
    fn test_split_into_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("seqs.fa");
        std::fs::write(&src, ">a\nA\n>b\nC\n>c\nG\n").unwrap();

        split(SplitArgs {
            src: src.clone(),
            mode: SplitMode::Head,
            pattern: Some(Regex::new("^>").unwrap()),
            column: None,
            chunk_size: 2,
            output_prefix: None,
            ignore: None,
            trim: false,
        })
        .unwrap();

        let first = std::fs::read_to_string(dir.path().join("seqs.0.fa")).unwrap();
        let second = std::fs::read_to_string(dir.path().join("seqs.1.fa")).unwrap();
        assert_eq!(first, ">a\nA\n>b\nC\n");
        assert_eq!(second, ">c\nG\n");
    }

    #[test]
    fn test_split_gzipped_input() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("records.gb.gz");
        let mut sink = crate::utils::formats::create_maybe_gzipped(&src).unwrap();
        sink.write_all(b"LOCUS a\n//\nLOCUS b\n//\nLOCUS c\n//\n").unwrap();
        sink.flush().unwrap();
        drop(sink);

        split(SplitArgs {
            src,
            mode: SplitMode::Tail,
            pattern: Some(Regex::new("^//").unwrap()),
            column: None,
            chunk_size: 2,
            output_prefix: None,
            ignore: None,
            trim: false,
        })
        .unwrap();

        let first = std::fs::read_to_string(dir.path().join("records.0.gb")).unwrap();
        let second = std::fs::read_to_string(dir.path().join("records.1.gb")).unwrap();
        assert_eq!(first, "LOCUS a\n//\nLOCUS b\n//\n");
        assert_eq!(second, "LOCUS c\n//\n");
    }
}
