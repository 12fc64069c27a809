//! Utilities related to opening and manipulating FASTA files.

use std::io::BufRead;
use std::io::Write;
use std::path::Path;

use anyhow::bail;
use anyhow::Context;
use noodles::fasta;

use super::BioinformaticsFileFormat;

/// Attempts to open a (possibly gzipped) FASTA file from a given source.
pub fn open<P>(src: P) -> anyhow::Result<fasta::Reader<Box<dyn BufRead>>>
where
    P: AsRef<Path>,
{
    let path = src.as_ref();

    match BioinformaticsFileFormat::try_detect(path) {
        Some(BioinformaticsFileFormat::FASTA) | Some(BioinformaticsFileFormat::FASTA_GZ) => {
            let reader = super::open_maybe_gzipped(path)
                .with_context(|| format!("opening FASTA file: {}", path.display()))?;
            Ok(fasta::Reader::new(reader))
        }
        Some(format) => bail!("incompatible formats: required FASTA, found {}", format),
        None => bail!(
            "Not able to determine filetype for path: {}",
            path.display()
        ),
    }
}

/// Attempts to create a buffered FASTA destination, gzip compressed when the
/// path ends in `.gz`. Wrap it in a [`fasta::Writer`] for writing records and
/// flush it once the writer is done.
pub fn create<P>(dst: P) -> anyhow::Result<Box<dyn Write>>
where
    P: AsRef<Path>,
{
    let path = dst.as_ref();

    match BioinformaticsFileFormat::try_detect(path) {
        Some(BioinformaticsFileFormat::FASTA) | Some(BioinformaticsFileFormat::FASTA_GZ) => {
            super::create_maybe_gzipped(path)
                .with_context(|| format!("creating FASTA file: {}", path.display()))
        }
        Some(format) => bail!("incompatible formats: required FASTA, found {}", format),
        None => bail!(
            "Not able to determine filetype for path: {}",
            path.display()
        ),
    }
}

/// Collects the sequence lengths of every record in a FASTA file.
pub fn sequence_lengths<P>(src: P) -> anyhow::Result<Vec<usize>>
where
    P: AsRef<Path>,
{
    let mut reader = open(src)?;
    let mut lengths = Vec::new();

    for result in reader.records() {
        let record = result?;
        lengths.push(record.sequence().len());
    }

    Ok(lengths)
}
