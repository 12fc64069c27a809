//! Utilities related to opening and manipulating FASTQ files.

use std::io::BufRead;
use std::io::Write;
use std::path::Path;

use anyhow::bail;
use anyhow::Context;
use noodles::fastq;

use super::BioinformaticsFileFormat;

/// Attempts to open a (possibly gzipped) FASTQ file from a given source.
pub fn open<P>(src: P) -> anyhow::Result<fastq::Reader<Box<dyn BufRead>>>
where
    P: AsRef<Path>,
{
    let path = src.as_ref();

    match BioinformaticsFileFormat::try_detect(path) {
        Some(BioinformaticsFileFormat::FASTQ) | Some(BioinformaticsFileFormat::FASTQ_GZ) => {
            let reader = super::open_maybe_gzipped(path)
                .with_context(|| format!("opening FASTQ file: {}", path.display()))?;
            Ok(fastq::Reader::new(reader))
        }
        Some(format) => bail!("incompatible formats: required FASTQ, found {}", format),
        None => bail!(
            "Not able to determine filetype for path: {}",
            path.display()
        ),
    }
}

/// Attempts to create a buffered FASTQ destination, gzip compressed when the
/// path ends in `.gz`. Wrap it in a [`fastq::Writer`] for writing records and
/// flush it once the writer is done.
pub fn create<P>(dst: P) -> anyhow::Result<Box<dyn Write>>
where
    P: AsRef<Path>,
{
    let path = dst.as_ref();

    match BioinformaticsFileFormat::try_detect(path) {
        Some(BioinformaticsFileFormat::FASTQ) | Some(BioinformaticsFileFormat::FASTQ_GZ) => {
            super::create_maybe_gzipped(path)
                .with_context(|| format!("creating FASTQ file: {}", path.display()))
        }
        Some(format) => bail!("incompatible formats: required FASTQ, found {}", format),
        None => bail!(
            "Not able to determine filetype for path: {}",
            path.display()
        ),
    }
}
