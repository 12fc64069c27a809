//! Utilities related to bioinformatics file formats.

use std::fmt;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

pub mod fasta;
pub mod fastq;
pub mod tsv;

/// The file formats understood by the `recipes` subcommands. Detection is
/// based solely on the extension(s) of the file name.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BioinformaticsFileFormat {
    /// A BIOM table in the 1.0 JSON format.
    BIOM,

    /// An uncompressed FASTA file.
    FASTA,

    /// A gzipped FASTA file.
    FASTA_GZ,

    /// An uncompressed FASTQ file.
    FASTQ,

    /// A gzipped FASTQ file.
    FASTQ_GZ,

    /// A tab-separated table.
    TSV,
}

impl BioinformaticsFileFormat {
    /// Attempts to detect the file format of `path` from its extension.
    ///
    /// ```
    /// use recipes::utils::formats::BioinformaticsFileFormat;
    ///
    /// assert_eq!(
    ///     BioinformaticsFileFormat::try_detect("reads.fq.gz"),
    ///     Some(BioinformaticsFileFormat::FASTQ_GZ)
    /// );
    /// assert_eq!(
    ///     BioinformaticsFileFormat::try_detect("contigs.fna"),
    ///     Some(BioinformaticsFileFormat::FASTA)
    /// );
    /// assert_eq!(BioinformaticsFileFormat::try_detect("notes.docx"), None);
    /// ```
    pub fn try_detect<P>(path: P) -> Option<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let ext = path.extension()?.to_str()?;

        if ext == "gz" {
            let inner = path.file_stem().map(Path::new)?.extension()?.to_str()?;
            return match inner {
                "fa" | "fna" | "fasta" => Some(Self::FASTA_GZ),
                "fq" | "fastq" => Some(Self::FASTQ_GZ),
                _ => None,
            };
        }

        match ext {
            "biom" | "json" => Some(Self::BIOM),
            "fa" | "fna" | "fasta" => Some(Self::FASTA),
            "fq" | "fastq" => Some(Self::FASTQ),
            "tsv" | "txt" => Some(Self::TSV),
            _ => None,
        }
    }
}

impl fmt::Display for BioinformaticsFileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BIOM => write!(f, "BIOM"),
            Self::FASTA => write!(f, "FASTA"),
            Self::FASTA_GZ => write!(f, "gzipped FASTA"),
            Self::FASTQ => write!(f, "FASTQ"),
            Self::FASTQ_GZ => write!(f, "gzipped FASTQ"),
            Self::TSV => write!(f, "TSV"),
        }
    }
}

/// Opens `path` for buffered reading, transparently decompressing it when the
/// file name ends in `.gz`.
pub fn open_maybe_gzipped<P>(path: P) -> std::io::Result<Box<dyn BufRead>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)?;

    match path.extension().and_then(|x| x.to_str()) {
        Some("gz") => Ok(Box::new(BufReader::new(MultiGzDecoder::new(file)))),
        _ => Ok(Box::new(BufReader::new(file))),
    }
}

/// Creates `path` for buffered writing, gzip compressing the output when the
/// file name ends in `.gz`.
pub fn create_maybe_gzipped<P>(path: P) -> std::io::Result<Box<dyn Write>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::create(path)?;

    match path.extension().and_then(|x| x.to_str()) {
        Some("gz") => Ok(Box::new(BufWriter::new(GzEncoder::new(
            file,
            Compression::default(),
        )))),
        _ => Ok(Box::new(BufWriter::new(file))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_known_extensions() {
        assert_eq!(
            BioinformaticsFileFormat::try_detect("table.biom"),
            Some(BioinformaticsFileFormat::BIOM)
        );
        assert_eq!(
            BioinformaticsFileFormat::try_detect("a/b/reads.fastq"),
            Some(BioinformaticsFileFormat::FASTQ)
        );
        assert_eq!(
            BioinformaticsFileFormat::try_detect("ref.fasta.gz"),
            Some(BioinformaticsFileFormat::FASTA_GZ)
        );
        assert_eq!(
            BioinformaticsFileFormat::try_detect("meta.tsv"),
            Some(BioinformaticsFileFormat::TSV)
        );
    }

    #[test]
    fn test_detect_unknown_extensions() {
        assert_eq!(BioinformaticsFileFormat::try_detect("archive.tar.gz"), None);
        assert_eq!(BioinformaticsFileFormat::try_detect("no_extension"), None);
    }
}
