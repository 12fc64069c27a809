//! Splitting an interleaved FASTQ file into its paired-end mates.

use std::io::BufRead;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use itertools::Itertools;
use noodles::fastq;
use tracing::debug;
use tracing::info;

use crate::utils::display::PercentageFormat;
use crate::utils::display::RecordCounter;
use crate::utils::formats;
use crate::utils::pathbuf::AppendSuffix;

/// Counts of the records written to each output of a split.
#[derive(Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SplitCounts {
    /// Pairs written to the R1 and R2 files.
    pub pairs: usize,

    /// Singletons written to the R1 unpaired file.
    pub r1_unpaired: usize,

    /// Singletons written to the R2 unpaired file.
    pub r2_unpaired: usize,
}

/// The four writers a split writes to.
pub struct PairedWriters<W: Write> {
    /// First mates of complete pairs.
    pub r1: fastq::Writer<W>,

    /// Second mates of complete pairs.
    pub r2: fastq::Writer<W>,

    /// First mates whose partner is missing.
    pub r1_unpaired: fastq::Writer<W>,

    /// Second mates whose partner is missing.
    pub r2_unpaired: fastq::Writer<W>,
}

/// Returns the four output paths derived from `prefix`, in the order R1, R2,
/// R1 unpaired and R2 unpaired.
pub fn output_paths<P>(prefix: P) -> [PathBuf; 4]
where
    P: AsRef<Path>,
{
    let prefix = prefix.as_ref();
    [
        prefix.append_suffix(["r1", "fq", "gz"]),
        prefix.append_suffix(["r2", "fq", "gz"]),
        prefix.append_suffix(["r1_unpaired", "fq", "gz"]),
        prefix.append_suffix(["r2_unpaired", "fq", "gz"]),
    ]
}

/// Splits the FASTQ file at `src` into gzipped R1, R2 and unpaired files
/// derived from `prefix`. Returns the paths written, in the order given by
/// [`output_paths`], along with the record counts.
pub fn split_paired_end<P, Q>(src: P, prefix: Q) -> anyhow::Result<([PathBuf; 4], SplitCounts)>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let src = src.as_ref();
    let paths = output_paths(prefix);

    let mut reader = formats::fastq::open(src)?;
    let mut r1 = formats::fastq::create(&paths[0])?;
    let mut r2 = formats::fastq::create(&paths[1])?;
    let mut r1_unpaired = formats::fastq::create(&paths[2])?;
    let mut r2_unpaired = formats::fastq::create(&paths[3])?;

    let mut writers = PairedWriters {
        r1: fastq::Writer::new(&mut r1),
        r2: fastq::Writer::new(&mut r2),
        r1_unpaired: fastq::Writer::new(&mut r1_unpaired),
        r2_unpaired: fastq::Writer::new(&mut r2_unpaired),
    };

    let counts = split_records(&mut reader, &mut writers)
        .with_context(|| format!("splitting FASTQ file: {}", src.display()))?;
    drop(writers);

    for (sink, path) in [r1, r2, r1_unpaired, r2_unpaired].iter_mut().zip(&paths) {
        sink.flush().with_context(|| format!("writing FASTQ file: {}", path.display()))?;
    }

    Ok((paths, counts))
}

/// Reads every record from `reader`, groups the records by name and
/// distributes them across `writers`.
pub fn split_records<R, W>(
    reader: &mut fastq::Reader<R>,
    writers: &mut PairedWriters<W>,
) -> anyhow::Result<SplitCounts>
where
    R: BufRead,
    W: Write,
{
    let mut counter = RecordCounter::new(None, "reads");
    let mut records = Vec::new();

    for result in reader.records() {
        let record = result?;
        records.push(record);
        counter.inc();
    }
    info!("Read {} records.", counter.get());

    records.sort_by(|a, b| {
        a.name()
            .cmp(b.name())
            .then_with(|| a.description().cmp(b.description()))
    });

    let mut counts = SplitCounts::default();

    for (name, group) in &records.iter().group_by(|r| r.name().to_vec()) {
        let group: Vec<&fastq::Record> = group.collect();

        match group.as_slice() {
            [first, second] => {
                writers.r1.write_record(first)?;
                writers.r2.write_record(second)?;
                counts.pairs += 1;
            }
            [single] => match single.description().first() {
                Some(b'1') => {
                    writers.r1_unpaired.write_record(single)?;
                    counts.r1_unpaired += 1;
                }
                Some(b'2') => {
                    writers.r2_unpaired.write_record(single)?;
                    counts.r2_unpaired += 1;
                }
                _ => bail!(
                    "cannot determine the strand of read: {}",
                    String::from_utf8_lossy(&name)
                ),
            },
            reads => bail!(
                "{} reads share the name: {}",
                reads.len(),
                String::from_utf8_lossy(&name)
            ),
        }
    }

    info!(
        "Split {} pairs ({} of reads).",
        counts.pairs,
        PercentageFormat(2 * counts.pairs as u64, counter.get() as u64)
    );
    debug!("{:?}", counts);
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writers() -> PairedWriters<Vec<u8>> {
        PairedWriters {
            r1: fastq::Writer::new(Vec::new()),
            r2: fastq::Writer::new(Vec::new()),
            r1_unpaired: fastq::Writer::new(Vec::new()),
            r2_unpaired: fastq::Writer::new(Vec::new()),
        }
    }

    fn contents(writer: &fastq::Writer<Vec<u8>>) -> String {
        String::from_utf8(writer.get_ref().clone()).unwrap()
    }

    #[test]
    fn test_split_records() {
        let data = "\
@b 2:N
TTTT
+
IIII
@a 2:N
CCCC
+
IIII
@c 2:N
GGGG
+
IIII
@a 1:N
AAAA
+
IIII
@d 1:N
ACGT
+
IIII
";
        let mut reader = fastq::Reader::new(data.as_bytes());
        let mut writers = writers();

        let counts = split_records(&mut reader, &mut writers).unwrap();
        assert_eq!(
            counts,
            SplitCounts {
                pairs: 1,
                r1_unpaired: 1,
                r2_unpaired: 2,
            }
        );

        assert_eq!(contents(&writers.r1), "@a 1:N\nAAAA\n+\nIIII\n");
        assert_eq!(contents(&writers.r2), "@a 2:N\nCCCC\n+\nIIII\n");
        assert_eq!(contents(&writers.r1_unpaired), "@d 1:N\nACGT\n+\nIIII\n");
        assert_eq!(
            contents(&writers.r2_unpaired),
            "@b 2:N\nTTTT\n+\nIIII\n@c 2:N\nGGGG\n+\nIIII\n"
        );
    }

    #[test]
    fn test_too_many_reads_with_one_name() {
        let data = "@a 1\nA\n+\nI\n@a 2\nA\n+\nI\n@a 3\nA\n+\nI\n";
        let mut reader = fastq::Reader::new(data.as_bytes());
        assert!(split_records(&mut reader, &mut writers()).is_err());
    }

    #[test]
    fn test_singleton_without_strand() {
        let data = "@a x\nA\n+\nI\n";
        let mut reader = fastq::Reader::new(data.as_bytes());
        assert!(split_records(&mut reader, &mut writers()).is_err());
    }

    #[test]
    fn test_split_paired_end_files() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("reads.fq");
        std::fs::write(&src, "@a 1:N\nAC\n+\nII\n@a 2:N\nGT\n+\nII\n").unwrap();

        let (paths, counts) = split_paired_end(&src, dir.path().join("out")).unwrap();
        assert_eq!(counts.pairs, 1);
        assert!(paths[0].ends_with("out.r1.fq.gz"));

        let mut reader = formats::fastq::open(&paths[1]).unwrap();
        let records: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sequence(), b"GT");

        let mut reader = formats::fastq::open(&paths[2]).unwrap();
        assert_eq!(reader.records().count(), 0);
    }

    #[test]
    fn test_split_paired_end_gzipped_input() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("reads.fq.gz");
        let mut sink = formats::fastq::create(&src).unwrap();
        sink.write_all(b"@a 1:N\nAC\n+\nII\n@b 2:N\nGT\n+\nII\n@a 2:N\nCA\n+\nII\n")
            .unwrap();
        sink.flush().unwrap();
        drop(sink);

        let (paths, counts) = split_paired_end(&src, dir.path().join("out")).unwrap();
        assert_eq!(
            counts,
            SplitCounts {
                pairs: 1,
                r1_unpaired: 0,
                r2_unpaired: 1,
            }
        );

        let mut reader = formats::fastq::open(&paths[0]).unwrap();
        let records: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sequence(), b"AC");

        let mut reader = formats::fastq::open(&paths[3]).unwrap();
        let records: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), b"b");
    }
}
