//! Exporting the exact sequence variants of a BIOM table as FASTA.

use std::io::Write;

use anyhow::bail;
use noodles::fasta;
use noodles::fasta::record::Definition;
use noodles::fasta::record::Sequence;

use crate::biom::table::BiomTable;

/// Where the abundance written by `--sizeout` comes from.
pub enum SizeSource<'a> {
    /// Do not annotate the records with an abundance.
    None,

    /// The total of each observation across all samples.
    AllSamples,

    /// The count of each observation in one sample.
    Sample(&'a str),
}

/// Writes one FASTA record per observation of `table`, using the observation
/// id as both the name and the sequence. When annotating sizes, the name
/// becomes `<id>;size=<n>;` and observations with a zero abundance are
/// skipped. Returns the number of records written.
pub fn seqs_to_fasta<W>(
    table: &BiomTable,
    writer: &mut fasta::Writer<W>,
    sizes: SizeSource<'_>,
) -> anyhow::Result<usize>
where
    W: Write,
{
    let abundances = match sizes {
        SizeSource::None => None,
        SizeSource::AllSamples => Some(table.sum_observations()),
        SizeSource::Sample(id) => match table.sample_data(id) {
            Some(data) => Some(data),
            None => bail!("sample not found in table: {}", id),
        },
    };

    let mut written = 0;

    for (i, id) in table.observation_ids().enumerate() {
        let name = match &abundances {
            None => id.to_string(),
            Some(values) => {
                let size = values[i];
                if size <= 0.0 {
                    continue;
                }
                format!("{};size={};", id, size as u64)
            }
        };

        let record = fasta::Record::new(
            Definition::new(name, None),
            Sequence::from(id.as_bytes().to_vec()),
        );
        writer.write_record(&record)?;
        written += 1;
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biom::table::AxisEntry;

    fn table() -> BiomTable {
        BiomTable::new(
            "t",
            vec![
                AxisEntry::new("ACGT"),
                AxisEntry::new("GGCC"),
                AxisEntry::new("TTAA"),
            ],
            vec![AxisEntry::new("s1"), AxisEntry::new("s2")],
            vec![vec![1.0, 2.0], vec![0.0, 4.0], vec![0.0, 0.0]],
        )
        .unwrap()
    }

    fn render(sizes: SizeSource<'_>) -> (usize, String) {
        let mut writer = fasta::Writer::new(Vec::new());
        let n = seqs_to_fasta(&table(), &mut writer, sizes).unwrap();
        (n, String::from_utf8(writer.get_ref().clone()).unwrap())
    }

    #[test]
    fn test_without_sizes() {
        let (n, out) = render(SizeSource::None);
        assert_eq!(n, 3);
        assert_eq!(out, ">ACGT\nACGT\n>GGCC\nGGCC\n>TTAA\nTTAA\n");
    }

    #[test]
    fn test_sizes_over_all_samples() {
        let (n, out) = render(SizeSource::AllSamples);
        assert_eq!(n, 2);
        assert_eq!(out, ">ACGT;size=3;\nACGT\n>GGCC;size=4;\nGGCC\n");
    }

    #[test]
    fn test_sizes_for_one_sample() {
        let (n, out) = render(SizeSource::Sample("s1"));
        assert_eq!(n, 1);
        assert_eq!(out, ">ACGT;size=1;\nACGT\n");
    }

    #[test]
    fn test_unknown_sample() {
        let mut writer = fasta::Writer::new(Vec::new());
        assert!(seqs_to_fasta(&table(), &mut writer, SizeSource::Sample("nope")).is_err());
    }
}
