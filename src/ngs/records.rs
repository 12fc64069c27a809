//! Comparisons between collections of sequence records.

use noodles::fasta;
use noodles::fastq;

/// A sequence record that can be compared regardless of its file format.
pub trait SequenceRecord {
    /// The `(sequence, name, description)` triple that identifies the record.
    fn key(&self) -> (Vec<u8>, Vec<u8>, Vec<u8>);
}

impl SequenceRecord for fastq::Record {
    fn key(&self) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        (
            self.sequence().to_vec(),
            self.name().to_vec(),
            self.description().to_vec(),
        )
    }
}

impl SequenceRecord for fasta::Record {
    fn key(&self) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        (
            self.sequence().as_ref().to_vec(),
            self.name().as_bytes().to_vec(),
            self.description()
                .map(|d| d.as_bytes().to_vec())
                .unwrap_or_default(),
        )
    }
}

/// Tests whether two collections hold the same records, ignoring their order.
/// Records are equal when their sequences, names and descriptions are equal.
pub fn equal_seqs<T>(a: &[T], b: &[T]) -> bool
where
    T: SequenceRecord,
{
    if a.len() != b.len() {
        return false;
    }

    let mut a: Vec<_> = a.iter().map(SequenceRecord::key).collect();
    let mut b: Vec<_> = b.iter().map(SequenceRecord::key).collect();
    a.sort();
    b.sort();

    a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fastq_records(data: &str) -> Vec<fastq::Record> {
        let mut reader = fastq::Reader::new(data.as_bytes());
        reader.records().collect::<Result<_, _>>().unwrap()
    }

    fn fasta_records(data: &str) -> Vec<fasta::Record> {
        let mut reader = fasta::Reader::new(data.as_bytes());
        reader.records().collect::<Result<_, _>>().unwrap()
    }

    #[test]
    fn test_equal_seqs_ignores_order() {
        let a = fasta_records(">s1\nATGC\n>s2\nA\n");
        let b = fasta_records(">s2\nA\n>s1\nATGC\n");
        assert!(equal_seqs(&a, &b));
    }

    #[test]
    fn test_equal_seqs_compares_descriptions() {
        let a = fastq_records("@r1 1:N\nACGT\n+\nIIII\n");
        let b = fastq_records("@r1 2:N\nACGT\n+\nIIII\n");
        assert!(!equal_seqs(&a, &b));
        assert!(equal_seqs(&a, &a));
    }

    #[test]
    fn test_equal_seqs_different_lengths() {
        let a = fasta_records(">s1\nATGC\n");
        let b = fasta_records(">s1\nATGC\n>s1\nATGC\n");
        assert!(!equal_seqs(&a, &b));
    }
}
