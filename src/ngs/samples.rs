//! Building a sample-by-file table from a directory of raw sequence files.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use indexmap::IndexMap;
use prettytable::Cell;
use prettytable::Row;
use prettytable::Table;
use regex::Regex;
use tracing::debug;
use tracing::warn;

/// The default regex splitting a sample id off an Illumina file name.
pub const DEFAULT_SAMPLE_ID: &str = "_L00[0-9]_R[12]_";

/// The default regex selecting which files are included.
pub const DEFAULT_SELECT: &str = r"\.fq\.gz$";

/// An error assigning a file to a column of the table.
#[derive(Debug, thiserror::Error)]
pub enum SampleTableError {
    /// The file name matched none of the column patterns.
    #[error("file name {0} matches none of the patterns")]
    NoPattern(String),

    /// The file name matched more than one column pattern.
    #[error("file name {file} matches multiple patterns: {columns:?}")]
    MultiplePatterns {
        /// The offending file name.
        file: String,

        /// The columns whose patterns matched.
        columns: Vec<String>,
    },
}

/// The column patterns used when none are given: one column per read and
/// pairing status.
pub fn default_patterns() -> Result<IndexMap<String, Regex>, regex::Error> {
    ["R1_paired", "R1_unpaired", "R2_paired", "R2_unpaired"]
        .into_iter()
        .map(|name| Ok((name.to_string(), Regex::new(name)?)))
        .collect()
}

/// A table with one row per sample and one column per file pattern. Cells
/// hold file names.
#[derive(Debug)]
pub struct SampleTable {
    /// Column names, in the order the patterns were given.
    pub columns: Vec<String>,

    /// Sample ids, in the order they were first seen, with one cell per
    /// column.
    pub rows: IndexMap<String, Vec<Option<String>>>,
}

impl SampleTable {
    /// Looks up the file assigned to `column` for `sample`.
    pub fn get(&self, sample: &str, column: &str) -> Option<&str> {
        let j = self.columns.iter().position(|c| c == column)?;
        self.rows.get(sample)?.get(j)?.as_deref()
    }

    /// Renders the table for display on a terminal.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();

        let mut header = vec![Cell::new("")];
        header.extend(self.columns.iter().map(|c| Cell::new(c)));
        table.add_row(Row::new(header));

        for (sample, cells) in &self.rows {
            let mut row = vec![Cell::new(sample)];
            row.extend(cells.iter().map(|c| Cell::new(c.as_deref().unwrap_or(""))));
            table.add_row(Row::new(row));
        }

        table
    }

    /// Writes the table as tab-delimited text with the sample ids in the
    /// first column. Missing files are written as empty cells.
    pub fn write_tsv<W>(&self, writer: W) -> anyhow::Result<()>
    where
        W: Write,
    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(writer);

        let mut header = vec![String::new()];
        header.extend(self.columns.iter().cloned());
        writer.write_record(&header)?;

        for (sample, cells) in &self.rows {
            let mut record = vec![sample.as_str()];
            record.extend(cells.iter().map(|c| c.as_deref().unwrap_or("")));
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// Creates a sample table from the file names in `dir`.
///
/// Files are visited in name order. A file is kept when `select` matches its
/// name (or, with `negate`, when it does not). Its sample id is the part of
/// the name before the first match of `sample_id`, and it is placed in the one
/// column whose pattern matches its name.
pub fn create_sample_table<P>(
    dir: P,
    patterns: &IndexMap<String, Regex>,
    sample_id: &Regex,
    select: &Regex,
    negate: bool,
) -> anyhow::Result<SampleTable>
where
    P: AsRef<Path>,
{
    let dir = dir.as_ref();

    let mut names = Vec::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("listing directory: {}", dir.display()))?
    {
        let entry = entry?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();

    let mut table = SampleTable {
        columns: patterns.keys().cloned().collect(),
        rows: IndexMap::new(),
    };

    for name in names {
        if select.is_match(&name) == negate {
            debug!("Skipping {}", name);
            continue;
        }

        let matched: Vec<usize> = patterns
            .values()
            .enumerate()
            .filter(|(_, re)| re.is_match(&name))
            .map(|(j, _)| j)
            .collect();

        let column = match matched.as_slice() {
            [j] => *j,
            [] => return Err(SampleTableError::NoPattern(name).into()),
            _ => {
                return Err(SampleTableError::MultiplePatterns {
                    columns: matched.iter().map(|&j| table.columns[j].clone()).collect(),
                    file: name,
                }
                .into())
            }
        };

        let id = sample_id.split(&name).next().unwrap_or(&name).to_string();
        let width = table.columns.len();
        let cells = table.rows.entry(id.clone()).or_insert_with(|| vec![None; width]);

        if let Some(previous) = &cells[column] {
            warn!(
                "Replacing {} with {} for sample {} in column {}.",
                previous, name, id, table.columns[column]
            );
        }
        cells[column] = Some(name);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            std::fs::write(dir.join(name), "").unwrap();
        }
    }

    #[test]
    fn test_create_sample_table() {
        let dir = tempfile::tempdir().unwrap();
        touch(
            dir.path(),
            &[
                "S1_L001_R1_paired.fq.gz",
                "S1_L001_R2_paired.fq.gz",
                "S1_L001_R1_unpaired.fq.gz",
                "S2_L002_R2_unpaired.fq.gz",
                "notes.txt",
            ],
        );

        let table = create_sample_table(
            dir.path(),
            &default_patterns().unwrap(),
            &Regex::new(DEFAULT_SAMPLE_ID).unwrap(),
            &Regex::new(DEFAULT_SELECT).unwrap(),
            false,
        )
        .unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(
            table.get("S1", "R1_paired"),
            Some("S1_L001_R1_paired.fq.gz")
        );
        assert_eq!(
            table.get("S1", "R1_unpaired"),
            Some("S1_L001_R1_unpaired.fq.gz")
        );
        assert_eq!(table.get("S1", "R2_unpaired"), None);
        assert_eq!(
            table.get("S2", "R2_unpaired"),
            Some("S2_L002_R2_unpaired.fq.gz")
        );

        let mut out = Vec::new();
        table.write_tsv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\tR1_paired\tR1_unpaired\tR2_paired\tR2_unpaired\n"));
    }

    #[test]
    fn test_negated_selection() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["a_R1_paired.fastq", "b_R1_paired.fq.gz"]);

        let table = create_sample_table(
            dir.path(),
            &default_patterns().unwrap(),
            &Regex::new("_R1").unwrap(),
            &Regex::new(DEFAULT_SELECT).unwrap(),
            true,
        )
        .unwrap();

        assert_eq!(table.rows.keys().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_unmatched_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["S1_L001_R1_001.fq.gz"]);

        let err = create_sample_table(
            dir.path(),
            &default_patterns().unwrap(),
            &Regex::new(DEFAULT_SAMPLE_ID).unwrap(),
            &Regex::new(DEFAULT_SELECT).unwrap(),
            false,
        )
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SampleTableError>(),
            Some(SampleTableError::NoPattern(_))
        ));
    }

    #[test]
    fn test_ambiguous_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["S1_R1_paired.fq.gz"]);

        let mut patterns = default_patterns().unwrap();
        patterns.insert("R1".to_string(), Regex::new("R1").unwrap());

        let err = create_sample_table(
            dir.path(),
            &patterns,
            &Regex::new(DEFAULT_SAMPLE_ID).unwrap(),
            &Regex::new(DEFAULT_SELECT).unwrap(),
            false,
        )
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SampleTableError>(),
            Some(SampleTableError::MultiplePatterns { .. })
        ));
    }
}
