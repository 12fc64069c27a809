//! Utilities related to reading tab-separated tables whose first column holds
//! row identifiers and whose header holds column identifiers.

use std::io::Read;
use std::path::Path;

use anyhow::bail;
use anyhow::Context;

/// A table of string cells labelled by row and by column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabelledTable {
    /// The identifiers from the first column of every data row.
    pub row_ids: Vec<String>,

    /// The identifiers from the header, not including the first cell.
    pub column_ids: Vec<String>,

    /// The cells of each row (excluding the row identifier).
    pub cells: Vec<Vec<String>>,
}

impl LabelledTable {
    /// Reads a [`LabelledTable`] from a TSV file on disk.
    pub fn read<P>(src: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = src.as_ref();
        let reader = super::open_maybe_gzipped(path)
            .with_context(|| format!("opening table: {}", path.display()))?;
        Self::from_reader(reader).with_context(|| format!("parsing table: {}", path.display()))
    }

    /// Reads a [`LabelledTable`] from any reader.
    pub fn from_reader<R>(reader: R) -> anyhow::Result<Self>
    where
        R: Read,
    {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .comment(Some(b'#'))
            .from_reader(reader);

        let headers = reader.headers().context("reading table header")?;
        if headers.is_empty() {
            bail!("table has no header");
        }

        let column_ids: Vec<String> = headers.iter().skip(1).map(String::from).collect();
        let mut row_ids = Vec::new();
        let mut cells = Vec::new();

        for (i, result) in reader.records().enumerate() {
            let record = result.with_context(|| format!("table row {}", i + 1))?;
            let mut fields = record.iter();

            let id = match fields.next() {
                Some(id) => id.to_string(),
                None => bail!("table row {} is empty", i + 1),
            };

            row_ids.push(id);
            cells.push(fields.map(String::from).collect());
        }

        Ok(LabelledTable {
            row_ids,
            column_ids,
            cells,
        })
    }

    /// Gets the position of a column by its identifier.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.column_ids.iter().position(|c| c == column)
    }

    /// Gets the position of a row by its identifier.
    pub fn row_index(&self, row: &str) -> Option<usize> {
        self.row_ids.iter().position(|r| r == row)
    }

    /// Gets a cell, treating empty strings as missing values.
    pub fn get(&self, row: usize, column: usize) -> Option<&str> {
        self.cells
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Converts every cell to an `f64`.
    pub fn to_numeric(&self) -> anyhow::Result<Vec<Vec<f64>>> {
        self.cells
            .iter()
            .zip(self.row_ids.iter())
            .map(|(row, id)| {
                row.iter()
                    .map(|cell| {
                        cell.trim()
                            .parse::<f64>()
                            .with_context(|| format!("row {}: '{}' is not a number", id, cell))
                    })
                    .collect()
            })
            .collect()
    }
}

/// Reads a headerless two-column TSV into a list of pairs. Blank lines and
/// lines starting with `#` are ignored.
pub fn read_pairs<P>(src: P) -> anyhow::Result<Vec<(String, String)>>
where
    P: AsRef<Path>,
{
    let path = src.as_ref();
    let reader = super::open_maybe_gzipped(path)
        .with_context(|| format!("opening pairs file: {}", path.display()))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(reader);

    let mut pairs = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("{} line {}", path.display(), i + 1))?;
        match (record.get(0), record.get(1)) {
            (Some(a), Some(b)) => pairs.push((a.to_string(), b.to_string())),
            _ => bail!(
                "{} line {}: expected two tab-separated values",
                path.display(),
                i + 1
            ),
        }
    }

    Ok(pairs)
}
