//! Generating job-array scripts for the PBS scheduler.
//!
//! A job array is a launcher script holding the PBS resource header, a bash
//! array with one per-sample script per element and a final line running the
//! element selected by `$PBS_ARRAYID`. The per-sample scripts are built either
//! by a [`ScriptBuilder`](scripts::ScriptBuilder) for a known tool or from a
//! user-supplied template.

pub mod array;
pub mod command;
pub mod resources;
pub mod scripts;
pub mod template;

use anyhow::bail;

use crate::utils::formats::tsv::LabelledTable;

/// One row of a metadata table. The row id is the sample id.
#[derive(Clone, Copy)]
pub struct SampleRow<'a> {
    table: &'a LabelledTable,
    index: usize,
}

impl<'a> SampleRow<'a> {
    /// Returns an iterator over every row of `table`.
    pub fn all(table: &'a LabelledTable) -> impl Iterator<Item = SampleRow<'a>> {
        (0..table.row_ids.len()).map(move |index| SampleRow { table, index })
    }

    /// The id of the sample.
    pub fn id(&self) -> &'a str {
        &self.table.row_ids[self.index]
    }

    /// Gets the value of `column`. Empty cells are `None`, and an unknown
    /// column is an error.
    pub fn get(&self, column: &str) -> anyhow::Result<Option<&'a str>> {
        match self.table.column_index(column) {
            Some(j) => Ok(self.table.get(self.index, j)),
            None => bail!("column not found in metadata: {}", column),
        }
    }

    /// Gets the non-missing values of several columns, in order.
    pub fn present<S>(&self, columns: &[S]) -> anyhow::Result<Vec<&'a str>>
    where
        S: AsRef<str>,
    {
        let mut values = Vec::new();
        for column in columns {
            if let Some(value) = self.get(column.as_ref())? {
                values.push(value);
            }
        }
        Ok(values)
    }

    /// Every `(column, value)` pair of the row, with missing values as empty
    /// strings.
    pub fn pairs(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let table = self.table;
        let index = self.index;
        table
            .column_ids
            .iter()
            .enumerate()
            .map(move |(j, c)| (c.as_str(), table.get(index, j).unwrap_or("")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_rows() {
        let table = LabelledTable::from_reader("id\tR1\tR2\ns1\ta.fq\t\ns2\tb.fq\tc.fq\n".as_bytes())
            .unwrap();
        let rows: Vec<_> = SampleRow::all(&table).collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id(), "s1");
        assert_eq!(rows[0].get("R2").unwrap(), None);
        assert_eq!(rows[1].present(&["R1", "R2"]).unwrap(), vec!["b.fq", "c.fq"]);
        assert!(rows[0].get("R3").is_err());
        assert_eq!(
            rows[0].pairs().collect::<Vec<_>>(),
            vec![("R1", "a.fq"), ("R2", "")]
        );
    }
}
