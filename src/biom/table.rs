//! An in-memory BIOM table with reading and writing of the BIOM 1.0 JSON
//! format.
//!
//! # Overview
//!
//! A BIOM table counts _observations_ (OTUs, exact sequence variants, genes)
//! across _samples_. The 1.0 format is a single JSON document whose `rows`
//! describe the observations, whose `columns` describe the samples, and whose
//! `data` holds either a dense matrix (`"matrix_type": "dense"`) or a list of
//! `[row, column, value]` triplets (`"matrix_type": "sparse"`).
//!
//! Tables are held densely in memory, with one row per observation. Tables are
//! always written back out in the sparse layout.

use std::fs::File;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;

use anyhow::bail;
use anyhow::Context;
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use serde_json::Value;

use crate::utils::formats::open_maybe_gzipped;

/// The format string written into every table.
const FORMAT: &str = "Biological Observation Matrix 1.0.0";

/// The format URL written into every table.
const FORMAT_URL: &str = "http://biom-format.org";

/// The id and metadata of an observation or a sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisEntry {
    /// The observation or sample id.
    pub id: String,

    /// Free-form metadata, `null` when absent.
    #[serde(default)]
    pub metadata: Value,
}

impl AxisEntry {
    /// Creates an entry without metadata.
    pub fn new(id: impl Into<String>) -> Self {
        AxisEntry {
            id: id.into(),
            metadata: Value::Null,
        }
    }
}

/// The fields of a BIOM 1.0 JSON document needed to rebuild a table.
#[derive(Debug, Deserialize)]
struct BiomDocument {
    #[serde(default)]
    id: Option<String>,
    format: String,
    #[serde(rename = "type")]
    table_type: String,
    rows: Vec<AxisEntry>,
    columns: Vec<AxisEntry>,
    matrix_type: String,
    shape: (usize, usize),
    data: Vec<Vec<f64>>,
}

/// Converts a sparse row or column index, which must be a non-negative whole
/// number.
fn sparse_index(value: f64) -> Option<usize> {
    match value >= 0.0 && value.fract() == 0.0 && value <= usize::MAX as f64 {
        true => Some(value as usize),
        false => None,
    }
}

/// A BIOM table of observations by samples.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomTable {
    /// The table id.
    pub id: String,

    /// The table type, such as `OTU table`.
    pub table_type: String,

    /// The observations (rows).
    pub observations: Vec<AxisEntry>,

    /// The samples (columns).
    pub samples: Vec<AxisEntry>,

    /// The counts, one row per observation and one column per sample.
    pub data: Vec<Vec<f64>>,
}

impl BiomTable {
    /// Creates a new table, checking that `data` has one row per observation
    /// and one column per sample.
    pub fn new(
        id: impl Into<String>,
        observations: Vec<AxisEntry>,
        samples: Vec<AxisEntry>,
        data: Vec<Vec<f64>>,
    ) -> anyhow::Result<Self> {
        if data.len() != observations.len() {
            bail!(
                "table has {} rows of data but {} observations",
                data.len(),
                observations.len()
            );
        }

        if let Some((i, row)) = data
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != samples.len())
        {
            bail!(
                "row {} has {} values but the table has {} samples",
                i,
                row.len(),
                samples.len()
            );
        }

        Ok(BiomTable {
            id: id.into(),
            table_type: String::from("OTU table"),
            observations,
            samples,
            data,
        })
    }

    /// Reads a table from a BIOM 1.0 JSON file (optionally gzipped).
    pub fn read<P>(src: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = src.as_ref();
        let reader = open_maybe_gzipped(path)
            .with_context(|| format!("opening BIOM table: {}", path.display()))?;
        Self::from_reader(reader).with_context(|| format!("parsing BIOM table: {}", path.display()))
    }

    /// Reads a table from any reader producing BIOM 1.0 JSON.
    pub fn from_reader<R>(reader: R) -> anyhow::Result<Self>
    where
        R: Read,
    {
        let doc: BiomDocument = serde_json::from_reader(reader)?;

        if !doc.format.starts_with("Biological Observation Matrix 1.") {
            bail!("unsupported BIOM format: {}", doc.format);
        }

        let (n_rows, n_cols) = doc.shape;
        if n_rows != doc.rows.len() || n_cols != doc.columns.len() {
            bail!(
                "shape {:?} does not match {} rows and {} columns",
                doc.shape,
                doc.rows.len(),
                doc.columns.len()
            );
        }

        let data = match doc.matrix_type.as_str() {
            "dense" => doc.data,
            "sparse" => {
                let mut dense = vec![vec![0.0; n_cols]; n_rows];
                for entry in doc.data {
                    let (r, c, v) = match entry.as_slice() {
                        [r, c, v] => match (sparse_index(*r), sparse_index(*c)) {
                            (Some(r), Some(c)) => (r, c, *v),
                            _ => bail!("sparse entry has an invalid index: {:?}", entry),
                        },
                        _ => bail!("sparse entries must have three values: {:?}", entry),
                    };

                    if r >= n_rows || c >= n_cols {
                        bail!("sparse entry ({}, {}) is outside of shape {:?}", r, c, doc.shape);
                    }

                    dense[r][c] = v;
                }
                dense
            }
            other => bail!("unknown matrix type: {}", other),
        };

        let mut table = BiomTable::new(
            doc.id.unwrap_or_default(),
            doc.rows,
            doc.columns,
            data,
        )?;
        table.table_type = doc.table_type;

        Ok(table)
    }

    /// Writes the table to `dst` in the sparse BIOM 1.0 JSON layout.
    pub fn write<P>(&self, dst: P) -> anyhow::Result<()>
    where
        P: AsRef<Path>,
    {
        let path = dst.as_ref();
        let file = File::create(path)
            .with_context(|| format!("creating BIOM table: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Serializes the table to any writer in the sparse BIOM 1.0 JSON layout.
    pub fn to_writer<W>(&self, writer: W) -> anyhow::Result<()>
    where
        W: Write,
    {
        let is_int = self.data.iter().flatten().all(|v| v.fract() == 0.0);
        let element_type = match is_int {
            true => "int",
            false => "float",
        };

        let mut data = Vec::new();
        for (r, row) in self.data.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                if v != 0.0 {
                    match is_int {
                        true => data.push(json!([r, c, v as i64])),
                        false => data.push(json!([r, c, v])),
                    }
                }
            }
        }

        let doc = json!({
            "id": self.id,
            "format": FORMAT,
            "format_url": FORMAT_URL,
            "type": self.table_type,
            "generated_by": format!("recipes {}", env!("CARGO_PKG_VERSION")),
            "date": chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
            "rows": self.observations,
            "columns": self.samples,
            "matrix_type": "sparse",
            "matrix_element_type": element_type,
            "shape": [self.observations.len(), self.samples.len()],
            "data": data,
        });

        serde_json::to_writer(writer, &doc)?;
        Ok(())
    }

    /// The observation ids, in table order.
    pub fn observation_ids(&self) -> impl Iterator<Item = &str> {
        self.observations.iter().map(|o| o.id.as_str())
    }

    /// The total count of each observation across all samples.
    pub fn sum_observations(&self) -> Vec<f64> {
        self.data.iter().map(|row| row.iter().sum()).collect()
    }

    /// The counts of every observation in one sample, if the sample exists.
    pub fn sample_data(&self, sample_id: &str) -> Option<Vec<f64>> {
        let c = self.samples.iter().position(|s| s.id == sample_id)?;
        Some(self.data.iter().map(|row| row[c]).collect())
    }

    /// Groups observations by the id returned from `f`, summing their counts.
    /// New observations appear in the order their id was first produced and
    /// carry no metadata.
    pub fn collapse_observations<F>(&self, mut f: F) -> BiomTable
    where
        F: FnMut(&str) -> String,
    {
        let mut groups: IndexMap<String, Vec<f64>> = IndexMap::new();

        for (entry, row) in self.observations.iter().zip(&self.data) {
            let sums = groups
                .entry(f(&entry.id))
                .or_insert_with(|| vec![0.0; self.samples.len()]);
            for (sum, v) in sums.iter_mut().zip(row) {
                *sum += v;
            }
        }

        let (observations, data) = groups
            .into_iter()
            .map(|(id, row)| (AxisEntry::new(id), row))
            .unzip();

        BiomTable {
            id: self.id.clone(),
            table_type: self.table_type.clone(),
            observations,
            samples: self.samples.clone(),
            data,
        }
    }
}

/// Trims every observation id (an exact sequence variant) to its first
/// `length` characters and collapses observations that become identical. A
/// `length` of zero keeps the full sequences.
///
/// ```
/// use recipes::biom::table::{trim_collapse, AxisEntry, BiomTable};
///
/// let table = BiomTable::new(
///     "t",
///     vec![AxisEntry::new("ACGTA"), AxisEntry::new("ACGTC"), AxisEntry::new("TTTTT")],
///     vec![AxisEntry::new("s1"), AxisEntry::new("s2")],
///     vec![vec![1.0, 0.0], vec![2.0, 5.0], vec![0.0, 1.0]],
/// )
/// .unwrap();
///
/// let trimmed = trim_collapse(&table, 4);
/// assert_eq!(trimmed.observation_ids().collect::<Vec<_>>(), ["ACGT", "TTTT"]);
/// assert_eq!(trimmed.data, vec![vec![3.0, 5.0], vec![0.0, 1.0]]);
/// assert_eq!(trimmed.id, "trim-and-collapse-4nt");
/// ```
pub fn trim_collapse(table: &BiomTable, length: usize) -> BiomTable {
    let mut collapsed = table.collapse_observations(|id| match length {
        0 => id.to_string(),
        n => id.chars().take(n).collect(),
    });
    collapsed.id = format!("trim-and-collapse-{}nt", length);
    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPARSE: &str = r#"{
        "id": "example",
        "format": "Biological Observation Matrix 1.0.0",
        "format_url": "http://biom-format.org",
        "type": "OTU table",
        "generated_by": "hand",
        "date": "2012-12-11T07:30:29.870689",
        "rows": [
            {"id": "AACC", "metadata": {"taxonomy": ["k__Bacteria"]}},
            {"id": "AAGG", "metadata": null},
            {"id": "TTGG", "metadata": null}
        ],
        "columns": [
            {"id": "S1", "metadata": null},
            {"id": "S2", "metadata": null}
        ],
        "matrix_type": "sparse",
        "matrix_element_type": "int",
        "shape": [3, 2],
        "data": [[0, 0, 5], [0, 1, 1], [1, 1, 2], [2, 0, 3]]
    }"#;

    #[test]
    fn test_read_sparse() {
        let table = BiomTable::from_reader(SPARSE.as_bytes()).unwrap();
        assert_eq!(table.id, "example");
        assert_eq!(table.observations.len(), 3);
        assert_eq!(
            table.data,
            vec![vec![5.0, 1.0], vec![0.0, 2.0], vec![3.0, 0.0]]
        );
        assert_eq!(table.sum_observations(), vec![6.0, 2.0, 3.0]);
        assert_eq!(table.sample_data("S2"), Some(vec![1.0, 2.0, 0.0]));
        assert_eq!(table.sample_data("S9"), None);
    }

    #[test]
    fn test_read_dense() {
        let dense = r#"{
            "format": "Biological Observation Matrix 1.0.0",
            "type": "OTU table",
            "rows": [{"id": "A"}, {"id": "B"}],
            "columns": [{"id": "S1"}],
            "matrix_type": "dense",
            "matrix_element_type": "float",
            "shape": [2, 1],
            "data": [[0.5], [1.5]]
        }"#;
        let table = BiomTable::from_reader(dense.as_bytes()).unwrap();
        assert_eq!(table.data, vec![vec![0.5], vec![1.5]]);
        assert_eq!(table.observations[0].metadata, Value::Null);
    }

    #[test]
    fn test_reject_shape_mismatch() {
        let bad = SPARSE.replace("\"shape\": [3, 2]", "\"shape\": [4, 2]");
        assert!(BiomTable::from_reader(bad.as_bytes()).is_err());
    }

    #[test]
    fn test_reject_invalid_sparse_indices() {
        for bad_entry in ["[-1, 0, 3]", "[1.9, 0, 3]", "[2, 0.5, 3]", "[2, -0.0001, 3]"] {
            let bad = SPARSE.replace("[2, 0, 3]", bad_entry);
            let err = BiomTable::from_reader(bad.as_bytes()).unwrap_err();
            assert!(err.to_string().contains("invalid index"));
        }
    }

    #[test]
    fn test_reject_short_sparse_entry() {
        let bad = SPARSE.replace("[2, 0, 3]", "[2, 0]");
        assert!(BiomTable::from_reader(bad.as_bytes()).is_err());
    }

    #[test]
    fn test_reject_non_integer_shape() {
        for shape in ["[3.5, 2]", "[-3, 2]", "[3]"] {
            let bad = SPARSE.replace("[3, 2]", shape);
            assert!(BiomTable::from_reader(bad.as_bytes()).is_err());
        }
    }

    #[test]
    fn test_reject_out_of_bounds_entry() {
        let bad = SPARSE.replace("[2, 0, 3]", "[2, 5, 3]");
        assert!(BiomTable::from_reader(bad.as_bytes()).is_err());
    }

    #[test]
    fn test_write_then_read_keeps_counts() {
        let table = BiomTable::from_reader(SPARSE.as_bytes()).unwrap();
        let mut buffer = Vec::new();
        table.to_writer(&mut buffer).unwrap();

        let written: Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(written["matrix_element_type"], "int");
        assert_eq!(written["data"].as_array().unwrap().len(), 4);

        let reread = BiomTable::from_reader(buffer.as_slice()).unwrap();
        assert_eq!(reread.data, table.data);
        assert_eq!(reread.observations, table.observations);
    }

    #[test]
    fn test_trim_collapse_full_length_keeps_everything() {
        let table = BiomTable::from_reader(SPARSE.as_bytes()).unwrap();
        let collapsed = trim_collapse(&table, 0);
        assert_eq!(collapsed.data, table.data);
        assert_eq!(collapsed.id, "trim-and-collapse-0nt");
    }

    #[test]
    fn test_trim_collapse_merges_prefixes() {
        let table = BiomTable::from_reader(SPARSE.as_bytes()).unwrap();
        let collapsed = trim_collapse(&table, 2);
        assert_eq!(
            collapsed.observation_ids().collect::<Vec<_>>(),
            vec!["AA", "TT"]
        );
        assert_eq!(collapsed.data, vec![vec![5.0, 3.0], vec![3.0, 0.0]]);
    }
}
