//! Abundance tables and sample groupings.

use std::path::Path;

use anyhow::bail;
use anyhow::Context;
use indexmap::IndexMap;
use tracing::warn;

use crate::utils::formats::tsv::read_pairs;
use crate::utils::formats::tsv::LabelledTable;

/// A dense table of abundances with samples as rows and features as columns.
#[derive(Clone, Debug, PartialEq)]
pub struct AbundanceTable {
    /// One id per row.
    pub sample_ids: Vec<String>,

    /// One id per column.
    pub feature_ids: Vec<String>,

    /// Row-major abundances.
    pub data: Vec<Vec<f64>>,
}

impl AbundanceTable {
    /// Reads a table from a TSV file. With `transpose`, the file holds
    /// features as rows and samples as columns instead.
    pub fn read<P>(src: P, transpose: bool) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let src = src.as_ref();
        let table = LabelledTable::read(src)?;
        let data = table
            .to_numeric()
            .with_context(|| format!("reading abundances: {}", src.display()))?;

        let result = match transpose {
            false => Self {
                sample_ids: table.row_ids,
                feature_ids: table.column_ids,
                data,
            },
            true => Self {
                sample_ids: table.column_ids,
                feature_ids: table.row_ids,
                data: transposed(&data),
            },
        };

        Ok(result)
    }

    /// The abundances of one feature across the given samples.
    pub fn column(&self, feature: usize, samples: &[usize]) -> Vec<f64> {
        samples.iter().map(|&i| self.data[i][feature]).collect()
    }

    /// The per-feature mean over the given samples.
    pub fn mean_rows(&self, samples: &[usize]) -> Vec<f64> {
        let n = samples.len() as f64;
        (0..self.feature_ids.len())
            .map(|j| samples.iter().map(|&i| self.data[i][j]).sum::<f64>() / n)
            .collect()
    }
}

fn transposed(data: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let columns = data.first().map(Vec::len).unwrap_or(0);
    (0..columns)
        .map(|j| data.iter().map(|row| row[j]).collect())
        .collect()
}

/// Sample indices per category, in the order the categories were first seen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grouping(pub IndexMap<String, Vec<usize>>);

impl Grouping {
    /// Builds a grouping from `(sample id, category)` pairs. Samples missing
    /// from `sample_ids` are skipped with a warning.
    pub fn from_pairs(pairs: &[(String, String)], sample_ids: &[String]) -> anyhow::Result<Self> {
        let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();

        for (sample, category) in pairs {
            match sample_ids.iter().position(|s| s == sample) {
                Some(i) => groups.entry(category.clone()).or_default().push(i),
                None => warn!("Sample {} is not in the table.", sample),
            }
        }

        if groups.is_empty() {
            bail!("no sample in the grouping is in the table");
        }

        Ok(Self(groups))
    }

    /// Reads the pairs from a headerless two-column TSV.
    pub fn read<P>(src: P, sample_ids: &[String]) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let pairs = read_pairs(src)?;
        Self::from_pairs(&pairs, sample_ids)
    }

    /// Puts every sample in a single category.
    pub fn single(name: &str, samples: usize) -> Self {
        let mut groups = IndexMap::new();
        groups.insert(name.to_string(), (0..samples).collect());
        Self(groups)
    }

    /// Iterates over the categories and their sample indices.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<usize>)> {
        self.0.iter()
    }

    /// The number of categories.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no categories.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_transposed() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("t.tsv");
        std::fs::write(&src, "\ts1\ts2\nf1\t1\t2\nf2\t3\t4\nf3\t0\t6\n").unwrap();

        let table = AbundanceTable::read(&src, true).unwrap();
        assert_eq!(table.sample_ids, vec!["s1", "s2"]);
        assert_eq!(table.feature_ids, vec!["f1", "f2", "f3"]);
        assert_eq!(table.data, vec![vec![1.0, 3.0, 0.0], vec![2.0, 4.0, 6.0]]);
        assert_eq!(table.column(2, &[0, 1]), vec![0.0, 6.0]);
        assert_eq!(table.mean_rows(&[0, 1]), vec![1.5, 3.5, 3.0]);
    }

    #[test]
    fn test_grouping_order() {
        let samples: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let pairs = vec![
            ("c".to_string(), "sick".to_string()),
            ("a".to_string(), "healthy".to_string()),
            ("b".to_string(), "sick".to_string()),
            ("z".to_string(), "healthy".to_string()),
        ];

        let grouping = Grouping::from_pairs(&pairs, &samples).unwrap();
        let groups: Vec<_> = grouping.iter().collect();
        assert_eq!(groups[0], (&"sick".to_string(), &vec![2, 1]));
        assert_eq!(groups[1], (&"healthy".to_string(), &vec![0]));
    }

    #[test]
    fn test_grouping_without_known_samples() {
        let pairs = vec![("z".to_string(), "x".to_string())];
        assert!(Grouping::from_pairs(&pairs, &["a".to_string()]).is_err());
    }
}
