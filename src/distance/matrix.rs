//! Square, symmetric and hollow distance matrices labelled by sample id.

use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;

use crate::distance::compute::Pair;
use crate::utils::formats::tsv::LabelledTable;

/// Absolute tolerance used when checking for symmetry and hollowness.
const TOLERANCE: f64 = 1e-8;

/// An error that occurs when the provided data is not a valid distance matrix.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum MatrixError {
    /// The number of ids does not match the number of rows.
    #[error("{ids} ids were provided for a matrix with {rows} rows")]
    IdCountMismatch {
        /// The number of ids.
        ids: usize,
        /// The number of rows.
        rows: usize,
    },

    /// A row does not have as many columns as the matrix has rows.
    #[error("row {row} has {columns} columns, expected {expected}")]
    NotSquare {
        /// The offending row.
        row: usize,
        /// Its number of columns.
        columns: usize,
        /// The number of rows in the matrix.
        expected: usize,
    },

    /// The matrix differs from its transpose.
    #[error("matrix is not symmetric at ({0}, {1})")]
    Asymmetric(usize, usize),

    /// A diagonal element is not zero.
    #[error("matrix is not hollow: diagonal element {0} is non-zero")]
    NotHollow(usize),

    /// A value is NaN or infinite.
    #[error("matrix contains a non-finite value at ({0}, {1})")]
    NonFinite(usize, usize),

    /// An id is used more than once.
    #[error("duplicate id: {0}")]
    DuplicateId(String),
}

/// A distance matrix between samples.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceMatrix {
    ids: Vec<String>,
    data: Vec<Vec<f64>>,
    lookup: HashMap<String, usize>,
}

impl DistanceMatrix {
    /// Creates a new [`DistanceMatrix`], validating that it is square,
    /// symmetric, hollow and that its ids are unique.
    ///
    /// ```
    /// use recipes::distance::matrix::DistanceMatrix;
    ///
    /// let ids = vec![String::from("a"), String::from("b")];
    /// let dm = DistanceMatrix::new(ids, vec![vec![0.0, 0.3], vec![0.3, 0.0]]).unwrap();
    /// assert_eq!(dm.get(0, 1), 0.3);
    /// assert_eq!(dm.index_of("b"), Some(1));
    ///
    /// let ids = vec![String::from("a"), String::from("b")];
    /// assert!(DistanceMatrix::new(ids, vec![vec![0.0, 0.3], vec![0.4, 0.0]]).is_err());
    /// ```
    pub fn new(ids: Vec<String>, data: Vec<Vec<f64>>) -> Result<Self, MatrixError> {
        let n = data.len();

        if ids.len() != n {
            return Err(MatrixError::IdCountMismatch {
                ids: ids.len(),
                rows: n,
            });
        }

        for (i, row) in data.iter().enumerate() {
            if row.len() != n {
                return Err(MatrixError::NotSquare {
                    row: i,
                    columns: row.len(),
                    expected: n,
                });
            }
        }

        for i in 0..n {
            for j in 0..n {
                if !data[i][j].is_finite() {
                    return Err(MatrixError::NonFinite(i, j));
                }
            }

            if data[i][i].abs() > TOLERANCE {
                return Err(MatrixError::NotHollow(i));
            }

            for j in (i + 1)..n {
                if (data[i][j] - data[j][i]).abs() > TOLERANCE {
                    return Err(MatrixError::Asymmetric(i, j));
                }
            }
        }

        let mut seen = HashSet::new();
        for id in &ids {
            if !seen.insert(id.as_str()) {
                return Err(MatrixError::DuplicateId(id.clone()));
            }
        }

        let lookup = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        Ok(DistanceMatrix { ids, data, lookup })
    }

    /// Reads a [`DistanceMatrix`] from a TSV file. The header holds an empty
    /// cell followed by the sample ids, and each row starts with its id.
    pub fn read<P>(src: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = src.as_ref();
        let table = LabelledTable::read(path)?;

        if table.row_ids != table.column_ids {
            anyhow::bail!(
                "row ids and column ids differ in distance matrix: {}",
                path.display()
            );
        }

        let data = table.to_numeric()?;
        DistanceMatrix::new(table.row_ids, data)
            .with_context(|| format!("invalid distance matrix: {}", path.display()))
    }

    /// The number of samples in the matrix.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the matrix has no samples.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The sample ids, in matrix order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// The distance between the samples at positions `i` and `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i][j]
    }

    /// The position of a sample id, if present.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.lookup.get(id).copied()
    }

    /// Resolves pairs of sample ids into pairs of positions.
    pub fn resolve_pairs(&self, pairs: &[(String, String)]) -> anyhow::Result<Vec<Pair>> {
        pairs
            .iter()
            .map(|(a, b)| {
                let i = self
                    .index_of(a)
                    .with_context(|| format!("sample id not found in distance matrix: {}", a))?;
                let j = self
                    .index_of(b)
                    .with_context(|| format!("sample id not found in distance matrix: {}", b))?;
                Ok((i, j))
            })
            .collect()
    }
}
