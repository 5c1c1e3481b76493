use crate::vector::SparseVector;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Row-major sparse matrix; every row has the same width
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SparseMatrix {
    n_cols: usize,
    rows: Vec<SparseVector>,
}

impl SparseMatrix {
    /// Empty matrix with a fixed column count
    #[must_use]
    pub fn with_cols(n_cols: usize) -> Self {
        Self {
            n_cols,
            rows: Vec::new(),
        }
    }

    /// Build from rows, checking that every row has width `n_cols`
    pub fn from_rows(n_cols: usize, rows: Vec<SparseVector>) -> Result<Self> {
        if let Some(bad) = rows.iter().find(|r| r.dim() != n_cols) {
            return Err(Error::InvalidDimension {
                expected: n_cols,
                actual: bad.dim(),
            });
        }
        Ok(Self { n_cols, rows })
    }

    /// Concatenate blocks column-wise. All blocks must have the same row count.
    pub fn hstack(blocks: &[&SparseMatrix]) -> Result<Self> {
        let n_rows = blocks.first().map(|b| b.n_rows()).unwrap_or(0);
        if let Some(bad) = blocks.iter().find(|b| b.n_rows() != n_rows) {
            return Err(Error::InvalidDimension {
                expected: n_rows,
                actual: bad.n_rows(),
            });
        }

        let n_cols = blocks.iter().map(|b| b.n_cols).sum();
        let rows = (0..n_rows)
            .map(|i| {
                let parts: Vec<&SparseVector> = blocks.iter().map(|b| &b.rows[i]).collect();
                SparseVector::hstack(&parts)
            })
            .collect();
        Ok(Self { n_cols, rows })
    }

    pub fn push(&mut self, row: SparseVector) -> Result<()> {
        if row.dim() != self.n_cols {
            return Err(Error::InvalidDimension {
                expected: self.n_cols,
                actual: row.dim(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// `(rows, cols)`
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.n_cols)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn row(&self, i: usize) -> Option<&SparseVector> {
        self.rows.get(i)
    }

    #[inline]
    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }

    /// Total stored entries across all rows
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(SparseVector::nnz).sum()
    }
}
