//! Exact cosine nearest-neighbor index over a sparse feature matrix.
//!
//! Every query scores the whole matrix (in parallel), so results are exact
//! and deterministic: ascending cosine distance, ties broken by row
//! position.

use crate::matrix::SparseMatrix;
use crate::vector::SparseVector;
use crate::{Error, Result};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Neighbor lists, closest first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Neighbors {
    /// Cosine distances in `[0, 2]`
    pub distances: Vec<f64>,
    /// Row positions in the fitted matrix
    pub positions: Vec<usize>,
}

impl Neighbors {
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// `(position, similarity)` pairs where similarity is `1 - distance`
    pub fn similarities(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.positions
            .iter()
            .zip(self.distances.iter())
            .map(|(&p, &d)| (p, 1.0 - d))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NearestNeighbors {
    matrix: SparseMatrix,
    norms: Vec<f64>,
}

impl NearestNeighbors {
    /// Index a feature matrix. The matrix must have at least one row.
    pub fn fit(matrix: SparseMatrix) -> Result<Self> {
        if matrix.is_empty() {
            return Err(Error::Config("cannot fit a neighbor index on an empty matrix".into()));
        }
        let norms = matrix.rows().iter().map(SparseVector::norm).collect();
        info!("NearestNeighbors fitted on {:?} matrix", matrix.shape());
        Ok(Self { matrix, norms })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.matrix.n_rows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    /// Width of the indexed vectors
    #[inline]
    pub fn dim(&self) -> usize {
        self.matrix.n_cols()
    }

    #[inline]
    pub fn matrix(&self) -> &SparseMatrix {
        &self.matrix
    }

    /// Stored row at `position`
    #[inline]
    pub fn row(&self, position: usize) -> Option<&SparseVector> {
        self.matrix.row(position)
    }

    /// The `k` closest rows to `query`; `k` is clamped to the row count
    pub fn kneighbors(&self, query: &SparseVector, k: usize) -> Result<Neighbors> {
        if query.dim() != self.dim() {
            return Err(Error::InvalidDimension {
                expected: self.dim(),
                actual: query.dim(),
            });
        }
        Ok(self.search(query, query.norm(), k))
    }

    /// The `k` closest rows to the stored row at `position`. The row itself
    /// comes back at distance 0 unless another row ties with it.
    pub fn kneighbors_of_row(&self, position: usize, k: usize) -> Result<Neighbors> {
        let query = self.matrix.row(position).ok_or_else(|| {
            Error::Catalog(format!("row position {} outside index of {} rows", position, self.len()))
        })?;
        Ok(self.search(query, self.norms[position], k))
    }

    fn search(&self, query: &SparseVector, query_norm: f64, k: usize) -> Neighbors {
        let k = k.min(self.len());
        if k == 0 {
            return Neighbors::default();
        }

        let mut scored: Vec<(OrderedFloat<f64>, usize)> = self
            .matrix
            .rows()
            .par_iter()
            .zip(self.norms.par_iter())
            .enumerate()
            .map(|(pos, (row, &norm))| {
                let sim = if query_norm == 0.0 || norm == 0.0 {
                    0.0
                } else {
                    row.dot(query) / (norm * query_norm)
                };
                (OrderedFloat((1.0 - sim).clamp(0.0, 2.0)), pos)
            })
            .collect();

        if k < scored.len() {
            scored.select_nth_unstable(k - 1);
            scored.truncate(k);
        }
        scored.sort_unstable();

        let (distances, positions) = scored.into_iter().map(|(d, p)| (d.0, p)).unzip();
        Neighbors { distances, positions }
    }
}
