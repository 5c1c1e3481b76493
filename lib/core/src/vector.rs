use serde::{Deserialize, Serialize};

/// A sparse vector of `f64` values with strictly increasing indices.
///
/// Explicit zeros are never stored, so two vectors that encode the same
/// values compare equal regardless of how they were built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SparseVector {
    dim: usize,
    indices: Vec<u32>,
    values: Vec<f64>,
}

impl SparseVector {
    /// An all-zero vector of the given dimension
    #[inline]
    #[must_use]
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build from a dense slice, dropping zero entries
    #[must_use]
    pub fn from_dense(data: &[f64]) -> Self {
        let mut v = Self::zeros(data.len());
        for (i, &x) in data.iter().enumerate() {
            if x != 0.0 {
                v.indices.push(i as u32);
                v.values.push(x);
            }
        }
        v
    }

    /// Build from `(index, value)` pairs.
    ///
    /// Pairs may arrive in any order; duplicate indices are summed and
    /// out-of-range indices are ignored.
    #[must_use]
    pub fn from_pairs(dim: usize, pairs: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut pairs: Vec<(usize, f64)> = pairs.into_iter().filter(|(i, _)| *i < dim).collect();
        pairs.sort_by_key(|(i, _)| *i);

        let mut v = Self::zeros(dim);
        for (i, x) in pairs {
            match v.indices.last() {
                Some(&last) if last as usize == i => {
                    if let Some(acc) = v.values.last_mut() {
                        *acc += x;
                    }
                }
                _ => {
                    v.indices.push(i as u32);
                    v.values.push(x);
                }
            }
        }
        v.prune_zeros();
        v
    }

    /// Horizontally concatenate blocks, shifting each block's indices by the
    /// widths of the blocks before it.
    #[must_use]
    pub fn hstack(blocks: &[&SparseVector]) -> Self {
        let dim = blocks.iter().map(|b| b.dim).sum();
        let nnz = blocks.iter().map(|b| b.nnz()).sum();
        let mut out = Self {
            dim,
            indices: Vec::with_capacity(nnz),
            values: Vec::with_capacity(nnz),
        };

        let mut offset = 0u32;
        for block in blocks {
            out.indices.extend(block.indices.iter().map(|i| i + offset));
            out.values.extend_from_slice(&block.values);
            offset += block.dim as u32;
        }
        out
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored (nonzero) entries
    #[inline]
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at `index`, zero when not stored
    #[must_use]
    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&(index as u32)) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    /// Iterate stored `(index, value)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices
            .iter()
            .zip(self.values.iter())
            .map(|(&i, &x)| (i as usize, x))
    }

    #[must_use]
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim];
        for (i, x) in self.iter() {
            dense[i] = x;
        }
        dense
    }

    /// Dot product via a merge join over the sorted indices
    #[must_use]
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut a, mut b) = (0, 0);
        let mut sum = 0.0;
        while a < self.indices.len() && b < other.indices.len() {
            match self.indices[a].cmp(&other.indices[b]) {
                std::cmp::Ordering::Less => a += 1,
                std::cmp::Ordering::Greater => b += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[a] * other.values[b];
                    a += 1;
                    b += 1;
                }
            }
        }
        sum
    }

    /// Euclidean norm
    #[inline]
    #[must_use]
    pub fn norm(&self) -> f64 {
        self.values.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    /// Cosine similarity; zero when either vector has zero norm or the
    /// dimensions differ
    #[must_use]
    pub fn cosine_similarity(&self, other: &SparseVector) -> f64 {
        if self.dim != other.dim {
            return 0.0;
        }
        let norm_a = self.norm();
        let norm_b = other.norm();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        self.dot(other) / (norm_a * norm_b)
    }

    /// Cosine distance `1 - cos`, clamped to `[0, 2]`
    #[inline]
    #[must_use]
    pub fn cosine_distance(&self, other: &SparseVector) -> f64 {
        (1.0 - self.cosine_similarity(other)).clamp(0.0, 2.0)
    }

    fn prune_zeros(&mut self) {
        let mut keep = 0;
        for k in 0..self.indices.len() {
            if self.values[k] != 0.0 {
                self.indices[keep] = self.indices[k];
                self.values[keep] = self.values[k];
                keep += 1;
            }
        }
        self.indices.truncate(keep);
        self.values.truncate(keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let v1 = SparseVector::from_dense(&[1.0, 0.0]);
        let v2 = SparseVector::from_dense(&[1.0, 0.0]);
        assert!((v1.cosine_similarity(&v2) - 1.0).abs() < 1e-12);

        let v3 = SparseVector::from_dense(&[1.0, 0.0]);
        let v4 = SparseVector::from_dense(&[0.0, 1.0]);
        assert!(v3.cosine_similarity(&v4).abs() < 1e-12);
        assert!((v3.cosine_distance(&v4) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_vector_has_unit_distance() {
        let zero = SparseVector::zeros(3);
        let v = SparseVector::from_dense(&[1.0, 2.0, 3.0]);
        assert_eq!(zero.cosine_similarity(&v), 0.0);
        assert_eq!(zero.cosine_distance(&v), 1.0);
    }

    #[test]
    fn test_from_pairs_sorts_and_merges() {
        let v = SparseVector::from_pairs(5, vec![(3, 1.0), (1, 2.0), (3, 2.0), (9, 4.0), (0, 0.0)]);
        assert_eq!(v.indices(), &[1, 3]);
        assert_eq!(v.values(), &[2.0, 3.0]);
        assert_eq!(v.get(3), 3.0);
        assert_eq!(v.get(2), 0.0);
    }

    #[test]
    fn test_hstack_offsets_blocks() {
        let a = SparseVector::from_dense(&[0.0, 1.0]);
        let b = SparseVector::zeros(3);
        let c = SparseVector::from_dense(&[5.0, 0.0]);
        let stacked = SparseVector::hstack(&[&a, &b, &c]);

        assert_eq!(stacked.dim(), 7);
        assert_eq!(stacked.to_dense(), vec![0.0, 1.0, 0.0, 0.0, 0.0, 5.0, 0.0]);
    }

    #[test]
    fn test_dot_matches_dense() {
        let a = SparseVector::from_dense(&[1.0, 0.0, 2.0, 0.0, -1.0]);
        let b = SparseVector::from_dense(&[0.5, 3.0, 0.0, 0.0, 4.0]);
        assert!((a.dot(&b) - (0.5 - 4.0)).abs() < 1e-12);
    }
}
