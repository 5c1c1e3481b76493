//! Fitted per-field encoders
//!
//! Each encoder is fit once over the full catalog and is read-only
//! afterwards. All three serialize verbatim so a reloaded encoder produces
//! exactly the vectors the index was built from.

use crate::amenities::amenity_tokens;
use serde::{Deserialize, Serialize};
use smartliving_core::{Error, Result, SparseVector};

/// Category used for rows and queries without a property type
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// One-hot encoder over a sorted category vocabulary.
/// Unseen categories encode to an all-zero block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CategoryEncoder {
    categories: Vec<String>,
}

impl CategoryEncoder {
    pub fn fit<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut categories: Vec<String> = values.into_iter().map(str::to_string).collect();
        categories.sort();
        categories.dedup();
        Self { categories }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn transform(&self, value: &str) -> SparseVector {
        match self.categories.binary_search_by(|c| c.as_str().cmp(value)) {
            Ok(pos) => SparseVector::from_pairs(self.len(), [(pos, 1.0)]),
            Err(_) => SparseVector::zeros(self.len()),
        }
    }
}

/// Token-count vectorizer over a sorted vocabulary. Input must already be
/// normalized with [`normalize_amenities`](crate::normalize_amenities).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AmenityVectorizer {
    vocabulary: Vec<String>,
}

impl AmenityVectorizer {
    pub fn fit<'a>(documents: impl IntoIterator<Item = &'a str>) -> Self {
        let mut vocabulary: Vec<String> = documents
            .into_iter()
            .flat_map(amenity_tokens)
            .map(str::to_string)
            .collect();
        vocabulary.sort();
        vocabulary.dedup();
        Self { vocabulary }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Position of a token in the vocabulary
    pub fn token_index(&self, token: &str) -> Option<usize> {
        self.vocabulary.binary_search_by(|t| t.as_str().cmp(token)).ok()
    }

    /// Count vector; tokens outside the vocabulary are dropped
    pub fn transform(&self, normalized: &str) -> SparseVector {
        SparseVector::from_pairs(
            self.len(),
            amenity_tokens(normalized).filter_map(|t| self.token_index(t).map(|i| (i, 1.0))),
        )
    }
}

/// Zero-mean, unit-variance scaling with population statistics.
/// Constant columns keep a scale of 1.0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(Error::Config("cannot fit scaler with zero samples".into()));
        };
        let n_features = first.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != n_features) {
            return Err(Error::InvalidDimension {
                expected: n_features,
                actual: bad.len(),
            });
        }

        let n = rows.len() as f64;
        let mut mean = vec![0.0; n_features];
        for row in rows {
            for (m, x) in mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut var = vec![0.0; n_features];
        for row in rows {
            for ((v, x), m) in var.iter_mut().zip(row).zip(&mean) {
                let diff = x - m;
                *v += diff * diff;
            }
        }
        let scale = var
            .into_iter()
            .map(|v| {
                let std = (v / n).sqrt();
                if std > f64::EPSILON {
                    std
                } else {
                    1.0
                }
            })
            .collect();

        Ok(Self { mean, scale })
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    pub fn transform(&self, values: &[f64]) -> Result<Vec<f64>> {
        if values.len() != self.n_features() {
            return Err(Error::InvalidDimension {
                expected: self.n_features(),
                actual: values.len(),
            });
        }
        Ok(values
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }
}
