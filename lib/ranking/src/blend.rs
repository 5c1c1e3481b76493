//! Hybrid score blending
//!
//! Combines retrieval similarity, the smart living score and an
//! affordability metric into one score per candidate. Every component is
//! computed relative to the surviving candidate set, never the catalog.

use crate::explain::{RankedProperty, ScoreBreakdown};
use serde::{Deserialize, Serialize};
use smartliving_core::catalog::median;
use smartliving_core::{Error, PropertyRecord, Result};

/// Divisor floor for min-max normalization
pub const NORMALIZE_EPSILON: f64 = 1e-9;

/// Ratios at or above this multiple of the median score zero affordability
pub const AFFORDABILITY_MEDIAN_MULTIPLIER: f64 = 3.0;

/// Weights of the three blend components. They need not sum to 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BlendWeights {
    pub similarity: f64,
    pub smart: f64,
    pub affordability: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            similarity: 0.6,
            smart: 0.25,
            affordability: 0.15,
        }
    }
}

impl From<(f64, f64, f64)> for BlendWeights {
    fn from((similarity, smart, affordability): (f64, f64, f64)) -> Self {
        Self {
            similarity,
            smart,
            affordability,
        }
    }
}

impl BlendWeights {
    pub fn new(similarity: f64, smart: f64, affordability: f64) -> Self {
        Self {
            similarity,
            smart,
            affordability,
        }
    }

    /// Weights must be finite so the hybrid score stays finite
    pub fn validate(&self) -> Result<()> {
        for (name, w) in [
            ("similarity", self.similarity),
            ("smart", self.smart),
            ("affordability", self.affordability),
        ] {
            if !w.is_finite() {
                return Err(Error::InvalidWeights(format!("{} weight is {}", name, w)));
            }
        }
        Ok(())
    }
}

/// A retrieved property that survived filtering
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Row position in the index
    pub position: usize,
    pub record: &'a PropertyRecord,
    /// `1 - cosine distance`
    pub similarity: f64,
}

/// Median of the present ratios, 1.0 when none are present
pub fn median_ratio(ratios: &[Option<f64>]) -> f64 {
    let mut present: Vec<f64> = ratios.iter().flatten().copied().filter(|r| r.is_finite()).collect();
    median(&mut present).unwrap_or(1.0)
}

/// Affordability per ratio: `clip((3m - r) / 3m, 0, 1)` where `m` is the
/// median ratio and missing ratios take the median.
///
/// With a non-positive median the scale is meaningless; ratios `<= 0` then
/// score 1 and everything else 0.
pub fn affordability(ratios: &[Option<f64>]) -> Vec<f64> {
    let med = median_ratio(ratios);
    let ceiling = med * AFFORDABILITY_MEDIAN_MULTIPLIER;

    ratios
        .iter()
        .map(|r| {
            let ratio = r.filter(|v| v.is_finite()).unwrap_or(med);
            if ceiling > 0.0 {
                ((ceiling - ratio) / ceiling).clamp(0.0, 1.0)
            } else if ratio <= 0.0 {
                1.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Min-max scale into `[0, 1]`; all-equal inputs map to 0
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = (max - min).max(NORMALIZE_EPSILON);
    values.iter().map(|v| (v - min) / range).collect()
}

/// Score candidates and return them best first.
///
/// The sort is stable, so equal scores keep their retrieval order, and the
/// output is truncated to `top_n`.
pub fn rank(candidates: &[Candidate<'_>], weights: &BlendWeights, top_n: usize) -> Vec<RankedProperty> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let ratios: Vec<Option<f64>> = candidates.iter().map(|c| c.record.price_to_income_ratio).collect();
    let similarities: Vec<f64> = candidates.iter().map(|c| c.similarity).collect();
    let smart_scores: Vec<f64> = candidates.iter().map(|c| c.record.smart_living_score).collect();

    let affordability = affordability(&ratios);
    let similarity_norm = min_max_normalize(&similarities);
    let smart_norm = min_max_normalize(&smart_scores);

    let mut ranked: Vec<RankedProperty> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let breakdown = ScoreBreakdown {
                similarity: c.similarity,
                similarity_norm: similarity_norm[i],
                smart_norm: smart_norm[i],
                affordability: affordability[i],
            };
            let hybrid = weights.similarity * breakdown.similarity_norm
                + weights.smart * breakdown.smart_norm
                + weights.affordability * breakdown.affordability;
            RankedProperty::new(c.record, hybrid, breakdown)
        })
        .collect();

    ranked.sort_by(|a, b| b.hybrid_score.total_cmp(&a.hybrid_score));
    ranked.truncate(top_n);
    ranked
}
