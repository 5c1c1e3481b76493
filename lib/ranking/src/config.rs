use crate::blend::BlendWeights;
use serde::{Deserialize, Serialize};

/// Neighbors retrieved before hard filters run
pub const DEFAULT_CANDIDATE_POOL: usize = 200;

/// Results returned when the caller does not say
pub const DEFAULT_TOP_N: usize = 10;

/// Tunables shared by every request against one recommender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecommenderConfig {
    pub candidate_pool: usize,
    pub default_weights: BlendWeights,
    pub default_top_n: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            candidate_pool: DEFAULT_CANDIDATE_POOL,
            default_weights: BlendWeights::default(),
            default_top_n: DEFAULT_TOP_N,
        }
    }
}

impl RecommenderConfig {
    #[must_use]
    pub fn with_candidate_pool(mut self, pool: usize) -> Self {
        self.candidate_pool = pool;
        self
    }

    #[must_use]
    pub fn with_weights(mut self, weights: BlendWeights) -> Self {
        self.default_weights = weights;
        self
    }
}
