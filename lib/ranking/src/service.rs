//! Shared recommender handle
//!
//! Requests read the current [`Recommender`] through an `Arc` taken under a
//! short read lock; a retrain installs a complete new instance with a single
//! swap so readers never see a half-built state.

use crate::blend::BlendWeights;
use crate::explain::{RankedProperty, RecommendationResponse};
use crate::preferences::Preferences;
use crate::recommender::Recommender;
use parking_lot::RwLock;
use smartliving_core::{Error, PropertyId, Result};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default)]
pub struct RecommenderService {
    current: RwLock<Option<Arc<Recommender>>>,
}

impl RecommenderService {
    /// A service with nothing installed; every request fails with `NotFitted`
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recommender(recommender: Recommender) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(recommender))),
        }
    }

    /// Replace the active recommender, returning the previous one
    pub fn install(&self, recommender: Recommender) -> Option<Arc<Recommender>> {
        let size = recommender.catalog().len();
        let previous = self.current.write().replace(Arc::new(recommender));
        info!("Installed recommender over {} properties", size);
        previous
    }

    pub fn current(&self) -> Result<Arc<Recommender>> {
        self.current.read().clone().ok_or(Error::NotFitted)
    }

    pub fn is_ready(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn recommend_by_preferences(
        &self,
        prefs: &Preferences,
        top_n: usize,
        weights: &BlendWeights,
    ) -> Result<Vec<RankedProperty>> {
        self.current()?.recommend_by_preferences(prefs, top_n, weights)
    }

    pub fn recommend_similar(
        &self,
        property_id: PropertyId,
        top_n: usize,
        weights: &BlendWeights,
    ) -> Result<Vec<RankedProperty>> {
        self.current()?.recommend_similar(property_id, top_n, weights)
    }

    pub fn preference_response(
        &self,
        prefs: &Preferences,
        top_n: usize,
        weights: &BlendWeights,
    ) -> Result<RecommendationResponse> {
        self.current()?.preference_response(prefs, top_n, weights)
    }

    pub fn similar_response(
        &self,
        property_id: PropertyId,
        top_n: usize,
        weights: &BlendWeights,
    ) -> Result<RecommendationResponse> {
        self.current()?.similar_response(property_id, top_n, weights)
    }
}
