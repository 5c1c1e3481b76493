//! The fitted recommender
//!
//! A [`Recommender`] bundles a catalog with the encoders and index built
//! from it. It is immutable once constructed; a refit builds a new one.

use crate::blend::{rank, BlendWeights, Candidate};
use crate::config::RecommenderConfig;
use crate::explain::{RankedProperty, RecommendationResponse};
use crate::filter::{Filter, PreferenceFilter};
use crate::preferences::Preferences;
use smartliving_core::{
    Catalog, Error, NearestNeighbors, PropertyId, Result, SparseVector,
};
use smartliving_features::FittedEncoders;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Recommender {
    config: RecommenderConfig,
    catalog: Catalog,
    encoders: FittedEncoders,
    index: NearestNeighbors,
}

impl Recommender {
    /// Fit encoders and index over the whole catalog
    pub fn fit(catalog: Catalog, config: RecommenderConfig) -> Result<Self> {
        let start = Instant::now();
        let (encoders, matrix) = FittedEncoders::fit(&catalog)?;
        let index = NearestNeighbors::fit(matrix)?;
        info!(
            "Fitted recommender over {} properties ({} features) in {:?}",
            catalog.len(),
            index.dim(),
            start.elapsed()
        );

        Ok(Self {
            config,
            catalog,
            encoders,
            index,
        })
    }

    /// Reassemble from restored artifacts. The catalog is realigned to the
    /// saved row order and must hold exactly the saved properties, each
    /// encoding to its saved index row.
    pub fn from_parts(
        catalog: &Catalog,
        encoders: FittedEncoders,
        index: NearestNeighbors,
        index_to_id: &[PropertyId],
        config: RecommenderConfig,
    ) -> Result<Self> {
        if index.len() != index_to_id.len() {
            return Err(Error::ArtifactMismatch(format!(
                "index has {} rows but {} ids were saved",
                index.len(),
                index_to_id.len()
            )));
        }
        if encoders.dim() != index.dim() {
            return Err(Error::ArtifactMismatch(format!(
                "encoders produce {} features but the index holds {}",
                encoders.dim(),
                index.dim()
            )));
        }
        if catalog.len() != index_to_id.len() {
            return Err(Error::ArtifactMismatch(format!(
                "catalog has {} properties but the saved index covers {}",
                catalog.len(),
                index_to_id.len()
            )));
        }
        let catalog = catalog.aligned_to(index_to_id)?;
        if &encoders.transform_catalog(&catalog)? != index.matrix() {
            return Err(Error::ArtifactMismatch(
                "catalog records no longer encode to the saved index rows".into(),
            ));
        }
        info!("Restored recommender over {} properties", catalog.len());

        Ok(Self {
            config,
            catalog,
            encoders,
            index,
        })
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn encoders(&self) -> &FittedEncoders {
        &self.encoders
    }

    pub fn index(&self) -> &NearestNeighbors {
        &self.index
    }

    /// Property id of every index row, in row order
    pub fn index_to_id(&self) -> Vec<PropertyId> {
        self.catalog.ids()
    }

    /// Encode preferences through the same path as catalog rows
    pub fn query_vector(&self, prefs: &Preferences) -> Result<SparseVector> {
        self.encoders
            .encode(prefs.property_type.as_deref(), &prefs.amenities, prefs)
    }

    /// Retrieve, filter and blend for a preference query.
    ///
    /// Filters that remove every candidate yield an empty list.
    pub fn recommend_by_preferences(
        &self,
        prefs: &Preferences,
        top_n: usize,
        weights: &BlendWeights,
    ) -> Result<Vec<RankedProperty>> {
        Ok(self.preference_response(prefs, top_n, weights)?.result)
    }

    /// Like [`recommend_by_preferences`](Self::recommend_by_preferences),
    /// with summary statistics
    pub fn preference_response(
        &self,
        prefs: &Preferences,
        top_n: usize,
        weights: &BlendWeights,
    ) -> Result<RecommendationResponse> {
        weights.validate()?;
        let query = self.query_vector(prefs)?;

        let k = self.catalog.len().min(self.config.candidate_pool);
        let neighbors = self.index.kneighbors(&query, k)?;
        let filter = PreferenceFilter::from_preferences(prefs);

        let candidates: Vec<Candidate> = neighbors
            .similarities()
            .filter_map(|(position, similarity)| {
                let record = self.catalog.record_at(position)?;
                filter.matches(record).then_some(Candidate {
                    position,
                    record,
                    similarity,
                })
            })
            .collect();

        if candidates.is_empty() {
            info!(
                "No properties left after filtering {} candidates ({} conditions)",
                neighbors.len(),
                filter.conditions().len()
            );
            return Ok(RecommendationResponse::new(Vec::new(), 0));
        }
        debug!(
            "{} of {} retrieved candidates passed filters",
            candidates.len(),
            neighbors.len()
        );

        Ok(RecommendationResponse::new(
            rank(&candidates, weights, top_n),
            candidates.len(),
        ))
    }

    /// Properties most similar to a catalog property, excluding itself
    pub fn recommend_similar(
        &self,
        property_id: PropertyId,
        top_n: usize,
        weights: &BlendWeights,
    ) -> Result<Vec<RankedProperty>> {
        Ok(self.similar_response(property_id, top_n, weights)?.result)
    }

    pub fn similar_response(
        &self,
        property_id: PropertyId,
        top_n: usize,
        weights: &BlendWeights,
    ) -> Result<RecommendationResponse> {
        weights.validate()?;
        let position = self
            .catalog
            .position(property_id)
            .ok_or(Error::PropertyNotFound(property_id))?;

        let k = self.catalog.len().min(top_n.saturating_add(1));
        let neighbors = self.index.kneighbors_of_row(position, k)?;

        let candidates: Vec<Candidate> = neighbors
            .similarities()
            .filter(|(p, _)| *p != position)
            .take(top_n)
            .filter_map(|(p, similarity)| {
                self.catalog.record_at(p).map(|record| Candidate {
                    position: p,
                    record,
                    similarity,
                })
            })
            .collect();
        debug!(
            "{} neighbors of property {} after self-exclusion",
            candidates.len(),
            property_id
        );

        Ok(RecommendationResponse::new(
            rank(&candidates, weights, top_n),
            candidates.len(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartliving_core::PropertyRecord;

    fn apartment(id: PropertyId, price: f64) -> PropertyRecord {
        PropertyRecord::new(id, price, 29.7, -95.3)
            .with_property_type("Apartment")
            .with_amenities("Gym, Parking")
            .with_location("Houston")
            .with_rooms(2, 1)
            .with_smart_living_score(60.0)
            .with_price_to_income_ratio(price / 100_000.0)
    }

    fn catalog() -> Catalog {
        Catalog::from_records(vec![
            apartment(1, 100_000.0),
            apartment(2, 500_000.0),
            apartment(3, 1_000_000.0),
            PropertyRecord::new(4, 250_000.0, 29.8, -95.4)
                .with_property_type("House")
                .with_amenities("Pool, Garden")
                .with_location("Austin")
                .with_rooms(4, 3)
                .with_smart_living_score(85.0)
                .with_price_to_income_ratio(3.0),
            PropertyRecord::new(5, 180_000.0, 29.6, -95.2)
                .with_property_type("Condo")
                .with_amenities("Gym")
                .with_location("houston")
                .with_rooms(1, 1)
                .with_smart_living_score(40.0),
        ])
    }

    fn fitted() -> Recommender {
        Recommender::fit(catalog(), RecommenderConfig::default()).unwrap()
    }

    #[test]
    fn test_budget_filter() {
        let r = fitted();
        let prefs = Preferences::new().with_property_type("Apartment").with_max_budget(400_000.0);
        let results = r.recommend_by_preferences(&prefs, 10, &BlendWeights::default()).unwrap();

        assert!(!results.is_empty());
        assert!(results.iter().all(|p| p.price <= 400_000.0));
        assert!(results.iter().any(|p| p.id == 1));
        assert!(!results.iter().any(|p| p.id == 2 || p.id == 3));
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let r = fitted();
        let prefs = Preferences::new()
            .with_location("HOUSTON")
            .with_min_rooms(2.0)
            .with_min_smart_score(50.0);
        let results = r.recommend_by_preferences(&prefs, 10, &BlendWeights::default()).unwrap();

        let mut ids: Vec<PropertyId> = results.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_after_filter_is_ok() {
        let r = fitted();
        let prefs = Preferences::new().with_max_budget(1.0);
        let response = r.preference_response(&prefs, 10, &BlendWeights::default()).unwrap();
        assert!(response.result.is_empty());
        assert_eq!(response.stats.results_count, 0);
    }

    #[test]
    fn test_unseen_tokens_do_not_raise() {
        let r = fitted();
        let prefs = Preferences::new().with_amenities("sauna").with_property_type("Castle");
        let query = r.query_vector(&prefs).unwrap();
        assert!(query
            .indices()
            .iter()
            .all(|&i| i as usize >= r.encoders().layout().numeric_offset()));
        assert!(r.recommend_by_preferences(&prefs, 3, &BlendWeights::default()).is_ok());
    }

    #[test]
    fn test_scores_bounded_and_sorted() {
        let r = fitted();
        let weights = BlendWeights::default();
        let results = r.recommend_by_preferences(&Preferences::new(), 10, &weights).unwrap();
        let max = weights.similarity + weights.smart + weights.affordability;

        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|p| p.hybrid_score >= 0.0 && p.hybrid_score <= max + 1e-12));
        assert!(results.windows(2).all(|w| w[0].hybrid_score >= w[1].hybrid_score));
    }

    #[test]
    fn test_top_n_contract() {
        let r = fitted();
        let results = r.recommend_by_preferences(&Preferences::new(), 2, &BlendWeights::default()).unwrap();
        assert_eq!(results.len(), 2);
        assert!(r
            .recommend_by_preferences(&Preferences::new(), 0, &BlendWeights::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_deterministic() {
        let r = fitted();
        let prefs = Preferences::new().with_amenities("gym").with_min_smart_score(10.0);
        let a = r.recommend_by_preferences(&prefs, 5, &BlendWeights::default()).unwrap();
        let b = r.recommend_by_preferences(&prefs, 5, &BlendWeights::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_similar_excludes_self() {
        let r = fitted();
        for id in [1, 2, 3, 4, 5] {
            let results = r.recommend_similar(id, 3, &BlendWeights::default()).unwrap();
            assert!(results.len() <= 3);
            assert!(results.iter().all(|p| p.id != id));
        }
    }

    #[test]
    fn test_similar_prefers_identical_listing() {
        let r = fitted();
        let weights = BlendWeights::new(1.0, 0.0, 0.0);
        let results = r.recommend_similar(1, 1, &weights).unwrap();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0].id, 2 | 3));
    }

    #[test]
    fn test_similar_unknown_id() {
        let r = fitted();
        assert!(matches!(
            r.recommend_similar(99, 5, &BlendWeights::default()),
            Err(Error::PropertyNotFound(99))
        ));
    }

    #[test]
    fn test_similar_on_tiny_catalogs() {
        // The other listing of a two-row catalog is returned; only a
        // one-row catalog has nothing to recommend.
        let two = Catalog::from_records(vec![apartment(1, 100_000.0), apartment(2, 200_000.0)]);
        let r = Recommender::fit(two, RecommenderConfig::default()).unwrap();
        let ids: Vec<PropertyId> = r
            .recommend_similar(2, 5, &BlendWeights::default())
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![1]);

        let one = Catalog::from_records(vec![apartment(7, 100_000.0)]);
        let r = Recommender::fit(one, RecommenderConfig::default()).unwrap();
        assert!(r.recommend_similar(7, 5, &BlendWeights::default()).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_weights() {
        let r = fitted();
        let weights = BlendWeights::new(f64::INFINITY, 0.0, 0.0);
        assert!(matches!(
            r.recommend_by_preferences(&Preferences::new(), 5, &weights),
            Err(Error::InvalidWeights(_))
        ));
    }

    #[test]
    fn test_from_parts_realigns_catalog() {
        let fitted = fitted();
        let ids = fitted.index_to_id();

        let shuffled = Catalog::from_records(fitted.catalog().records().iter().rev().cloned().collect());
        let restored = Recommender::from_parts(
            &shuffled,
            fitted.encoders().clone(),
            fitted.index().clone(),
            &ids,
            RecommenderConfig::default(),
        )
        .unwrap();

        assert_eq!(restored.index_to_id(), ids);
        let prefs = Preferences::new().with_amenities("gym");
        assert_eq!(
            restored.recommend_by_preferences(&prefs, 5, &BlendWeights::default()).unwrap(),
            fitted.recommend_by_preferences(&prefs, 5, &BlendWeights::default()).unwrap()
        );
    }

    #[test]
    fn test_from_parts_rejects_missing_id() {
        let fitted = fitted();
        let partial = Catalog::from_records(fitted.catalog().records()[..3].to_vec());
        let err = Recommender::from_parts(
            &partial,
            fitted.encoders().clone(),
            fitted.index().clone(),
            &fitted.index_to_id(),
            RecommenderConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ArtifactMismatch(_)));
    }

    fn restore_with(catalog: &Catalog) -> Result<Recommender> {
        let fitted = fitted();
        Recommender::from_parts(
            catalog,
            fitted.encoders().clone(),
            fitted.index().clone(),
            &fitted.index_to_id(),
            RecommenderConfig::default(),
        )
    }

    #[test]
    fn test_from_parts_rejects_new_listings() {
        let mut records = catalog().records().to_vec();
        records.push(apartment(6, 220_000.0));
        let grown = Catalog::from_records(records);

        assert!(matches!(restore_with(&grown), Err(Error::ArtifactMismatch(_))));
    }

    #[test]
    fn test_from_parts_rejects_changed_listing() {
        let mut records = catalog().records().to_vec();
        records[0] = records[0].clone().with_smart_living_score(99.0);
        let changed = Catalog::from_records(records);

        assert!(matches!(restore_with(&changed), Err(Error::ArtifactMismatch(_))));
        assert!(restore_with(&catalog()).is_ok());
    }

    #[test]
    fn test_candidate_pool_caps_retrieval() {
        let prefs = Preferences::new()
            .with_property_type("Apartment")
            .with_amenities("gym, parking")
            .with_location("Austin");

        let wide = fitted();
        let ids: Vec<PropertyId> = wide
            .recommend_by_preferences(&prefs, 5, &wide.config().default_weights)
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![4]);

        // The Austin house passes the filter but is not among the two
        // nearest neighbors of an apartment query
        let config = RecommenderConfig::default()
            .with_candidate_pool(2)
            .with_weights(BlendWeights::new(1.0, 0.0, 0.0));
        let narrow = Recommender::fit(catalog(), config).unwrap();
        assert_eq!(narrow.config().candidate_pool, 2);
        assert!(narrow
            .recommend_by_preferences(&prefs, 5, &narrow.config().default_weights)
            .unwrap()
            .is_empty());
    }
}
