//! Explainable recommendation results
//!
//! Every ranked property carries the components its hybrid score was built
//! from, so callers can show why a listing ranked where it did.

use serde::{Deserialize, Serialize};
use smartliving_core::{PropertyId, PropertyRecord, SmartLabel};

/// Components of a hybrid score, each already computed over the candidate set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ScoreBreakdown {
    /// Raw cosine similarity to the query
    pub similarity: f64,
    pub similarity_norm: f64,
    pub smart_norm: f64,
    pub affordability: f64,
}

impl ScoreBreakdown {
    /// Name of the largest normalized component
    pub fn dominant_component(&self) -> &'static str {
        [
            ("similarity", self.similarity_norm),
            ("smart", self.smart_norm),
            ("affordability", self.affordability),
        ]
        .into_iter()
        .fold(("similarity", f64::NEG_INFINITY), |best, cur| if cur.1 > best.1 { cur } else { best })
        .0
    }
}

/// One recommended property with its score breakdown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedProperty {
    pub id: PropertyId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor_area: Option<f64>,
    pub num_rooms: i64,
    pub num_bathrooms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub smart_living_score: f64,
    pub smart_label: SmartLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_to_income_ratio: Option<f64>,
    pub amenities: String,
    pub hybrid_score: f64,
    pub explain: ScoreBreakdown,
}

impl RankedProperty {
    pub fn new(record: &PropertyRecord, hybrid_score: f64, explain: ScoreBreakdown) -> Self {
        Self {
            id: record.id,
            property_type: record.property_type.clone(),
            price: record.price,
            floor_area: record.floor_area_m2.or(record.floor_area),
            num_rooms: record.num_rooms,
            num_bathrooms: record.num_bathrooms,
            location: record.location.clone(),
            smart_living_score: record.smart_living_score,
            smart_label: record.smart_label,
            price_to_income_ratio: record.price_to_income_ratio,
            amenities: record.amenities.clone(),
            hybrid_score,
            explain,
        }
    }
}

/// Response body for a recommendation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub result: Vec<RankedProperty>,
    pub stats: RecommendationStats,
}

impl RecommendationResponse {
    pub fn new(result: Vec<RankedProperty>, candidates_count: usize) -> Self {
        let stats = RecommendationStats::compute(&result, candidates_count);
        Self { result, stats }
    }
}

/// Summary over one result list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RecommendationStats {
    /// Candidates that survived retrieval and filtering
    pub candidates_count: usize,
    pub results_count: usize,
    pub avg_score: f64,
    pub best_score: f64,
    /// Component that most often dominates a result's score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_component: Option<String>,
}

impl RecommendationStats {
    pub fn compute(results: &[RankedProperty], candidates_count: usize) -> Self {
        if results.is_empty() {
            return Self {
                candidates_count,
                ..Self::default()
            };
        }

        let total: f64 = results.iter().map(|r| r.hybrid_score).sum();
        let best_score = results
            .iter()
            .map(|r| r.hybrid_score)
            .fold(f64::NEG_INFINITY, f64::max);

        let mut counts = [("similarity", 0usize), ("smart", 0), ("affordability", 0)];
        for r in results {
            let dominant = r.explain.dominant_component();
            if let Some(entry) = counts.iter_mut().find(|(name, _)| *name == dominant) {
                entry.1 += 1;
            }
        }
        let top_component = counts
            .iter()
            .fold(None::<(&str, usize)>, |best, &(name, n)| match best {
                Some((_, m)) if m >= n => best,
                _ => Some((name, n)),
            })
            .map(|(name, _)| name.to_string());

        Self {
            candidates_count,
            results_count: results.len(),
            avg_score: total / results.len() as f64,
            best_score,
            top_component,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(id: PropertyId, score: f64, breakdown: ScoreBreakdown) -> RankedProperty {
        let record = PropertyRecord::new(id, 150_000.0, 1.0, 2.0)
            .with_property_type("Apartment")
            .with_smart_living_score(70.0);
        RankedProperty::new(&record, score, breakdown)
    }

    #[test]
    fn test_ranked_property_copies_record() {
        let r = ranked(5, 0.5, ScoreBreakdown::default());
        assert_eq!(r.id, 5);
        assert_eq!(r.property_type.as_deref(), Some("Apartment"));
        assert_eq!(r.smart_label, SmartLabel::Good);
    }

    #[test]
    fn test_response_serialization() {
        let response = RecommendationResponse::new(vec![ranked(1, 0.9, ScoreBreakdown::default())], 4);
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains("\"result\""));
        assert!(json.contains("\"hybrid_score\""));
        assert!(json.contains("\"explain\""));
        assert!(json.contains("\"candidates_count\":4"));
    }

    #[test]
    fn test_stats() {
        let smart_heavy = ScoreBreakdown {
            similarity: 0.2,
            similarity_norm: 0.1,
            smart_norm: 0.9,
            affordability: 0.3,
        };
        let sim_heavy = ScoreBreakdown {
            similarity: 0.9,
            similarity_norm: 1.0,
            smart_norm: 0.2,
            affordability: 0.1,
        };
        let results = vec![
            ranked(1, 0.8, smart_heavy),
            ranked(2, 0.6, smart_heavy),
            ranked(3, 0.4, sim_heavy),
        ];
        let stats = RecommendationStats::compute(&results, 10);

        assert_eq!(stats.candidates_count, 10);
        assert_eq!(stats.results_count, 3);
        assert!((stats.avg_score - 0.6).abs() < 1e-12);
        assert_eq!(stats.best_score, 0.8);
        assert_eq!(stats.top_component.as_deref(), Some("smart"));
    }

    #[test]
    fn test_empty_stats() {
        let stats = RecommendationStats::compute(&[], 3);
        assert_eq!(stats.candidates_count, 3);
        assert_eq!(stats.results_count, 0);
        assert_eq!(stats.avg_score, 0.0);
        assert!(stats.top_component.is_none());
    }
}
