//! # SmartLiving Ranking
//!
//! Hybrid recommendation engine over an encoded property catalog.
//!
//! ## Overview
//!
//! Retrieval by cosine similarity finds listings that look like the query.
//! The ranker then applies the user's hard filters and blends three signals
//! into one score:
//!
//! - **Similarity**: closeness to the query vector
//! - **Smart living score**: precomputed desirability of the listing
//! - **Affordability**: price-to-income ratio against the candidate median
//!
//! ## Example
//!
//! ```rust
//! use smartliving_core::{Catalog, PropertyRecord};
//! use smartliving_ranking::{BlendWeights, Preferences, Recommender, RecommenderConfig};
//!
//! let catalog = Catalog::from_records(vec![
//!     PropertyRecord::new(1, 100_000.0, 29.7, -95.3).with_property_type("Apartment"),
//!     PropertyRecord::new(2, 500_000.0, 29.7, -95.3).with_property_type("Apartment"),
//! ]);
//! let recommender = Recommender::fit(catalog, RecommenderConfig::default()).unwrap();
//!
//! let prefs = Preferences::new().with_max_budget(400_000.0);
//! let results = recommender
//!     .recommend_by_preferences(&prefs, 5, &BlendWeights::default())
//!     .unwrap();
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].id, 1);
//! ```
//!
//! ## Request Flow
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Preferences │────>│  Encoders   │────>│  Neighbors  │────>│   Filters   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//!                                                             ┌──────┴──────┐
//!                                                             │    Blend    │
//!                                                             │  and rank   │
//!                                                             └─────────────┘
//! ```

pub mod blend;
pub mod config;
pub mod explain;
pub mod filter;
pub mod preferences;
pub mod recommender;
pub mod service;

pub use blend::{affordability, min_max_normalize, rank, BlendWeights, Candidate};
pub use config::{RecommenderConfig, DEFAULT_CANDIDATE_POOL, DEFAULT_TOP_N};
pub use explain::{RankedProperty, RecommendationResponse, RecommendationStats, ScoreBreakdown};
pub use filter::{Filter, FilterCondition, PreferenceFilter};
pub use preferences::Preferences;
pub use recommender::Recommender;
pub use service::RecommenderService;
