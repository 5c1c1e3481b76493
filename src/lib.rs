//! # SmartLiving
//!
//! A hybrid content-based recommender for real-estate listings.
//!
//! Listings are encoded into sparse feature vectors, retrieved by exact
//! cosine similarity, then re-ranked by blending similarity with a
//! precomputed smart living score and an affordability metric.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! smartliving --catalog data/properties.csv fit
//! smartliving --catalog data/properties.csv recommend '{"max_budget": 400000, "amenities": ["gym"]}'
//! smartliving --catalog data/properties.csv similar --id 42
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use smartliving::prelude::*;
//!
//! let source = CsvSource::new("data/properties.csv");
//! let store = ArtifactStore::new("./models");
//! let service = smartliving::bootstrap(&source, &store, RecommenderConfig::default()).unwrap();
//!
//! let prefs = Preferences::new()
//!     .with_property_type("Apartment")
//!     .with_amenities("gym, parking")
//!     .with_max_budget(400_000.0);
//! let results = service
//!     .recommend_by_preferences(&prefs, 10, &BlendWeights::default())
//!     .unwrap();
//! ```
//!
//! ## Crate Structure
//!
//! - `smartliving-core`: catalog, sanitation, sparse vectors, neighbor index
//! - `smartliving-features`: encoders and the feature matrix builder
//! - `smartliving-ranking`: filters, hybrid blend, recommender service
//! - `smartliving-storage`: artifact persistence

use tracing::{info, warn};

// Re-export core types
pub use smartliving_core::{
    source_for_path, Catalog, CatalogSource, CsvSource, Error, JsonSource, MemorySource,
    NearestNeighbors, PropertyId, PropertyRecord, Result, SmartLabel, SparseMatrix, SparseVector,
};

// Re-export features
pub use smartliving_features::{FittedEncoders, NumericColumn, DEFAULT_NUMERIC_COLUMNS};

// Re-export ranking
pub use smartliving_ranking::{
    BlendWeights, Preferences, RankedProperty, RecommendationResponse, RecommendationStats,
    Recommender, RecommenderConfig, RecommenderService, ScoreBreakdown,
};

// Re-export storage
pub use smartliving_storage::{ArtifactManifest, ArtifactStore, Artifacts, CatalogMetadata};

/// Prelude module for convenient imports
pub mod prelude {
    pub use smartliving_core::{
        Catalog, CatalogSource, CsvSource, Error, JsonSource, MemorySource, PropertyId,
        PropertyRecord, Result,
    };
    pub use smartliving_ranking::{
        BlendWeights, Preferences, RankedProperty, Recommender, RecommenderConfig,
        RecommenderService,
    };
    pub use smartliving_storage::ArtifactStore;
}

/// Fit a recommender over `catalog` and persist its artifacts
pub fn fit_and_save(
    catalog: Catalog,
    store: &ArtifactStore,
    config: RecommenderConfig,
) -> Result<Recommender> {
    let recommender = Recommender::fit(catalog, config)?;
    let metadata = CatalogMetadata {
        index_to_id: recommender.index_to_id(),
        columns: recommender.catalog().columns().to_vec(),
    };
    store.save(recommender.encoders(), recommender.index(), &metadata)?;
    Ok(recommender)
}

/// Rebuild a recommender from saved artifacts and the current catalog
pub fn restore(
    catalog: &Catalog,
    store: &ArtifactStore,
    config: RecommenderConfig,
) -> Result<Recommender> {
    let artifacts = store.load()?;
    Recommender::from_parts(
        catalog,
        artifacts.encoders,
        artifacts.index,
        artifacts.manifest.index_to_id(),
        config,
    )
}

/// Startup initialization: load the catalog, then restore saved artifacts
/// when they exist and agree with it, otherwise fit and save.
pub fn bootstrap(
    source: &dyn CatalogSource,
    store: &ArtifactStore,
    config: RecommenderConfig,
) -> Result<RecommenderService> {
    let catalog = load_catalog(source)?;

    if store.exists() {
        match restore(&catalog, store, config) {
            Ok(recommender) => {
                info!("Using saved artifacts from {}", store.dir().display());
                return Ok(RecommenderService::with_recommender(recommender));
            }
            Err(e) => warn!("Saved artifacts unusable, refitting: {}", e),
        }
    } else {
        info!("No saved artifacts in {}; fitting", store.dir().display());
    }

    let recommender = fit_and_save(catalog, store, config)?;
    Ok(RecommenderService::with_recommender(recommender))
}

/// Refit from a fresh catalog, persist, and swap the new state into
/// `service`. On failure the service keeps its current state.
pub fn retrain(
    service: &RecommenderService,
    source: &dyn CatalogSource,
    store: &ArtifactStore,
    config: RecommenderConfig,
) -> Result<()> {
    let catalog = load_catalog(source)?;
    let recommender = fit_and_save(catalog, store, config)?;
    service.install(recommender);
    Ok(())
}

fn load_catalog(source: &dyn CatalogSource) -> Result<Catalog> {
    let catalog = Catalog::load(source)?;
    if catalog.is_empty() {
        return Err(Error::Config(format!(
            "catalog from {} has no usable properties",
            source.describe()
        )));
    }
    Ok(catalog)
}
