//! Artifact storage for fitted recommenders.
//!
//! Three files live in one directory:
//!
//! - `recommender_encoders.bin`: bincode [`FittedEncoders`](smartliving_features::FittedEncoders)
//! - `recommender_index.bin`: bincode [`NearestNeighbors`](smartliving_core::NearestNeighbors)
//! - `recommender_metadata.json.gz`: gzip JSON manifest with the row-to-id
//!   map, catalog columns, format version and checksums of the other two
//!
//! Every file is replaced atomically. [`ArtifactStore::load`] reads all three
//! and checks them against each other; `load_encoders`, `load_index` and
//! `load_manifest` read one file each.

pub mod artifacts;

pub use artifacts::{
    ArtifactManifest, ArtifactStore, Artifacts, CatalogMetadata, ENCODERS_FILE, FORMAT_VERSION,
    INDEX_FILE, METADATA_FILE,
};
