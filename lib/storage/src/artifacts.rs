// Artifact persistence for a fitted recommender
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use smartliving_core::{Error, NearestNeighbors, PropertyId, Result};
use smartliving_features::FittedEncoders;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use atomicwrites::{AtomicFile, OverwriteBehavior};

pub const ENCODERS_FILE: &str = "recommender_encoders.bin";
pub const INDEX_FILE: &str = "recommender_index.bin";
pub const METADATA_FILE: &str = "recommender_metadata.json.gz";

/// Bumped whenever the on-disk layout of any artifact changes
pub const FORMAT_VERSION: u32 = 1;

/// Catalog facts the index depends on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CatalogMetadata {
    /// Property id of each index row
    pub index_to_id: Vec<PropertyId>,
    pub columns: Vec<String>,
}

/// Contents of the metadata artifact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactManifest {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    pub n_rows: usize,
    pub n_features: usize,
    pub encoders_sha256: String,
    pub index_sha256: String,
    #[serde(flatten)]
    pub catalog: CatalogMetadata,
}

impl ArtifactManifest {
    pub fn index_to_id(&self) -> &[PropertyId] {
        &self.catalog.index_to_id
    }
}

/// Everything restored by [`ArtifactStore::load`]
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub encoders: FittedEncoders,
    pub index: NearestNeighbors,
    pub manifest: ArtifactManifest,
}

/// Directory holding the three recommender artifacts
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn encoders_path(&self) -> PathBuf {
        self.dir.join(ENCODERS_FILE)
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    /// True when all three artifacts are present
    pub fn exists(&self) -> bool {
        self.encoders_path().is_file() && self.index_path().is_file() && self.metadata_path().is_file()
    }

    /// Persist a fitted state. The metadata file is written last, so a
    /// crash mid-save leaves checksums that reject the partial set.
    pub fn save(
        &self,
        encoders: &FittedEncoders,
        index: &NearestNeighbors,
        metadata: &CatalogMetadata,
    ) -> Result<ArtifactManifest> {
        check_consistency(encoders, index, &metadata.index_to_id)?;
        fs::create_dir_all(&self.dir)?;

        let encoders_bytes = bincode::serialize(encoders)
            .map_err(|e| Error::Serialization(format!("encoders: {}", e)))?;
        let index_bytes = bincode::serialize(index)
            .map_err(|e| Error::Serialization(format!("index: {}", e)))?;

        let manifest = ArtifactManifest {
            format_version: FORMAT_VERSION,
            created_at: Utc::now(),
            n_rows: index.len(),
            n_features: index.dim(),
            encoders_sha256: checksum(&encoders_bytes),
            index_sha256: checksum(&index_bytes),
            catalog: metadata.clone(),
        };

        let json = serde_json::to_vec(&manifest)?;
        let mut gz = GzEncoder::new(Vec::new(), Compression::default());
        gz.write_all(&json)?;
        let metadata_bytes = gz.finish()?;

        write_atomic(&self.encoders_path(), &encoders_bytes)?;
        write_atomic(&self.index_path(), &index_bytes)?;
        write_atomic(&self.metadata_path(), &metadata_bytes)?;

        info!(
            "Saved recommender artifacts to {} ({} rows, {} features)",
            self.dir.display(),
            manifest.n_rows,
            manifest.n_features
        );
        Ok(manifest)
    }

    /// Restore a saved state, verifying checksums and shapes. Loading is
    /// read-only and may be repeated.
    pub fn load(&self) -> Result<Artifacts> {
        let manifest = self.load_manifest()?;

        let encoders_bytes = read_artifact(&self.encoders_path())?;
        verify(ENCODERS_FILE, &encoders_bytes, &manifest.encoders_sha256)?;
        let encoders: FittedEncoders = decode(ENCODERS_FILE, &encoders_bytes)?;

        let index_bytes = read_artifact(&self.index_path())?;
        verify(INDEX_FILE, &index_bytes, &manifest.index_sha256)?;
        let index: NearestNeighbors = decode(INDEX_FILE, &index_bytes)?;

        check_consistency(&encoders, &index, manifest.index_to_id())?;
        if index.dim() != manifest.n_features {
            return Err(Error::ArtifactMismatch(format!(
                "manifest records {} features, index holds {}",
                manifest.n_features,
                index.dim()
            )));
        }

        info!(
            "Loaded recommender artifacts from {} (created {}, {} rows)",
            self.dir.display(),
            manifest.created_at.format("%Y-%m-%dT%H:%M:%SZ"),
            index.len()
        );
        Ok(Artifacts {
            encoders,
            index,
            manifest,
        })
    }

    /// Read only the encoders, without checksum or shape checks
    pub fn load_encoders(&self) -> Result<FittedEncoders> {
        decode(ENCODERS_FILE, &read_artifact(&self.encoders_path())?)
    }

    /// Read only the neighbor index, without checksum or shape checks
    pub fn load_index(&self) -> Result<NearestNeighbors> {
        decode(INDEX_FILE, &read_artifact(&self.index_path())?)
    }

    /// Read only the manifest
    pub fn load_manifest(&self) -> Result<ArtifactManifest> {
        let compressed = read_artifact(&self.metadata_path())?;
        let mut json = Vec::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_end(&mut json)
            .map_err(|e| Error::Persistence(format!("{}: {}", METADATA_FILE, e)))?;
        let manifest: ArtifactManifest = serde_json::from_slice(&json)?;

        if manifest.format_version != FORMAT_VERSION {
            return Err(Error::ArtifactMismatch(format!(
                "artifact format version {} is not supported (expected {})",
                manifest.format_version, FORMAT_VERSION
            )));
        }
        Ok(manifest)
    }
}

fn check_consistency(
    encoders: &FittedEncoders,
    index: &NearestNeighbors,
    index_to_id: &[PropertyId],
) -> Result<()> {
    if index.len() != index_to_id.len() {
        return Err(Error::ArtifactMismatch(format!(
            "index has {} rows but index_to_id has {} entries",
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
    Ok(())
}

fn checksum(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn verify(name: &str, bytes: &[u8], expected: &str) -> Result<()> {
    let actual = checksum(bytes);
    if actual != expected {
        warn!("Checksum mismatch on {}", name);
        return Err(Error::ArtifactMismatch(format!(
            "{} checksum mismatch: expected {}, got {}",
            name, expected, actual
        )));
    }
    Ok(())
}

fn decode<T: DeserializeOwned>(name: &str, bytes: &[u8]) -> Result<T> {
    bincode::deserialize(bytes).map_err(|e| Error::Serialization(format!("{}: {}", name, e)))
}

fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::Persistence(format!("reading {}: {}", path.display(), e)))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| f.write_all(bytes))
        .map_err(|e| Error::Persistence(format!("writing {}: {}", path.display(), e)))
}
