use thiserror::Error;

use crate::property::PropertyId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Recommender not fitted or loaded: call fit or load artifacts first")]
    NotFitted,

    #[error("Property not found: {0}")]
    PropertyNotFound(PropertyId),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Invalid blend weights: {0}")]
    InvalidWeights(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Artifact mismatch: {0}")]
    ArtifactMismatch(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Catalog(e.to_string())
    }
}
