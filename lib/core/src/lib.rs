//! # SmartLiving Core
//!
//! Core library for the SmartLiving recommender.
//!
//! This crate provides the fundamental data structures and algorithms:
//!
//! - [`PropertyRecord`] - A sanitized listing with its precomputed scores
//! - [`Catalog`] - Id-indexed property table built from untyped rows
//! - [`CatalogSource`] - Where raw rows come from (CSV, JSON, memory)
//! - [`SparseVector`] / [`SparseMatrix`] - Sparse feature storage
//! - [`NearestNeighbors`] - Exact cosine nearest-neighbor index
//!
//! ## Example
//!
//! ```rust
//! use smartliving_core::{NearestNeighbors, SparseMatrix, SparseVector};
//!
//! let rows = vec![
//!     SparseVector::from_dense(&[1.0, 0.0, 0.0]),
//!     SparseVector::from_dense(&[0.0, 1.0, 0.0]),
//! ];
//! let index = NearestNeighbors::fit(SparseMatrix::from_rows(3, rows).unwrap()).unwrap();
//!
//! let query = SparseVector::from_dense(&[1.0, 0.1, 0.0]);
//! let neighbors = index.kneighbors(&query, 10).unwrap();
//! assert_eq!(neighbors.positions[0], 0);
//! ```

pub mod catalog;
pub mod error;
pub mod matrix;
pub mod neighbors;
pub mod property;
pub mod source;
pub mod vector;

pub use catalog::{Catalog, EXPECTED_COLUMNS};
pub use error::{Error, Result};
pub use matrix::SparseMatrix;
pub use neighbors::{NearestNeighbors, Neighbors};
pub use property::{PropertyId, PropertyRecord, SmartLabel};
pub use source::{source_for_path, CatalogSource, CsvSource, JsonSource, MemorySource, RawRow};
pub use vector::SparseVector;
