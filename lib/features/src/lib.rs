//! # SmartLiving Features
//!
//! Feature encoding for property records.
//!
//! Turns each listing into one sparse vector made of three fixed blocks, and
//! turns user preferences into a vector of the same shape so the two can be
//! compared by cosine similarity.
//!
//! ## Features
//!
//! - **Categorical one-hot**: property type over a sorted vocabulary
//! - **Amenity bag-of-words**: token counts over the vocabulary seen at fit
//! - **Standard scaling**: numeric columns in a fixed, persisted order
//! - **Single code path**: catalog rows and queries share every
//!   normalization and encoding step
//!
//! ## Example
//!
//! ```rust
//! use smartliving_core::{Catalog, PropertyRecord};
//! use smartliving_features::FittedEncoders;
//!
//! let catalog = Catalog::from_records(vec![
//!     PropertyRecord::new(1, 250_000.0, 29.76, -95.36)
//!         .with_property_type("Apartment")
//!         .with_amenities("['Gym', 'Parking']"),
//!     PropertyRecord::new(2, 410_000.0, 29.74, -95.40)
//!         .with_property_type("House")
//!         .with_amenities("Pool"),
//! ]);
//!
//! let (encoders, matrix) = FittedEncoders::fit(&catalog).unwrap();
//! assert_eq!(matrix.n_rows(), 2);
//! assert_eq!(matrix.n_cols(), encoders.dim());
//! ```
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────┬──────────────────┬──────────────────┐
//! │ one-hot type │ amenity counts   │ scaled numerics  │
//! │ (categories) │ (vocabulary)     │ (8 columns)      │
//! └──────────────┴──────────────────┴──────────────────┘
//! ```

pub mod amenities;
pub mod builder;
pub mod columns;
pub mod encoders;

pub use amenities::{amenities_from_value, amenity_tokens, normalize_amenities};
pub use builder::{BlockLayout, FittedEncoders};
pub use columns::{numeric_values, NumericColumn, NumericSource, DEFAULT_NUMERIC_COLUMNS};
pub use encoders::{AmenityVectorizer, CategoryEncoder, StandardScaler, UNKNOWN_CATEGORY};
