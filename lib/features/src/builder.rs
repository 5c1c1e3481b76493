//! Feature matrix builder
//!
//! Converts catalog rows and preference queries into feature vectors based
//! on the fitted encoders.

use crate::amenities::normalize_amenities;
use crate::columns::{numeric_values, NumericColumn, NumericSource, DEFAULT_NUMERIC_COLUMNS};
use crate::encoders::{AmenityVectorizer, CategoryEncoder, StandardScaler, UNKNOWN_CATEGORY};
use serde::{Deserialize, Serialize};
use smartliving_core::{Catalog, Error, PropertyRecord, Result, SparseMatrix, SparseVector};
use tracing::info;

/// The complete fitted encoder state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FittedEncoders {
    pub property_type: CategoryEncoder,
    pub amenities: AmenityVectorizer,
    pub scaler: StandardScaler,
    /// Order of the scaled numeric block
    pub numeric_columns: Vec<NumericColumn>,
}

/// Widths of the three blocks of a feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    pub property_type: usize,
    pub amenities: usize,
    pub numeric: usize,
}

impl BlockLayout {
    pub fn total(&self) -> usize {
        self.property_type + self.amenities + self.numeric
    }

    /// Column offset where the amenity block starts
    pub fn amenities_offset(&self) -> usize {
        self.property_type
    }

    /// Column offset where the numeric block starts
    pub fn numeric_offset(&self) -> usize {
        self.property_type + self.amenities
    }
}

impl FittedEncoders {
    /// Fit on the full catalog with the default numeric columns and build
    /// the catalog feature matrix
    pub fn fit(catalog: &Catalog) -> Result<(Self, SparseMatrix)> {
        Self::fit_with_columns(catalog, &DEFAULT_NUMERIC_COLUMNS)
    }

    pub fn fit_with_columns(
        catalog: &Catalog,
        columns: &[NumericColumn],
    ) -> Result<(Self, SparseMatrix)> {
        if catalog.is_empty() {
            return Err(Error::Config("catalog is empty after sanitation".into()));
        }
        let n = catalog.len();

        let property_type =
            CategoryEncoder::fit(catalog.records().iter().map(property_type_of));
        info!("Property type one-hot shape: ({}, {})", n, property_type.len());

        let amenity_texts: Vec<String> = catalog
            .records()
            .iter()
            .map(|r| normalize_amenities(&r.amenities))
            .collect();
        let amenities = AmenityVectorizer::fit(amenity_texts.iter().map(String::as_str));
        info!("Amenities vectorized shape: ({}, {})", n, amenities.len());

        let numeric_rows: Vec<Vec<f64>> = catalog
            .records()
            .iter()
            .map(|r| numeric_values(r, columns))
            .collect();
        let scaler = StandardScaler::fit(&numeric_rows)?;
        info!("Numeric features shape: ({}, {})", n, scaler.n_features());

        let encoders = Self {
            property_type,
            amenities,
            scaler,
            numeric_columns: columns.to_vec(),
        };
        let matrix = encoders.transform_catalog(catalog)?;
        info!("Combined feature matrix shape: {:?}", matrix.shape());

        Ok((encoders, matrix))
    }

    pub fn layout(&self) -> BlockLayout {
        BlockLayout {
            property_type: self.property_type.len(),
            amenities: self.amenities.len(),
            numeric: self.numeric_columns.len(),
        }
    }

    /// Total feature width
    pub fn dim(&self) -> usize {
        self.layout().total()
    }

    /// Encode one row: `[one-hot type | amenity counts | scaled numerics]`.
    ///
    /// Catalog rows and preference queries both come through here.
    pub fn encode(
        &self,
        property_type: Option<&str>,
        amenities: &str,
        numeric: &dyn NumericSource,
    ) -> Result<SparseVector> {
        let type_block = self
            .property_type
            .transform(property_type.unwrap_or(UNKNOWN_CATEGORY));
        let amenity_block = self.amenities.transform(&normalize_amenities(amenities));
        let scaled = self
            .scaler
            .transform(&numeric_values(numeric, &self.numeric_columns))?;
        let numeric_block = SparseVector::from_dense(&scaled);

        Ok(SparseVector::hstack(&[&type_block, &amenity_block, &numeric_block]))
    }

    pub fn encode_record(&self, record: &PropertyRecord) -> Result<SparseVector> {
        self.encode(Some(property_type_of(record)), &record.amenities, record)
    }

    /// Feature matrix for a whole catalog, one row per record in catalog order
    pub fn transform_catalog(&self, catalog: &Catalog) -> Result<SparseMatrix> {
        let rows = catalog
            .records()
            .iter()
            .map(|r| self.encode_record(r))
            .collect::<Result<Vec<_>>>()?;
        SparseMatrix::from_rows(self.dim(), rows)
    }
}

fn property_type_of(record: &PropertyRecord) -> &str {
    record.property_type.as_deref().unwrap_or(UNKNOWN_CATEGORY)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Targets(Vec<(NumericColumn, f64)>);

    impl NumericSource for Targets {
        fn numeric(&self, column: NumericColumn) -> Option<f64> {
            self.0.iter().find(|(c, _)| *c == column).map(|(_, v)| *v)
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_records(vec![
            PropertyRecord::new(1, 100_000.0, 0.0, 0.0)
                .with_property_type("Apartment")
                .with_amenities("['Gym', 'Parking']")
                .with_rooms(2, 1)
                .with_smart_living_score(60.0),
            PropertyRecord::new(2, 200_000.0, 0.0, 0.0)
                .with_property_type("House")
                .with_amenities("Pool, Gym")
                .with_rooms(4, 2)
                .with_smart_living_score(80.0),
            PropertyRecord::new(3, 300_000.0, 0.0, 0.0)
                .with_rooms(3, 2)
                .with_smart_living_score(70.0),
        ])
    }

    #[test]
    fn test_fit_layout() {
        let (encoders, matrix) = FittedEncoders::fit(&catalog()).unwrap();
        let layout = encoders.layout();

        assert_eq!(encoders.property_type.categories(), &["Apartment", "House", "unknown"]);
        assert_eq!(encoders.amenities.vocabulary(), &["gym", "parking", "pool"]);
        assert_eq!(layout.total(), 3 + 3 + 8);
        assert_eq!(matrix.shape(), (3, 14));
    }

    #[test]
    fn test_record_row_matches_query_encoding() {
        let catalog = catalog();
        let (encoders, matrix) = FittedEncoders::fit(&catalog).unwrap();
        let record = catalog.get(2).unwrap();

        let targets = Targets(
            encoders
                .numeric_columns
                .iter()
                .map(|c| (*c, record.numeric(*c).unwrap_or(0.0)))
                .collect(),
        );
        let query = encoders
            .encode(Some("House"), "[\"pool\", \"gym\"]", &targets)
            .unwrap();

        assert_eq!(&query, matrix.row(1).unwrap());
    }

    #[test]
    fn test_unseen_values_leave_blocks_empty() {
        let (encoders, _) = FittedEncoders::fit(&catalog()).unwrap();
        let layout = encoders.layout();
        let v = encoders.encode(Some("Castle"), "sauna", &Targets(vec![])).unwrap();

        assert!(layout.amenities_offset() < layout.numeric_offset());
        assert!(v.indices().iter().all(|&i| i as usize >= layout.numeric_offset()));

        let known = encoders.encode(Some("Castle"), "gym", &Targets(vec![])).unwrap();
        let amenities = layout.amenities_offset()..layout.numeric_offset();
        assert!(known.indices().iter().any(|&i| amenities.contains(&(i as usize))));
        assert!(known.indices().iter().all(|&i| i as usize >= layout.amenities_offset()));
    }

    #[test]
    fn test_numeric_block_is_standardized() {
        let (encoders, matrix) = FittedEncoders::fit(&catalog()).unwrap();
        let offset = encoders.layout().numeric_offset();
        let rooms = 1 + offset;

        let column: Vec<f64> = matrix.rows().iter().map(|r| r.get(rooms)).collect();
        let mean: f64 = column.iter().sum::<f64>() / 3.0;
        assert!(mean.abs() < 1e-12);
    }

    #[test]
    fn test_empty_catalog_is_config_error() {
        let err = FittedEncoders::fit(&Catalog::from_records(vec![])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
