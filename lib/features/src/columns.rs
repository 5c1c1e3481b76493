//! Numeric feature columns
//!
//! The ordered column list is part of the fitted state and travels with the
//! saved encoders, so a reload can never scale values in a different order
//! than the one the index was built with.

use serde::{Deserialize, Serialize};
use smartliving_core::PropertyRecord;

/// A numeric column that takes part in the similarity vector
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NumericColumn {
    FloorAreaM2,
    NumRooms,
    NumBathrooms,
    PricePerM2,
    PriceToIncomeRatio,
    SmartLivingScore,
    TransportNorm,
    AffordabilityScore,
}

/// Scaled numeric block, in vector order
pub const DEFAULT_NUMERIC_COLUMNS: [NumericColumn; 8] = [
    NumericColumn::FloorAreaM2,
    NumericColumn::NumRooms,
    NumericColumn::NumBathrooms,
    NumericColumn::PricePerM2,
    NumericColumn::PriceToIncomeRatio,
    NumericColumn::SmartLivingScore,
    NumericColumn::TransportNorm,
    NumericColumn::AffordabilityScore,
];

impl NumericColumn {
    /// Catalog column name
    pub fn name(&self) -> &'static str {
        match self {
            NumericColumn::FloorAreaM2 => "floor_area_m2",
            NumericColumn::NumRooms => "num_rooms",
            NumericColumn::NumBathrooms => "num_bathrooms",
            NumericColumn::PricePerM2 => "price_per_m2",
            NumericColumn::PriceToIncomeRatio => "price_to_income_ratio",
            NumericColumn::SmartLivingScore => "smart_living_score",
            NumericColumn::TransportNorm => "transport_norm",
            NumericColumn::AffordabilityScore => "affordability_score",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        DEFAULT_NUMERIC_COLUMNS
            .iter()
            .copied()
            .find(|c| c.name() == name.trim().to_lowercase())
    }
}

impl std::fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Anything that can supply values for the numeric block
pub trait NumericSource {
    /// Value for `column`, `None` when missing
    fn numeric(&self, column: NumericColumn) -> Option<f64>;
}

impl NumericSource for PropertyRecord {
    fn numeric(&self, column: NumericColumn) -> Option<f64> {
        match column {
            NumericColumn::FloorAreaM2 => self.floor_area_m2,
            NumericColumn::NumRooms => Some(self.num_rooms as f64),
            NumericColumn::NumBathrooms => Some(self.num_bathrooms as f64),
            NumericColumn::PricePerM2 => self.price_per_m2,
            NumericColumn::PriceToIncomeRatio => self.price_to_income_ratio,
            NumericColumn::SmartLivingScore => Some(self.smart_living_score),
            NumericColumn::TransportNorm => self.transport_norm,
            NumericColumn::AffordabilityScore => self.affordability_score,
        }
    }
}

/// Values in column order with missing or non-finite entries imputed as 0.0
pub fn numeric_values(source: &dyn NumericSource, columns: &[NumericColumn]) -> Vec<f64> {
    columns
        .iter()
        .map(|c| source.numeric(*c).filter(|v| v.is_finite()).unwrap_or(0.0))
        .collect()
}
