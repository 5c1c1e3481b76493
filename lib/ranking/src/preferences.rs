//! User preference queries
//!
//! A preference carries two kinds of fields: similarity targets that are
//! encoded into the query vector, and hard filters that only prune
//! retrieved candidates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smartliving_core::catalog::coerce_number;
use smartliving_core::{Error, Result};
use smartliving_features::{amenities_from_value, NumericColumn, NumericSource};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Preferences {
    pub property_type: Option<String>,
    /// Raw amenities text, normalized at encode time
    pub amenities: String,

    // Hard filters
    pub location: Option<String>,
    pub max_budget: Option<f64>,
    pub min_rooms: Option<f64>,
    pub min_smart_score: Option<f64>,

    // Numeric similarity targets
    pub floor_area_m2: Option<f64>,
    pub num_rooms: Option<f64>,
    pub num_bathrooms: Option<f64>,
    pub price_per_m2: Option<f64>,
    pub price_to_income_ratio: Option<f64>,
    pub transport_norm: Option<f64>,
    pub affordability_score: Option<f64>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lenient parse of an untyped JSON object. Unknown keys are ignored,
    /// numbers may be numeric strings and empty strings count as absent.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(Error::Serialization(format!(
                "preferences must be a JSON object, got {}",
                kind(other)
            ))),
        }
    }

    pub fn from_map(map: &Map<String, Value>) -> Self {
        let mut prefs = Self::default();
        for (key, value) in map {
            let key = key.trim().to_lowercase();
            match key.as_str() {
                "property_type" => prefs.property_type = text(value),
                "amenities" => prefs.amenities = amenities_from_value(value),
                "location" => prefs.location = text(value),
                "max_budget" => prefs.max_budget = number(value),
                "min_rooms" => prefs.min_rooms = number(value),
                "min_smart_score" => prefs.min_smart_score = number(value),
                "floor_area_m2" => prefs.floor_area_m2 = number(value),
                "num_rooms" => prefs.num_rooms = number(value),
                "num_bathrooms" => prefs.num_bathrooms = number(value),
                "price_per_m2" => prefs.price_per_m2 = number(value),
                "price_to_income_ratio" => prefs.price_to_income_ratio = number(value),
                "transport_norm" => prefs.transport_norm = number(value),
                "affordability_score" => prefs.affordability_score = number(value),
                _ => debug!("Ignoring unknown preference key '{}'", key),
            }
        }
        prefs
    }

    #[must_use]
    pub fn with_property_type(mut self, property_type: impl Into<String>) -> Self {
        self.property_type = Some(property_type.into());
        self
    }

    #[must_use]
    pub fn with_amenities(mut self, amenities: impl Into<String>) -> Self {
        self.amenities = amenities.into();
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn with_max_budget(mut self, budget: f64) -> Self {
        self.max_budget = Some(budget);
        self
    }

    #[must_use]
    pub fn with_min_rooms(mut self, rooms: f64) -> Self {
        self.min_rooms = Some(rooms);
        self
    }

    #[must_use]
    pub fn with_min_smart_score(mut self, score: f64) -> Self {
        self.min_smart_score = Some(score);
        self
    }

    #[must_use]
    pub fn with_target(mut self, column: NumericColumn, value: f64) -> Self {
        match column {
            NumericColumn::FloorAreaM2 => self.floor_area_m2 = Some(value),
            NumericColumn::NumRooms => self.num_rooms = Some(value),
            NumericColumn::NumBathrooms => self.num_bathrooms = Some(value),
            NumericColumn::PricePerM2 => self.price_per_m2 = Some(value),
            NumericColumn::PriceToIncomeRatio => self.price_to_income_ratio = Some(value),
            NumericColumn::SmartLivingScore => self.min_smart_score = Some(value),
            NumericColumn::TransportNorm => self.transport_norm = Some(value),
            NumericColumn::AffordabilityScore => self.affordability_score = Some(value),
        }
        self
    }

    /// Location filter, ignoring blank values
    pub fn location_filter(&self) -> Option<&str> {
        self.location.as_deref().map(str::trim).filter(|l| !l.is_empty())
    }
}

impl NumericSource for Preferences {
    fn numeric(&self, column: NumericColumn) -> Option<f64> {
        match column {
            NumericColumn::FloorAreaM2 => self.floor_area_m2,
            // A non-zero room minimum stands in for the room target
            NumericColumn::NumRooms => self.min_rooms.filter(|r| *r != 0.0).or(self.num_rooms),
            NumericColumn::NumBathrooms => self.num_bathrooms,
            NumericColumn::PricePerM2 => self.price_per_m2,
            NumericColumn::PriceToIncomeRatio => self.price_to_income_ratio,
            NumericColumn::SmartLivingScore => self.min_smart_score,
            NumericColumn::TransportNorm => self.transport_norm,
            NumericColumn::AffordabilityScore => self.affordability_score,
        }
    }
}

fn number(value: &Value) -> Option<f64> {
    let n = coerce_number(value);
    if n.is_none() && !value.is_null() && value.as_str().map_or(true, |s| !s.trim().is_empty()) {
        debug!("Ignoring non-numeric preference value {}", value);
    }
    n
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
