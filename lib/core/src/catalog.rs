//! Catalog sanitation
//!
//! Turns untyped source rows into [`PropertyRecord`]s. The source is never
//! trusted: column names are normalized, values are coerced, missing
//! optional fields are defaulted, and rows without an identifier, price or
//! coordinates are dropped.

use crate::property::{PropertyId, PropertyRecord, SmartLabel};
use crate::source::{CatalogSource, RawRow};
use crate::{Error, Result};
use ahash::AHashMap;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Canonical catalog columns
pub const EXPECTED_COLUMNS: &[&str] = &[
    "no", "property_type", "floor_area", "property_condition", "amenities",
    "furnishing_status", "air_conditioning_text", "heating_text", "num_rooms",
    "num_bathrooms", "price", "latitude", "longitude", "location",
    "dist_hospital", "dist_school", "dist_bus", "crime_rate",
    "air_conditioning", "heating", "has_gym", "has_parking", "has_pool",
    "price_per_m2", "district_fips_id", "income", "population",
    "avg_delay", "avg_severity", "avg_duration", "price_to_income_ratio",
    "transport_score", "floor_area_m2", "hqs_score", "_hqs_pass_boolean",
    "transport_norm", "affordability_score", "smart_living_score", "smart_label",
];

/// Square feet per square meter
pub const SQFT_PER_M2: f64 = 10.7639;

/// A floor-area median above this is taken to mean the column is in sqft
const SQFT_MEDIAN_THRESHOLD: f64 = 1000.0;

/// Sanitized, id-indexed property table
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<PropertyRecord>,
    columns: Vec<String>,
    positions: AHashMap<PropertyId, usize>,
}

impl Catalog {
    /// Fetch from a source and sanitize
    pub fn load(source: &dyn CatalogSource) -> Result<Self> {
        let rows = source.fetch()?;
        let catalog = Self::from_rows(rows);
        info!("Catalog from {}: {} properties", source.describe(), catalog.len());
        Ok(catalog)
    }

    /// Sanitize raw rows
    pub fn from_rows(rows: Vec<RawRow>) -> Self {
        let total = rows.len();
        let rows: Vec<RawRow> = rows.into_iter().map(normalize_columns).collect();

        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        let has_area_m2 = columns.iter().any(|c| c == "floor_area_m2");
        for expected in EXPECTED_COLUMNS {
            if !columns.iter().any(|c| c == expected) {
                columns.push((*expected).to_string());
            }
        }

        let mut records: Vec<PropertyRecord> = rows.iter().filter_map(sanitize_row).collect();
        let dropped = total - records.len();
        if dropped > 0 {
            warn!("Dropped {} rows lacking id, price or coordinates", dropped);
        }

        if !has_area_m2 {
            derive_floor_area_m2(&mut records);
        }

        let mut catalog = Self::from_records(records);
        catalog.columns = columns;
        catalog
    }

    /// Build from typed records. Later duplicates of an id are dropped.
    pub fn from_records(records: Vec<PropertyRecord>) -> Self {
        let mut positions = AHashMap::with_capacity(records.len());
        let mut kept = Vec::with_capacity(records.len());
        for record in records {
            if positions.contains_key(&record.id) {
                warn!("Duplicate property id {}; keeping the first occurrence", record.id);
                continue;
            }
            positions.insert(record.id, kept.len());
            kept.push(record);
        }

        Self {
            records: kept,
            columns: EXPECTED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            positions,
        }
    }

    /// Reorder to match a saved id order. Every id must be present; records
    /// missing from `ids` are left out.
    pub fn aligned_to(&self, ids: &[PropertyId]) -> Result<Self> {
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            let pos = self.position(*id).ok_or_else(|| {
                Error::ArtifactMismatch(format!("saved property id {} is not in the catalog", id))
            })?;
            records.push(self.records[pos].clone());
        }
        if records.len() < self.records.len() {
            warn!(
                "{} catalog properties are not in the saved index and will not be recommended",
                self.records.len() - records.len()
            );
        }

        let mut aligned = Self::from_records(records);
        aligned.columns = self.columns.clone();
        Ok(aligned)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn records(&self) -> &[PropertyRecord] {
        &self.records
    }

    /// Column names of the source table, canonical columns included
    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[inline]
    pub fn position(&self, id: PropertyId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn get(&self, id: PropertyId) -> Option<&PropertyRecord> {
        self.position(id).map(|pos| &self.records[pos])
    }

    #[inline]
    pub fn record_at(&self, position: usize) -> Option<&PropertyRecord> {
        self.records.get(position)
    }

    /// Ids in row order
    pub fn ids(&self) -> Vec<PropertyId> {
        self.records.iter().map(|r| r.id).collect()
    }
}

fn normalize_columns(row: RawRow) -> RawRow {
    row.into_iter()
        .map(|(k, v)| (k.trim().to_lowercase(), v))
        .collect()
}

fn sanitize_row(row: &RawRow) -> Option<PropertyRecord> {
    let id = identifier(row)?;
    let price = number(row, "price")?;
    let latitude = number(row, "latitude")?;
    let longitude = number(row, "longitude")?;

    let smart_living_score = number(row, "smart_living_score").unwrap_or(0.0);
    let smart_label = text(row, "smart_label")
        .and_then(|s| SmartLabel::parse(&s))
        .unwrap_or_else(|| SmartLabel::from_score(smart_living_score));

    Some(PropertyRecord {
        id,
        property_type: text(row, "property_type"),
        floor_area: number(row, "floor_area"),
        floor_area_m2: number(row, "floor_area_m2"),
        condition: text(row, "property_condition"),
        amenities: text(row, "amenities").unwrap_or_default(),
        furnishing_status: text(row, "furnishing_status"),
        num_rooms: integer(row, "num_rooms"),
        num_bathrooms: integer(row, "num_bathrooms"),
        price,
        latitude,
        longitude,
        location: text(row, "location"),
        dist_hospital: number(row, "dist_hospital"),
        dist_school: number(row, "dist_school"),
        dist_bus: number(row, "dist_bus"),
        crime_rate: number(row, "crime_rate"),
        air_conditioning: boolean(row, "air_conditioning"),
        heating: boolean(row, "heating"),
        has_gym: boolean(row, "has_gym"),
        has_parking: boolean(row, "has_parking"),
        has_pool: boolean(row, "has_pool"),
        price_per_m2: number(row, "price_per_m2"),
        income: number(row, "income"),
        price_to_income_ratio: number(row, "price_to_income_ratio"),
        transport_score: number(row, "transport_score"),
        transport_norm: number(row, "transport_norm"),
        affordability_score: number(row, "affordability_score"),
        hqs_score: number(row, "hqs_score"),
        smart_living_score,
        smart_label,
    })
}

/// `no`, falling back to `id`; must be a finite whole number
fn identifier(row: &RawRow) -> Option<PropertyId> {
    let raw = number(row, "no").or_else(|| number(row, "id"))?;
    if raw.fract() != 0.0 || raw.abs() > i64::MAX as f64 {
        debug!("Rejecting non-integral property id {}", raw);
        return None;
    }
    Some(raw as PropertyId)
}

/// Coerce a cell to a finite number. Strings are parsed, booleans count as
/// 1/0, anything else is missing.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Truthy spellings: yes/true/1/y/t. Everything else is false.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "yes" | "true" | "1" | "y" | "t" | "1.0"
        ),
        _ => false,
    }
}

fn number(row: &RawRow, key: &str) -> Option<f64> {
    row.get(key).and_then(coerce_number)
}

fn integer(row: &RawRow, key: &str) -> i64 {
    number(row, key).map(|n| n.trunc() as i64).unwrap_or(0)
}

fn boolean(row: &RawRow, key: &str) -> bool {
    row.get(key).map(coerce_bool).unwrap_or(false)
}

fn text(row: &RawRow, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => Some(Value::Array(items.clone()).to_string()),
        _ => None,
    }
}

/// Fill `floor_area_m2` from `floor_area`, converting from sqft when the
/// catalog median looks like sqft
fn derive_floor_area_m2(records: &mut [PropertyRecord]) {
    let mut areas: Vec<f64> = records.iter().filter_map(|r| r.floor_area).collect();
    let Some(med) = median(&mut areas) else {
        return;
    };

    let factor = if med > SQFT_MEDIAN_THRESHOLD {
        info!("floor_area looks like sqft (median {:.1}); converting to m2", med);
        1.0 / SQFT_PER_M2
    } else {
        info!("floor_area already in m2 (median {:.1})", med);
        1.0
    };
    for record in records.iter_mut() {
        record.floor_area_m2 = record.floor_area.map(|a| a * factor);
    }
}

/// Median of finite values; sorts `values` in place
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}
