use serde::{Deserialize, Serialize};

/// Stable listing identifier (the catalog's `no` column)
pub type PropertyId = i64;

/// Ordinal label derived from the smart living score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SmartLabel {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl SmartLabel {
    /// Bucket a 0-100 score: 80+ excellent, 65+ good, 45+ fair
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            SmartLabel::Excellent
        } else if score >= 65.0 {
            SmartLabel::Good
        } else if score >= 45.0 {
            SmartLabel::Fair
        } else {
            SmartLabel::Poor
        }
    }

    /// Case-insensitive parse of a stored label
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excellent" => Some(SmartLabel::Excellent),
            "good" => Some(SmartLabel::Good),
            "fair" => Some(SmartLabel::Fair),
            "poor" => Some(SmartLabel::Poor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SmartLabel::Excellent => "Excellent",
            SmartLabel::Good => "Good",
            SmartLabel::Fair => "Fair",
            SmartLabel::Poor => "Poor",
        }
    }
}

impl std::fmt::Display for SmartLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sanitized catalog row.
///
/// Records are immutable once the catalog is built. `price`, `latitude` and
/// `longitude` are always present; rows without them never reach a catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyRecord {
    pub id: PropertyId,
    pub property_type: Option<String>,
    /// Floor area as delivered by the source, unit unknown
    pub floor_area: Option<f64>,
    pub floor_area_m2: Option<f64>,
    pub condition: Option<String>,
    /// Raw amenities text, empty when missing
    pub amenities: String,
    pub furnishing_status: Option<String>,
    pub num_rooms: i64,
    pub num_bathrooms: i64,
    pub price: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub location: Option<String>,

    pub dist_hospital: Option<f64>,
    pub dist_school: Option<f64>,
    pub dist_bus: Option<f64>,
    pub crime_rate: Option<f64>,

    pub air_conditioning: bool,
    pub heating: bool,
    pub has_gym: bool,
    pub has_parking: bool,
    pub has_pool: bool,

    pub price_per_m2: Option<f64>,
    pub income: Option<f64>,
    pub price_to_income_ratio: Option<f64>,
    pub transport_score: Option<f64>,
    pub transport_norm: Option<f64>,
    pub affordability_score: Option<f64>,
    pub hqs_score: Option<f64>,
    /// 0-100; missing scores are stored as 0.0
    pub smart_living_score: f64,
    pub smart_label: SmartLabel,
}

impl PropertyRecord {
    /// A minimal record with every optional field empty
    pub fn new(id: PropertyId, price: f64, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            property_type: None,
            floor_area: None,
            floor_area_m2: None,
            condition: None,
            amenities: String::new(),
            furnishing_status: None,
            num_rooms: 0,
            num_bathrooms: 0,
            price,
            latitude,
            longitude,
            location: None,
            dist_hospital: None,
            dist_school: None,
            dist_bus: None,
            crime_rate: None,
            air_conditioning: false,
            heating: false,
            has_gym: false,
            has_parking: false,
            has_pool: false,
            price_per_m2: None,
            income: None,
            price_to_income_ratio: None,
            transport_score: None,
            transport_norm: None,
            affordability_score: None,
            hqs_score: None,
            smart_living_score: 0.0,
            smart_label: SmartLabel::Poor,
        }
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
    pub fn with_rooms(mut self, rooms: i64, bathrooms: i64) -> Self {
        self.num_rooms = rooms;
        self.num_bathrooms = bathrooms;
        self
    }

    #[must_use]
    pub fn with_floor_area_m2(mut self, area: f64) -> Self {
        self.floor_area = Some(area);
        self.floor_area_m2 = Some(area);
        self
    }

    /// Sets the score and re-derives the label
    #[must_use]
    pub fn with_smart_living_score(mut self, score: f64) -> Self {
        self.smart_living_score = score;
        self.smart_label = SmartLabel::from_score(score);
        self
    }

    #[must_use]
    pub fn with_price_to_income_ratio(mut self, ratio: f64) -> Self {
        self.price_to_income_ratio = Some(ratio);
        self
    }

    /// Case-insensitive location comparison
    pub fn location_matches(&self, location: &str) -> bool {
        self.location
            .as_deref()
            .map(|l| l.to_lowercase() == location.to_lowercase())
            .unwrap_or(false)
    }
}
