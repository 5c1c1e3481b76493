// Hard preference filters over retrieved candidates
use crate::preferences::Preferences;
use smartliving_core::PropertyRecord;

pub trait Filter {
    fn matches(&self, record: &PropertyRecord) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterCondition {
    /// Case-insensitive exact location
    Location(String),
    MaxBudget(f64),
    /// Fractional preferences are truncated, so 2.7 admits 2 rooms
    MinRooms(i64),
    MinSmartScore(f64),
}

impl FilterCondition {
    fn matches(&self, record: &PropertyRecord) -> bool {
        match self {
            FilterCondition::Location(location) => record.location_matches(location),
            FilterCondition::MaxBudget(budget) => record.price <= *budget,
            FilterCondition::MinRooms(rooms) => record.num_rooms >= *rooms,
            FilterCondition::MinSmartScore(score) => record.smart_living_score >= *score,
        }
    }
}

/// Conjunction of every hard filter a preference sets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceFilter {
    conditions: Vec<FilterCondition>,
}

impl PreferenceFilter {
    pub fn new(conditions: Vec<FilterCondition>) -> Self {
        Self { conditions }
    }

    pub fn from_preferences(prefs: &Preferences) -> Self {
        let mut conditions = Vec::new();
        if let Some(location) = prefs.location_filter() {
            conditions.push(FilterCondition::Location(location.to_string()));
        }
        if let Some(budget) = prefs.max_budget {
            conditions.push(FilterCondition::MaxBudget(budget));
        }
        if let Some(rooms) = prefs.min_rooms {
            conditions.push(FilterCondition::MinRooms(rooms.trunc() as i64));
        }
        if let Some(score) = prefs.min_smart_score {
            conditions.push(FilterCondition::MinSmartScore(score));
        }
        Self { conditions }
    }

    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl Filter for PreferenceFilter {
    fn matches(&self, record: &PropertyRecord) -> bool {
        self.conditions.iter().all(|c| c.matches(record))
    }
}
