//! Amenity text normalization
//!
//! Amenities arrive as Python-style lists (`['Gym', 'Parking']`), JSON
//! arrays, quoted strings or plain comma text. Catalog rows and user
//! preferences both go through [`normalize_amenities`] and
//! [`amenity_tokens`]; there is no second implementation anywhere.

use serde_json::Value;

/// Canonical lowercase, single-space separated form of an amenities string
pub fn normalize_amenities(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '[' | ']' | '\'' | '"' | ',' => ' ',
            other => other,
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Word tokens of a normalized string: maximal runs of letters, digits and
/// underscores
pub fn amenity_tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
}

/// Raw amenities text from an untyped value: a list is joined with commas,
/// a string is taken as is, anything else is empty
pub fn amenities_from_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    }
}
