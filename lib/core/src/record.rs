use crate::price::{parse_finite, parse_price};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the reference property dataset.
///
/// Fields are kept as the raw text read from the dataset. Numeric views
/// (`price_value`, `bedrooms_value`, `area_value`) re-parse on every call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyRecord {
    pub city: String,
    pub location: String,
    pub property_type: String,
    pub bedrooms: String,
    pub area_sqft: String,
    /// Currency-formatted display price, e.g. `"₹45,00,000"`
    pub price: String,
    /// Comma-joined amenity names
    pub amenities: String,
    pub image: Option<String>,
    /// Any further dataset columns, by header name
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl PropertyRecord {
    #[inline]
    pub fn price_value(&self) -> Option<f64> {
        parse_price(&self.price)
    }

    #[inline]
    pub fn bedrooms_value(&self) -> Option<f64> {
        parse_finite(&self.bedrooms)
    }

    #[inline]
    pub fn area_value(&self) -> Option<f64> {
        parse_finite(&self.area_sqft)
    }

    pub fn amenity_list(&self) -> Vec<String> {
        split_amenities(&self.amenities)
    }

    /// Image URL, with empty and `NaN` placeholders mapped to `None`.
    pub fn image_url(&self) -> Option<&str> {
        self.image
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("nan"))
    }
}

/// Split a comma-separated amenity string, trimming and dropping blanks.
pub fn split_amenities(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Case-insensitive key used for exact matching (`strip().casefold()`).
#[inline]
pub fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}
