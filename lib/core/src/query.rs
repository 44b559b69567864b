//! Request normalization for property search.
//!
//! Turns a loosely-typed JSON body into a validated [`Query`]. Validation
//! order matters: the budget is checked first, then required-field presence,
//! then numeric coercion of bedrooms/area.

use crate::price::{coerce_f64, parse_price};
use crate::record::split_amenities;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MSG_MISSING_FIELDS: &str = "Missing required fields";
pub const MSG_INVALID_BUDGET: &str = "Invalid max_budget value";
pub const MSG_INVALID_NUMERIC: &str = "Invalid numeric values for bedrooms/area_sqft";
pub const MSG_INVALID_AREA: &str = "Area must be greater than 0";

/// A validated search query. Constructed per request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub city: String,
    pub location: String,
    pub property_type: String,
    pub bedrooms: f64,
    pub area_sqft: f64,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub max_price: Option<f64>,
}

impl Query {
    pub fn new(
        city: impl Into<String>,
        location: impl Into<String>,
        property_type: impl Into<String>,
        bedrooms: f64,
        area_sqft: f64,
    ) -> Self {
        Self {
            city: city.into(),
            location: location.into(),
            property_type: property_type.into(),
            bedrooms,
            area_sqft,
            amenities: Vec::new(),
            max_price: None,
        }
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.max_price = Some(budget);
        self
    }

    pub fn with_amenities<I, S>(mut self, amenities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.amenities = amenities.into_iter().map(Into::into).collect();
        self
    }

    /// Normalize a raw request body.
    pub fn from_json(raw: &Value) -> Result<Self> {
        let field = |name: &str| raw.get(name).filter(|v| !is_blank(v));

        let max_price = parse_budget(raw.get("max_price"))?;

        let (Some(city), Some(location), Some(property_type), Some(bedrooms), Some(area_sqft)) = (
            field("city"),
            field("location"),
            field("property_type"),
            field("bedrooms"),
            field("area_sqft"),
        ) else {
            return Err(Error::validation(MSG_MISSING_FIELDS));
        };

        let (Some(bedrooms), Some(area_sqft)) = (coerce_f64(bedrooms), coerce_f64(area_sqft)) else {
            return Err(Error::validation(MSG_INVALID_NUMERIC));
        };
        if area_sqft <= 0.0 {
            return Err(Error::validation(MSG_INVALID_AREA));
        }

        Ok(Self {
            city: value_text(city),
            location: value_text(location),
            property_type: value_text(property_type),
            bedrooms,
            area_sqft,
            amenities: parse_amenities(raw.get("amenities")),
            max_price,
        })
    }

    /// Price the ranking steers towards: the budget when given, otherwise
    /// the regression estimate.
    #[inline]
    pub fn price_target(&self, estimate: f64) -> f64 {
        self.max_price.unwrap_or(estimate)
    }
}

/// Parse an optional budget. Blank → `None`; unparseable → validation error.
pub fn parse_budget(value: Option<&Value>) -> Result<Option<f64>> {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let text = value_text(value);
    if text.trim().is_empty() {
        return Ok(None);
    }
    parse_price(&text)
        .map(Some)
        .ok_or_else(|| Error::validation(MSG_INVALID_BUDGET))
}

/// Amenities arrive as a comma-separated string or a list. Anything else
/// normalizes to an empty list.
pub fn parse_amenities(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => split_amenities(s),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Whether a JSON value counts as "not provided".
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Number(_) => false,
    }
}

/// Text view of a scalar JSON value.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> Value {
        json!({
            "city": "Pune",
            "location": "Kothrud",
            "property_type": "Apartment",
            "bedrooms": 2,
            "area_sqft": "800",
        })
    }

    #[test]
    fn test_from_json_valid() {
        let q = Query::from_json(&base()).unwrap();
        assert_eq!(q.city, "Pune");
        assert_eq!(q.bedrooms, 2.0);
        assert_eq!(q.area_sqft, 800.0);
        assert!(q.amenities.is_empty());
        assert_eq!(q.max_price, None);
    }

    #[test]
    fn test_missing_area_is_rejected() {
        let mut raw = base();
        raw.as_object_mut().unwrap().remove("area_sqft");
        let err = Query::from_json(&raw).unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m == MSG_MISSING_FIELDS));
    }

    #[test]
    fn test_empty_string_counts_as_missing() {
        let mut raw = base();
        raw["city"] = json!("  ");
        let err = Query::from_json(&raw).unwrap_err();
        assert_eq!(err.to_string(), MSG_MISSING_FIELDS);
    }

    #[test]
    fn test_budget_checked_before_required_fields() {
        let raw = json!({ "max_price": "lots" });
        let err = Query::from_json(&raw).unwrap_err();
        assert_eq!(err.to_string(), MSG_INVALID_BUDGET);
    }

    #[test]
    fn test_budget_with_currency_formatting() {
        let mut raw = base();
        raw["max_price"] = json!("₹50,00,000");
        let q = Query::from_json(&raw).unwrap();
        assert_eq!(q.max_price, Some(5_000_000.0));
        assert_eq!(q.price_target(1.0), 5_000_000.0);
    }

    #[test]
    fn test_blank_budget_is_absent() {
        let mut raw = base();
        raw["max_price"] = json!(" ");
        let q = Query::from_json(&raw).unwrap();
        assert_eq!(q.max_price, None);
        assert_eq!(q.price_target(4_200_000.0), 4_200_000.0);
    }

    #[test]
    fn test_non_numeric_bedrooms() {
        let mut raw = base();
        raw["bedrooms"] = json!("two");
        let err = Query::from_json(&raw).unwrap_err();
        assert_eq!(err.to_string(), MSG_INVALID_NUMERIC);
    }

    #[test]
    fn test_non_positive_area_is_rejected() {
        for area in [json!(0), json!(-500), json!("0"), json!("-0.5")] {
            let mut raw = base();
            raw["area_sqft"] = area;
            let err = Query::from_json(&raw).unwrap_err();
            assert_eq!(err.to_string(), MSG_INVALID_AREA);
        }
    }

    #[test]
    fn test_amenities_string_and_list() {
        assert_eq!(
            parse_amenities(Some(&json!("Gym, Pool ,"))),
            vec!["Gym", "Pool"]
        );
        assert_eq!(
            parse_amenities(Some(&json!([" Gym", "", "Lift"]))),
            vec!["Gym", "Lift"]
        );
        assert!(parse_amenities(Some(&json!({"gym": true}))).is_empty());
        assert!(parse_amenities(None).is_empty());
    }

    #[test]
    fn test_builder() {
        let q = Query::new("Pune", "Baner", "Villa", 3.0, 1800.0)
            .with_budget(9_000_000.0)
            .with_amenities(["Garden"]);
        assert_eq!(q.max_price, Some(9_000_000.0));
        assert_eq!(q.amenities, vec!["Garden".to_string()]);
    }
}
