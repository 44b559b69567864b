//! Output rows.
//!
//! Every surfaced record is re-parsed on the way out: bedrooms and area become
//! integers (0 when they do not parse), the price becomes a float or null, and
//! placeholder images become null.

use crate::candidate::ScoredCandidate;
use estatex_core::price::parse_finite;
use estatex_core::{coerce_int, PropertyDataset, PropertyRecord};
use serde_json::{Map, Number, Value};

/// JSON object for one dataset row.
pub fn project_record(record: &PropertyRecord) -> Value {
    let mut out = Map::new();
    for (key, value) in &record.extra {
        out.insert(key.clone(), extra_value(value));
    }
    out.insert("city".into(), Value::String(record.city.clone()));
    out.insert("location".into(), Value::String(record.location.clone()));
    out.insert(
        "property_type".into(),
        Value::String(record.property_type.clone()),
    );
    out.insert(
        "bedrooms".into(),
        Value::from(coerce_int(&record.bedrooms, 0)),
    );
    out.insert(
        "area_sqft".into(),
        Value::from(coerce_int(&record.area_sqft, 0)),
    );
    out.insert("price".into(), number_or_null(record.price_value()));
    out.insert("amenities".into(), Value::String(record.amenities.clone()));
    out.insert(
        "image".into(),
        record
            .image_url()
            .map(|url| Value::String(url.to_string()))
            .unwrap_or(Value::Null),
    );
    Value::Object(out)
}

pub fn project_candidates(dataset: &PropertyDataset, candidates: &[ScoredCandidate]) -> Vec<Value> {
    candidates
        .iter()
        .filter_map(|c| dataset.get(c.index))
        .map(project_record)
        .collect()
}

/// Extra columns: numbers stay numbers, blanks become null.
pub fn extra_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Value::Null;
    }
    match parse_finite(trimmed) {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 && !trimmed.contains('.') => {
            Value::from(v as i64)
        }
        Some(v) => number_or_null(Some(v)),
        None => Value::String(raw.to_string()),
    }
}

fn number_or_null(value: Option<f64>) -> Value {
    value
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
