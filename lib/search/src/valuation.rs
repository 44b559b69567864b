//! Sale and rent price estimates from feature-aligned models.

use ahash::AHashMap;
use estatex_core::query::{is_blank, parse_amenities, value_text};
use estatex_core::{coerce_f64, round2, Error, Result};
use estatex_model::{FeatureAlignedModel, ValuationModels};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

pub const STAGE_VALUATION: &str = "Valuation";

const REQUIRED_FIELDS: [&str; 7] = [
    "listing_type",
    "city",
    "location",
    "property_type",
    "bedrooms",
    "area_sqft",
    "amenities",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Sale,
    Rent,
}

impl ListingKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "sale" => Some(ListingKind::Sale),
            "rent" => Some(ListingKind::Rent),
            _ => None,
        }
    }

    pub fn price_basis(&self) -> &'static str {
        match self {
            ListingKind::Sale => "Total (Sale)",
            ListingKind::Rent => "Total (Monthly Rent)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Valuation {
    pub estimated_price: f64,
    pub price_basis: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct Valuator {
    models: ValuationModels,
}

impl Valuator {
    pub fn new(models: ValuationModels) -> Self {
        Self { models }
    }

    fn model(&self, kind: ListingKind) -> Option<&FeatureAlignedModel> {
        match kind {
            ListingKind::Sale => self.models.sales.as_ref(),
            ListingKind::Rent => self.models.rents.as_ref(),
        }
    }

    pub fn estimate(&self, raw: &Value) -> Result<Valuation> {
        for field in REQUIRED_FIELDS {
            if raw.get(field).map_or(true, is_blank) {
                return Err(Error::validation(format!(
                    "Missing or empty required field: {}",
                    field
                )));
            }
        }

        let numeric = |field: &str| {
            raw.get(field).and_then(coerce_f64).ok_or_else(|| {
                Error::validation(format!("Invalid numeric value: {}", field))
            })
        };
        let bedrooms = numeric("bedrooms")?;
        let area_sqft = numeric("area_sqft")?;
        if area_sqft <= 0.0 {
            return Err(Error::validation("Area must be greater than 0"));
        }

        let listing_type = raw.get("listing_type").map(value_text).unwrap_or_default();
        let kind = ListingKind::parse(&listing_type).ok_or_else(|| {
            Error::validation("Invalid listing_type. Must be \"sale\" or \"rent\".")
        })?;

        let model = self.model(kind).ok_or_else(|| {
            Error::Artifact(format!(
                "{} valuation model not found. Please train the model first.",
                kind.price_basis()
            ))
        })?;

        let text = |field: &str| raw.get(field).map(value_text).unwrap_or_default();
        let mut named = AHashMap::new();
        named.insert("bedrooms".to_string(), bedrooms);
        named.insert("area_sqft".to_string(), area_sqft);
        named.insert(format!("city_{}", text("city")), 1.0);
        named.insert(format!("location_{}", text("location")), 1.0);
        named.insert(format!("property_type_{}", text("property_type")), 1.0);
        for amenity in parse_amenities(raw.get("amenities")) {
            named.insert(amenity, 1.0);
        }

        let price = model
            .predict_named(&named)
            .map_err(|e| Error::inference(STAGE_VALUATION, e))?;
        debug!(?kind, price, "Valuation");

        Ok(Valuation {
            estimated_price: round2(price),
            price_basis: kind.price_basis(),
        })
    }
}
