//! Persisted entities and the request forms that create them.

use chrono::{DateTime, Utc};
use estatex_core::query::{is_blank, value_text};
use estatex_core::{coerce_f64, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
}

/// Public profile returned by `/api/me/`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// A session written by the auth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: u64,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedProperty {
    pub id: u64,
    pub user_id: u64,
    pub city: String,
    pub location: String,
    pub property_type: String,
    pub bedrooms: i64,
    pub area_sqft: i64,
    pub seller_name: String,
    pub seller_phone: String,
    pub property_image: Option<String>,
    pub price: f64,
    #[serde(rename = "Connectivity")]
    pub connectivity: f64,
    #[serde(rename = "Neighbourhood")]
    pub neighbourhood: f64,
    #[serde(rename = "Safety")]
    pub safety: f64,
    #[serde(rename = "Livability")]
    pub livability: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingType {
    Sell,
    Rent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Residential,
    Commercial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: u64,
    pub user_id: u64,
    pub listing_type: ListingType,
    pub category: Category,
    pub city: String,
    pub location: String,
    pub property_type: String,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub area: i64,
    pub price: f64,
    pub image: Option<String>,
    pub description: Option<String>,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
}

/// A stored record together with its owner's name and email, as returned by
/// the API.
#[derive(Debug, Clone, Serialize)]
pub struct OwnedView<'a, T: Serialize> {
    pub user_name: &'a str,
    pub user_email: &'a str,
    #[serde(flatten)]
    pub record: &'a T,
}

impl<'a, T: Serialize> OwnedView<'a, T> {
    pub fn new(owner: &'a User, record: &'a T) -> Self {
        Self {
            user_name: &owner.username,
            user_email: &owner.email,
            record,
        }
    }
}

fn text(raw: &Value, field: &str) -> Option<String> {
    raw.get(field).filter(|v| !v.is_null()).map(value_text)
}

fn required_text(raw: &Value, field: &str) -> Result<String> {
    text(raw, field).ok_or_else(|| Error::validation(format!("{}: This field is required.", field)))
}

fn optional_text(raw: &Value, field: &str) -> Option<String> {
    raw.get(field).filter(|v| !is_blank(v)).map(value_text)
}

fn number(raw: &Value, field: &str) -> Result<Option<f64>> {
    match raw.get(field).filter(|v| !is_blank(v)) {
        None => Ok(None),
        Some(v) => coerce_f64(v)
            .map(Some)
            .ok_or_else(|| Error::validation(format!("{}: A valid number is required.", field))),
    }
}

fn integer(raw: &Value, field: &str) -> Result<Option<i64>> {
    Ok(number(raw, field)?.map(|v| v.trunc() as i64))
}

/// Body of `POST /api/save-property/`
#[derive(Debug, Clone, PartialEq)]
pub struct NewSavedProperty {
    pub city: String,
    pub location: String,
    pub property_type: String,
    pub bedrooms: i64,
    pub area_sqft: i64,
    pub seller_name: String,
    pub seller_phone: String,
    pub property_image: Option<String>,
    pub price: f64,
    pub connectivity: f64,
    pub neighbourhood: f64,
    pub safety: f64,
    pub livability: f64,
}

impl NewSavedProperty {
    pub fn from_json(raw: &Value) -> Result<Self> {
        let required_int = |field: &str| {
            integer(raw, field)?
                .ok_or_else(|| Error::validation(format!("{}: This field is required.", field)))
        };
        let score = |field: &str| number(raw, field).map(|v| v.unwrap_or(0.0));

        Ok(Self {
            city: required_text(raw, "city")?,
            location: required_text(raw, "location")?,
            property_type: required_text(raw, "property_type")?,
            bedrooms: required_int("bedrooms")?,
            area_sqft: required_int("area_sqft")?,
            seller_name: required_text(raw, "seller_name")?,
            seller_phone: required_text(raw, "seller_phone")?,
            property_image: optional_text(raw, "property_image"),
            price: score("price")?,
            connectivity: score("Connectivity")?,
            neighbourhood: score("Neighbourhood")?,
            safety: score("Safety")?,
            livability: score("Livability")?,
        })
    }

    pub fn into_record(self, id: u64, user_id: u64, created_at: DateTime<Utc>) -> SavedProperty {
        SavedProperty {
            id,
            user_id,
            city: self.city,
            location: self.location,
            property_type: self.property_type,
            bedrooms: self.bedrooms,
            area_sqft: self.area_sqft,
            seller_name: self.seller_name,
            seller_phone: self.seller_phone,
            property_image: self.property_image,
            price: self.price,
            connectivity: self.connectivity,
            neighbourhood: self.neighbourhood,
            safety: self.safety,
            livability: self.livability,
            created_at,
        }
    }
}

/// Body of `POST /api/properties_listings/`
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub listing_type: ListingType,
    pub category: Category,
    pub city: String,
    pub location: String,
    pub property_type: String,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub area: i64,
    pub price: f64,
    pub image: Option<String>,
    pub description: Option<String>,
    pub phone_number: String,
}

impl NewListing {
    pub fn from_json(raw: &Value) -> Result<Self> {
        let choice = |field: &str| -> Result<Value> {
            let value = required_text(raw, field)?;
            Ok(Value::String(value))
        };
        let listing_type: ListingType = serde_json::from_value(choice("listing_type")?)
            .map_err(|_| Error::validation("listing_type: expected \"Sell\" or \"Rent\"."))?;
        let category: Category = serde_json::from_value(choice("category")?).map_err(|_| {
            Error::validation("category: expected \"Residential\" or \"Commercial\".")
        })?;

        Ok(Self {
            listing_type,
            category,
            city: required_text(raw, "city")?,
            location: required_text(raw, "location")?,
            property_type: required_text(raw, "property_type")?,
            bedrooms: integer(raw, "bedrooms")?,
            bathrooms: integer(raw, "bathrooms")?,
            area: integer(raw, "area")?.unwrap_or(0),
            price: number(raw, "price")?.unwrap_or(0.0),
            image: optional_text(raw, "image"),
            description: optional_text(raw, "description"),
            phone_number: required_text(raw, "phone_number")?,
        })
    }

    pub fn into_record(self, id: u64, user_id: u64, created_at: DateTime<Utc>) -> Listing {
        Listing {
            id,
            user_id,
            listing_type: self.listing_type,
            category: self.category,
            city: self.city,
            location: self.location,
            property_type: self.property_type,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            area: self.area,
            price: self.price,
            image: self.image,
            description: self.description,
            phone_number: self.phone_number,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn saved_body() -> Value {
        json!({
            "city": "Pune",
            "location": "Baner",
            "property_type": "Apartment",
            "bedrooms": "2",
            "area_sqft": 950,
            "seller_name": "Asha",
            "seller_phone": "9800000000",
            "price": "5200000",
            "Safety": 4.5
        })
    }

    #[test]
    fn test_saved_property_defaults() {
        let new = NewSavedProperty::from_json(&saved_body()).unwrap();
        assert_eq!(new.bedrooms, 2);
        assert_eq!(new.price, 5_200_000.0);
        assert_eq!(new.safety, 4.5);
        assert_eq!(new.connectivity, 0.0);
        assert_eq!(new.property_image, None);
    }

    #[test]
    fn test_saved_property_requires_bedrooms() {
        let mut raw = saved_body();
        raw.as_object_mut().unwrap().remove("bedrooms");
        let err = NewSavedProperty::from_json(&raw).unwrap_err();
        assert!(err.to_string().starts_with("bedrooms"));
    }

    #[test]
    fn test_listing_choices() {
        let raw = json!({
            "listing_type": "Rent",
            "category": "Commercial",
            "city": "Mumbai",
            "location": "Andheri",
            "property_type": "Office",
            "area": "1200",
            "phone_number": "9800000001",
            "bedrooms": ""
        });
        let new = NewListing::from_json(&raw).unwrap();
        assert_eq!(new.listing_type, ListingType::Rent);
        assert_eq!(new.category, Category::Commercial);
        assert_eq!(new.bedrooms, None);
        assert_eq!(new.area, 1200);
        assert_eq!(new.price, 0.0);

        let mut bad = raw;
        bad["listing_type"] = json!("Lease");
        assert!(matches!(NewListing::from_json(&bad), Err(Error::Validation(_))));
    }

    #[test]
    fn test_owned_view_shape() {
        let user = User {
            id: 7,
            username: "asha".into(),
            email: "asha@example.com".into(),
        };
        let record = NewSavedProperty::from_json(&saved_body())
            .unwrap()
            .into_record(3, 7, Utc::now());
        let view = serde_json::to_value(OwnedView::new(&user, &record)).unwrap();
        assert_eq!(view["id"], json!(3));
        assert_eq!(view["user_name"], json!("asha"));
        assert_eq!(view["Safety"], json!(4.5));
    }

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        let open = Session { user_id: 1, expires_at: None };
        let past = Session { user_id: 1, expires_at: Some(now - chrono::Duration::seconds(1)) };
        assert!(!open.is_expired(now));
        assert!(past.is_expired(now));
    }
}
