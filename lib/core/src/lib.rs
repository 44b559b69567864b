//! # EstateX Core
//!
//! Core types for the EstateX property search backend.
//!
//! - [`PropertyRecord`] - One row of the reference dataset, prices kept as display strings
//! - [`PropertyDataset`] - Immutable dataset loaded once from CSV
//! - [`Query`] - Validated search request
//! - [`RecordFilter`] - Exact-match and budget-window row predicates
//! - [`Vector`] - Dense encoded feature vector
//!
//! ## Example
//!
//! ```rust
//! use estatex_core::{PropertyDataset, Query, RecordFilter, RowCondition};
//!
//! let csv = "city,location,property_type,bedrooms,area_sqft,price\n\
//!            Pune,Kothrud,Apartment,2,850,\"₹52,00,000\"\n";
//! let dataset = PropertyDataset::from_reader(csv.as_bytes()).unwrap();
//!
//! let query = Query::from_json(&serde_json::json!({
//!     "city": "pune", "location": "Kothrud", "property_type": "Apartment",
//!     "bedrooms": 2, "area_sqft": 800
//! })).unwrap();
//!
//! let filter = RecordFilter::new(RowCondition::city(&query.city));
//! assert_eq!(dataset.filter_indices(&filter), vec![0]);
//! ```

pub mod dataset;
pub mod error;
pub mod filter;
pub mod price;
pub mod query;
pub mod record;
pub mod vector;

pub use dataset::{CsvTable, PropertyDataset};
pub use error::{Error, Result};
pub use filter::{BudgetWindow, RecordFilter, RowCondition, RowFilter};
pub use price::{coerce_f64, coerce_int, parse_price, round2};
pub use query::Query;
pub use record::{normalize_key, split_amenities, PropertyRecord};
pub use vector::Vector;
