//! # EstateX
//!
//! A real-estate search backend: regression price estimate, exact-match
//! retrieval inside a budget window, k-NN fallback, rental recommendations,
//! sale/rent valuation and a city-to-city "move meter".
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! estatex --data-file data/properties.csv --model-dir models --http-port 8000
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use estatex::prelude::*;
//!
//! let config = ContextConfig {
//!     data_file: "data/properties.csv".into(),
//!     model_dir: "models".into(),
//!     rental_data_file: None,
//!     city_data_file: None,
//! };
//! let context = AppContext::load(&config).unwrap();
//!
//! let query = Query::new("Pune", "Baner", "Apartment", 2.0, 850.0).with_budget(5_000_000.0);
//! let response = context.search().search(&query).unwrap();
//! println!("{} recommendations", response.recommendations.len());
//! ```
//!
//! ## Crate Structure
//!
//! - `estatex-core` - records, price parsing, query normalization, datasets, filters
//! - `estatex-model` - encoders, scaler, linear models, k-NN index, artifact loading
//! - `estatex-search` - the search pipeline, rental recommender, valuation, move meter
//! - `estatex-storage` - users, sessions, saved properties and listings in LMDB
//! - `estatex-api` - actix-web REST API

// Re-export core types
pub use estatex_core::{
    BudgetWindow, CsvTable, Error, PropertyDataset, PropertyRecord, Query, Result, Vector,
};

// Re-export models
pub use estatex_model::{ModelBundle, NeighborPipeline, RegressionPipeline};

// Re-export search
pub use estatex_search::{
    AppContext, ContextConfig, MoveMeter, RentalRecommender, ResultSource, SearchEngine,
    SearchResponse, Valuator,
};

// Re-export storage
pub use estatex_storage::StorageManager;

// Re-export API
pub use estatex_api::{ApiState, RestApi};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        AppContext, ContextConfig, Error, PropertyDataset, Query, Result, SearchEngine,
        SearchResponse,
    };
}
