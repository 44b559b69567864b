//! # EstateX API
//!
//! actix-web handlers over the search context and the relational store.
//! Every failure is answered as `{"error": message}`.

pub mod auth;
pub mod error;
pub mod rest;

pub use auth::AuthContext;
pub use error::{ApiError, ApiResult};
pub use rest::{configure, ApiState, RestApi};
