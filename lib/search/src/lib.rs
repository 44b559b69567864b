//! # EstateX Search
//!
//! The property recommendation pipeline and the smaller ML-backed endpoints.
//!
//! A search runs in four stages:
//!
//! 1. [`PriceEstimator`] - regression estimate for the query
//! 2. [`exact::retrieve_exact`] - exact city/location/type/bedroom matches,
//!    ranked by price then area distance
//! 3. [`NeighborRetriever`] - k-NN fallback within the city and budget window
//! 4. [`projector`] - output normalization
//!
//! [`AppContext`] owns the dataset and artifacts and is shared read-only
//! across requests.

pub mod candidate;
pub mod context;
pub mod engine;
pub mod estimator;
pub mod exact;
pub mod move_meter;
pub mod neighbor;
pub mod projector;
pub mod rental;
pub mod showcase;
pub mod valuation;

pub use candidate::{CandidateScore, ScoredCandidate};
pub use context::{AppContext, ContextConfig};
pub use engine::{ResultSource, SearchEngine, SearchResponse};
pub use estimator::PriceEstimator;
pub use exact::{ExactMatch, FallbackReason};
pub use move_meter::{CityComparison, MoveMeter, Winner};
pub use neighbor::NeighborRetriever;
pub use rental::RentalRecommender;
pub use valuation::{ListingKind, Valuation, Valuator};
