//! Exact-match retrieval.
//!
//! Rows must match the query's city, location and property type (trimmed,
//! case-insensitive) and its bedroom count. Matches are ranked by distance to
//! the target price, then to the requested area. Anything that prevents a
//! ranking is a [`FallbackReason`], never an error: the caller moves on to the
//! neighbor path.

use crate::candidate::ScoredCandidate;
use estatex_core::{PropertyDataset, Query, RecordFilter, RowCondition};
use std::cmp::Ordering;
use tracing::debug;

/// Maximum number of exact matches returned
pub const EXACT_TOP_K: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    NoExactRows,
    NonFiniteTarget,
    NonFiniteArea,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExactMatch {
    Found(Vec<ScoredCandidate>),
    Fallback(FallbackReason),
}

pub fn exact_filter(query: &Query) -> RecordFilter {
    RecordFilter::new(RowCondition::And(vec![
        RowCondition::city(&query.city),
        RowCondition::location(&query.location),
        RowCondition::property_type(&query.property_type),
        RowCondition::BedroomsEq(query.bedrooms),
    ]))
}

/// Rank exact matches against `target_price`.
pub fn retrieve_exact(dataset: &PropertyDataset, query: &Query, target_price: f64) -> ExactMatch {
    if !target_price.is_finite() {
        return ExactMatch::Fallback(FallbackReason::NonFiniteTarget);
    }
    if !query.area_sqft.is_finite() {
        return ExactMatch::Fallback(FallbackReason::NonFiniteArea);
    }

    let rows = dataset.filter_indices(&exact_filter(query));
    if rows.is_empty() {
        return ExactMatch::Fallback(FallbackReason::NoExactRows);
    }

    let mut scored: Vec<ScoredCandidate> = rows
        .into_iter()
        .filter_map(|idx| {
            let record = dataset.get(idx)?;
            let price_distance = record.price_value().map(|p| (p - target_price).abs());
            let area_distance = record.area_value().map(|a| (a - query.area_sqft).abs());
            Some(ScoredCandidate::exact(idx, price_distance, area_distance))
        })
        .collect();

    // stable: ties keep dataset order
    scored.sort_by(compare_exact);
    scored.truncate(EXACT_TOP_K);

    debug!(matches = scored.len(), target_price, "Exact-match retrieval");
    ExactMatch::Found(scored)
}

fn compare_exact(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    use crate::candidate::CandidateScore::Exact;
    match (a.score, b.score) {
        (
            Exact {
                price_distance: pa,
                area_distance: aa,
            },
            Exact {
                price_distance: pb,
                area_distance: ab,
            },
        ) => missing_last(pa, pb).then_with(|| missing_last(aa, ab)),
        _ => Ordering::Equal,
    }
}

/// Ascending, with `None` after every value
fn missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
