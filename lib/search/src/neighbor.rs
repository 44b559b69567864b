//! k-NN fallback retrieval.
//!
//! Runs only when exact matching produced nothing. The k-NN pipeline has its
//! own encoder, scaler and amenities encoder, independent of the regression
//! pipeline.

use crate::candidate::ScoredCandidate;
use estatex_core::filter::RowFilter;
use estatex_core::{
    BudgetWindow, Error, PropertyDataset, Query, RecordFilter, Result, RowCondition, Vector,
};
use estatex_model::{ModelResult, NeighborIndex, NeighborPipeline, Transform};
use tracing::debug;

pub const STAGE_KNN: &str = "KNN";

/// Upper bound on neighbors requested from the index
pub const KNN_NEIGHBORS: usize = 800;
/// Upper bound on candidates surfaced by the neighbor path
pub const MAX_CANDIDATES: usize = 200;

#[derive(Debug, Clone)]
pub struct NeighborRetriever {
    pipeline: NeighborPipeline,
}

impl NeighborRetriever {
    pub fn new(pipeline: NeighborPipeline) -> Self {
        Self { pipeline }
    }

    pub fn index_len(&self) -> usize {
        self.pipeline.index.len()
    }

    /// `[one-hot(city, location, property_type), scaled(bedrooms, area, target), amenities]`
    pub fn encode(&self, query: &Query, target_price: f64) -> ModelResult<Vector> {
        let categorical = self.pipeline.encoder.transform(&[
            query.city.clone(),
            query.location.clone(),
            query.property_type.clone(),
        ])?;
        let numeric = self
            .pipeline
            .scaler
            .transform(&[query.bedrooms, query.area_sqft, target_price])?;
        let amenities = self.pipeline.amenities.transform(&query.amenities)?;
        Ok(Vector::concat(&[&categorical, &numeric, &amenities]))
    }

    /// Neighbor-path candidates in k-NN rank order.
    ///
    /// `estimate` is the regression price, used as the price feature when the
    /// query has no budget.
    pub fn retrieve(
        &self,
        dataset: &PropertyDataset,
        query: &Query,
        estimate: f64,
    ) -> Result<Vec<ScoredCandidate>> {
        let window = query.max_price.map(BudgetWindow::around);

        let allowed = prefilter(dataset, query, window);
        let allowed_count = allowed.iter().filter(|a| **a).count();
        if allowed_count == 0 {
            debug!(city = %query.city, "Prefilter is empty");
            return Ok(Vec::new());
        }

        let features = self
            .encode(query, query.price_target(estimate))
            .map_err(|e| Error::inference(STAGE_KNN, e))?;
        let k = KNN_NEIGHBORS.min(dataset.len());
        let neighbors = self
            .pipeline
            .index
            .kneighbors(features.as_slice(), k)
            .map_err(|e| Error::inference(STAGE_KNN, e))?;

        let price_guard = window.map(|w| RecordFilter::new(RowCondition::PriceWithin(w)));
        let candidates: Vec<ScoredCandidate> = neighbors
            .iter()
            .enumerate()
            .filter(|(_, n)| allowed.get(n.index).copied().unwrap_or(false))
            .filter(|(_, n)| match (&price_guard, dataset.get(n.index)) {
                (Some(guard), Some(record)) => guard.matches(record),
                (None, Some(_)) => true,
                (_, None) => false,
            })
            .take(MAX_CANDIDATES)
            .map(|(rank, n)| ScoredCandidate::neighbor(n.index, rank, n.distance))
            .collect();

        let narrowed = soft_narrow(dataset, query, &candidates);
        debug!(
            allowed = allowed_count,
            neighbors = neighbors.len(),
            candidates = candidates.len(),
            narrowed = narrowed.len(),
            "Neighbor retrieval"
        );

        if narrowed.is_empty() {
            Ok(candidates)
        } else {
            Ok(narrowed)
        }
    }
}

/// Rows in the query's city and, with a budget, inside the budget window.
fn prefilter(dataset: &PropertyDataset, query: &Query, window: Option<BudgetWindow>) -> Vec<bool> {
    let mut conditions = vec![RowCondition::city(&query.city)];
    if let Some(window) = window {
        conditions.push(RowCondition::PriceWithin(window));
    }
    let filter = RecordFilter::new(RowCondition::And(conditions));
    dataset.records().iter().map(|r| filter.matches(r)).collect()
}

/// Cumulative location, property type and bedroom narrowing.
fn soft_narrow(
    dataset: &PropertyDataset,
    query: &Query,
    candidates: &[ScoredCandidate],
) -> Vec<ScoredCandidate> {
    let filter = RecordFilter::new(RowCondition::And(vec![
        RowCondition::location(&query.location),
        RowCondition::property_type(&query.property_type),
        RowCondition::BedroomsEq(query.bedrooms),
    ]));
    candidates
        .iter()
        .filter(|c| dataset.get(c.index).is_some_and(|r| filter.matches(r)))
        .copied()
        .collect()
}
