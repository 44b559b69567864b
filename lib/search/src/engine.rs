//! The search pipeline: estimate, exact match, neighbor fallback, projection.

use crate::exact::{retrieve_exact, ExactMatch};
use crate::neighbor::NeighborRetriever;
use crate::projector::project_candidates;
use crate::PriceEstimator;
use estatex_core::{PropertyDataset, Query, Result};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, info_span};

/// Which retrieval path produced the recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    Exact,
    Neighbor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub regression_price: f64,
    pub recommendations: Vec<Value>,
    #[serde(skip)]
    pub source: ResultSource,
}

#[derive(Debug, Clone)]
pub struct SearchEngine {
    dataset: Arc<PropertyDataset>,
    estimator: PriceEstimator,
    neighbors: NeighborRetriever,
}

impl SearchEngine {
    pub fn new(
        dataset: Arc<PropertyDataset>,
        estimator: PriceEstimator,
        neighbors: NeighborRetriever,
    ) -> Self {
        Self {
            dataset,
            estimator,
            neighbors,
        }
    }

    pub fn dataset(&self) -> &Arc<PropertyDataset> {
        &self.dataset
    }

    pub fn estimator(&self) -> &PriceEstimator {
        &self.estimator
    }

    /// Validate a raw request body, then search.
    pub fn search_json(&self, raw: &Value) -> Result<SearchResponse> {
        let query = Query::from_json(raw)?;
        self.search(&query)
    }

    pub fn search(&self, query: &Query) -> Result<SearchResponse> {
        let request_id = uuid::Uuid::new_v4();
        let span = info_span!("search", %request_id, city = %query.city);
        let _guard = span.enter();

        let regression_price = self.estimator.estimate(query)?;
        let target = query.price_target(regression_price);

        let (candidates, source) = match retrieve_exact(&self.dataset, query, target) {
            ExactMatch::Found(candidates) if !candidates.is_empty() => {
                (candidates, ResultSource::Exact)
            }
            ExactMatch::Found(_) => (
                self.neighbors.retrieve(&self.dataset, query, regression_price)?,
                ResultSource::Neighbor,
            ),
            ExactMatch::Fallback(reason) => {
                debug!(?reason, "Falling back to neighbor retrieval");
                (
                    self.neighbors.retrieve(&self.dataset, query, regression_price)?,
                    ResultSource::Neighbor,
                )
            }
        };

        let recommendations = project_candidates(&self.dataset, &candidates);
        info!(
            regression_price,
            results = recommendations.len(),
            source = ?source,
            "Search complete"
        );

        Ok(SearchResponse {
            regression_price,
            recommendations,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estatex_core::query::MSG_MISSING_FIELDS;
    use estatex_core::{BudgetWindow, Error};
    use estatex_model::{
        HandleUnknown, KnnIndex, LinearRegression, MultiLabelBinarizer, NeighborPipeline,
        OneHotEncoder, RegressionPipeline, StandardScaler,
    };
    use serde_json::json;

    const CSV: &str = "\
city,location,property_type,bedrooms,area_sqft,price,amenities,image
Pune,Kothrud,Villa,3,1500,\"₹90,00,000\",Garden,
Pune,Baner,Apartment,2,800,\"₹50,00,000\",Gym,https://img/1.jpg
Pune,Baner,Apartment,2,850,\"₹52,00,000\",,
Pune,Wakad,Apartment,2,790,\"₹48,00,000\",,NaN
Mumbai,Andheri,Apartment,2,800,\"₹50,00,000\",,
Pune,Hinjewadi,Apartment,1,500,\"₹30,00,000\",,
";

    fn no_categories() -> OneHotEncoder {
        OneHotEncoder::new(vec![vec![], vec![], vec![]], HandleUnknown::Ignore)
    }

    fn engine_with_intercept(intercept: f64) -> SearchEngine {
        let dataset = PropertyDataset::from_reader(CSV.as_bytes()).unwrap();
        let points = dataset
            .records()
            .iter()
            .map(|r| {
                vec![
                    r.bedrooms_value().unwrap(),
                    r.area_value().unwrap() / 1000.0,
                    r.price_value().unwrap() / 1e6,
                ]
            })
            .collect();

        let regression = RegressionPipeline::new(
            no_categories(),
            StandardScaler::new(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap(),
            LinearRegression::new(vec![0.0, 0.0], intercept),
        )
        .unwrap();
        let neighbors = NeighborPipeline::new(
            no_categories(),
            StandardScaler::new(vec![0.0; 3], vec![1.0, 1000.0, 1e6]).unwrap(),
            MultiLabelBinarizer::new(Vec::new()),
            KnnIndex::new(points).unwrap(),
        )
        .unwrap();

        SearchEngine::new(
            Arc::new(dataset),
            PriceEstimator::new(regression),
            NeighborRetriever::new(neighbors),
        )
    }

    fn engine() -> SearchEngine {
        engine_with_intercept(5_000_000.0)
    }

    #[test]
    fn test_exact_path_short_circuits() {
        let query = Query::new("pune", "BANER", "apartment", 2.0, 800.0);
        let response = engine().search(&query).unwrap();
        assert_eq!(response.source, ResultSource::Exact);
        assert_eq!(response.regression_price, 5_000_000.0);
        assert_eq!(response.recommendations.len(), 2);
        assert_eq!(response.recommendations[0]["price"], json!(5_000_000.0));
        assert_eq!(response.recommendations[0]["image"], json!("https://img/1.jpg"));
        assert_eq!(response.recommendations[1]["area_sqft"], json!(850));
    }

    #[test]
    fn test_kothrud_falls_through_to_neighbors() {
        let query = Query::new("Pune", "Kothrud", "Apartment", 2.0, 800.0);
        let response = engine().search(&query).unwrap();
        assert_eq!(response.source, ResultSource::Neighbor);
        assert!(!response.recommendations.is_empty());
        assert!(response.recommendations.len() <= 200);
        for rec in &response.recommendations {
            assert_eq!(rec["city"], json!("Pune"));
        }
    }

    #[test]
    fn test_neighbor_path_respects_budget_window() {
        let budget = 5_000_000.0;
        let query = Query::new("Pune", "Kothrud", "Apartment", 2.0, 800.0).with_budget(budget);
        let response = engine().search(&query).unwrap();
        let window = BudgetWindow::around(budget);
        assert_eq!(response.source, ResultSource::Neighbor);
        assert_eq!(response.recommendations.len(), 2);
        for rec in &response.recommendations {
            assert!(window.contains(rec["price"].as_f64().unwrap()));
        }
    }

    #[test]
    fn test_identical_queries_identical_results() {
        let engine = engine();
        let query = Query::new("Pune", "Kothrud", "Apartment", 2.0, 800.0);
        let a = serde_json::to_value(engine.search(&query).unwrap()).unwrap();
        let b = serde_json::to_value(engine.search(&query).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_validation_precedes_model_call() {
        // any prediction from this engine is non-finite
        let engine = engine_with_intercept(f64::INFINITY);
        let raw = json!({
            "city": "Pune", "location": "Kothrud", "property_type": "Apartment", "bedrooms": 2
        });
        let err = engine.search_json(&raw).unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m == MSG_MISSING_FIELDS));

        let mut raw = raw;
        raw["area_sqft"] = json!(800);
        let err = engine.search_json(&raw).unwrap_err();
        assert!(matches!(err, Error::Inference { ref stage, .. } if stage == "Regression"));
    }

    #[test]
    fn test_response_shape() {
        let query = Query::new("Pune", "Baner", "Apartment", 2.0, 800.0);
        let value = serde_json::to_value(engine().search(&query).unwrap()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert!(obj.contains_key("regression_price"));
        assert!(obj["recommendations"].is_array());
    }
}
