use estatex_core::{Error, Query, Result, Vector};
use estatex_model::{ModelResult, RegressionPipeline, Regressor, Transform};

pub const STAGE_REGRESSION: &str = "Regression";

/// Point price from the regression pipeline.
#[derive(Debug, Clone)]
pub struct PriceEstimator {
    pipeline: RegressionPipeline,
}

impl PriceEstimator {
    pub fn new(pipeline: RegressionPipeline) -> Self {
        Self { pipeline }
    }

    /// `[one-hot(city, location, property_type), scaled(bedrooms, area_sqft)]`
    pub fn encode(&self, query: &Query) -> ModelResult<Vector> {
        let categorical = self.pipeline.encoder.transform(&[
            query.city.clone(),
            query.location.clone(),
            query.property_type.clone(),
        ])?;
        let numeric = self
            .pipeline
            .scaler
            .transform(&[query.bedrooms, query.area_sqft])?;
        Ok(Vector::concat(&[&categorical, &numeric]))
    }

    pub fn estimate(&self, query: &Query) -> Result<f64> {
        self.encode(query)
            .and_then(|features| self.pipeline.model.predict(features.as_slice()))
            .map_err(|e| Error::inference(STAGE_REGRESSION, e))
    }
}
