use crate::error::{ModelError, ModelResult};
use crate::Transform;
use serde::{Deserialize, Serialize};

/// Standardizes numeric columns: `(x - mean) / scale`.
///
/// A zero scale (constant column at fit time) is treated as 1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> ModelResult<Self> {
        if mean.len() != scale.len() {
            return Err(ModelError::Invalid(format!(
                "scaler has {} means but {} scales",
                mean.len(),
                scale.len()
            )));
        }
        Ok(Self { mean, scale })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }
}

impl Transform for StandardScaler {
    type Input = [f64];

    fn output_dim(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, values: &[f64]) -> ModelResult<Vec<f64>> {
        if values.len() != self.mean.len() || self.scale.len() != self.mean.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.mean.len(),
                actual: values.len(),
            });
        }

        Ok(values
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| {
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (x - mean) / scale
            })
            .collect())
    }
}
