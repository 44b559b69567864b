//! Fitted regression models.

use crate::error::{ModelError, ModelResult};
use crate::Regressor;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Ordinary linear model: `y = coef · x + intercept`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinearRegression {
    pub coef: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LinearRegression {
    pub fn new(coef: Vec<f64>, intercept: f64) -> Self {
        Self { coef, intercept }
    }
}

impl Regressor for LinearRegression {
    fn n_features(&self) -> usize {
        self.coef.len()
    }

    fn predict(&self, features: &[f64]) -> ModelResult<f64> {
        if features.len() != self.coef.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.coef.len(),
                actual: features.len(),
            });
        }
        let y: f64 = self
            .coef
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;

        if y.is_finite() {
            Ok(y)
        } else {
            Err(ModelError::NonFinite(y))
        }
    }
}

/// A linear model trained on named columns.
///
/// Inputs are supplied by name and aligned to `feature_names`; columns the
/// caller does not supply count as 0 and unknown names are dropped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureAlignedModel {
    pub feature_names: Vec<String>,
    pub model: LinearRegression,
}

impl FeatureAlignedModel {
    pub fn new(feature_names: Vec<String>, model: LinearRegression) -> ModelResult<Self> {
        if feature_names.len() != model.n_features() {
            return Err(ModelError::Invalid(format!(
                "{} feature names for {} coefficients",
                feature_names.len(),
                model.n_features()
            )));
        }
        Ok(Self {
            feature_names,
            model,
        })
    }

    /// Build the dense feature row in training column order.
    pub fn align(&self, named: &AHashMap<String, f64>) -> Vec<f64> {
        self.feature_names
            .iter()
            .map(|name| named.get(name).copied().unwrap_or(0.0))
            .collect()
    }

    pub fn predict_named(&self, named: &AHashMap<String, f64>) -> ModelResult<f64> {
        self.model.predict(&self.align(named))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_predict() {
        let model = LinearRegression::new(vec![2.0, -1.0, 0.5], 10.0);
        let y = model.predict(&[1.0, 4.0, 2.0]).unwrap();
        assert!((y - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_dimension_mismatch() {
        let model = LinearRegression::new(vec![1.0, 1.0], 0.0);
        assert!(matches!(
            model.predict(&[1.0]),
            Err(ModelError::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_non_finite_prediction_is_an_error() {
        let model = LinearRegression::new(vec![f64::MAX], f64::MAX);
        assert!(matches!(model.predict(&[2.0]), Err(ModelError::NonFinite(_))));
    }

    #[test]
    fn test_feature_alignment_fills_missing() {
        let model = FeatureAlignedModel::new(
            vec!["area_sqft".into(), "city_Pune".into(), "Gym".into()],
            LinearRegression::new(vec![5000.0, 100_000.0, 50_000.0], 1_000.0),
        )
        .unwrap();

        let mut named = AHashMap::new();
        named.insert("area_sqft".to_string(), 1000.0);
        named.insert("city_Pune".to_string(), 1.0);
        named.insert("Helipad".to_string(), 1.0);

        assert_eq!(model.align(&named), vec![1000.0, 1.0, 0.0]);
        let y = model.predict_named(&named).unwrap();
        assert!((y - 5_101_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_feature_alignment_rejects_bad_shape() {
        assert!(FeatureAlignedModel::new(
            vec!["a".into()],
            LinearRegression::new(vec![1.0, 2.0], 0.0)
        )
        .is_err());
    }
}
