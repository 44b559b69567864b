//! Bundles of fitted artifacts, one per independently trained pipeline.
//!
//! The regression and k-NN pipelines carry their own encoder and scaler.
//! They were fitted separately and must not be mixed.

use crate::artifacts::{load_artifact, load_optional_artifact};
use crate::error::{ModelError, ModelResult};
use crate::{
    FeatureAlignedModel, KnnIndex, LinearRegression, MultiLabelBinarizer, NeighborIndex,
    OneHotEncoder, Regressor, StandardScaler, Transform,
};
use std::path::Path;
use tracing::info;

pub const REGRESSION_ENCODER: &str = "ohe_encoder";
pub const REGRESSION_SCALER: &str = "scaler";
pub const REGRESSION_MODEL: &str = "regression_model";
pub const KNN_ENCODER: &str = "ohe_encoder_knn";
pub const KNN_SCALER: &str = "scaler_knn";
pub const KNN_AMENITIES: &str = "amenities_encoder";
pub const KNN_MODEL: &str = "knn_model";
pub const RENTAL_DIR: &str = "rental";
pub const RENTAL_ENCODER: &str = "ohe";
pub const RENTAL_AMENITIES: &str = "mlb";
pub const RENTAL_SCALER: &str = "scaler";
pub const RENTAL_MODEL: &str = "knn";
pub const SALES_MODEL: &str = "residential_sales_model";
pub const RENTS_MODEL: &str = "residential_rents_model";

/// Price regression: `[one-hot(city, location, type), scaled(bedrooms, area)]`
#[derive(Debug, Clone)]
pub struct RegressionPipeline {
    pub encoder: OneHotEncoder,
    pub scaler: StandardScaler,
    pub model: LinearRegression,
}

impl RegressionPipeline {
    pub fn new(
        encoder: OneHotEncoder,
        scaler: StandardScaler,
        model: LinearRegression,
    ) -> ModelResult<Self> {
        let expected = encoder.output_dim() + scaler.output_dim();
        if expected != model.n_features() {
            return Err(ModelError::Invalid(format!(
                "regression model takes {} features but encoders produce {}",
                model.n_features(),
                expected
            )));
        }
        Ok(Self {
            encoder,
            scaler,
            model,
        })
    }

    pub fn load(dir: &Path) -> ModelResult<Self> {
        Self::new(
            load_artifact(dir, REGRESSION_ENCODER)?,
            load_artifact(dir, REGRESSION_SCALER)?,
            load_artifact(dir, REGRESSION_MODEL)?,
        )
    }
}

/// Similarity search:
/// `[one-hot(city, location, type), scaled(bedrooms, area, price), amenities]`
#[derive(Debug, Clone)]
pub struct NeighborPipeline {
    pub encoder: OneHotEncoder,
    pub scaler: StandardScaler,
    pub amenities: MultiLabelBinarizer,
    pub index: KnnIndex,
}

impl NeighborPipeline {
    pub fn new(
        encoder: OneHotEncoder,
        scaler: StandardScaler,
        amenities: MultiLabelBinarizer,
        index: KnnIndex,
    ) -> ModelResult<Self> {
        let expected = encoder.output_dim() + scaler.output_dim() + amenities.output_dim();
        if !index.is_empty() && expected != index.dim() {
            return Err(ModelError::Invalid(format!(
                "k-NN index has {} features but encoders produce {}",
                index.dim(),
                expected
            )));
        }
        Ok(Self {
            encoder,
            scaler,
            amenities,
            index,
        })
    }

    pub fn load(dir: &Path) -> ModelResult<Self> {
        Self::new(
            load_artifact(dir, KNN_ENCODER)?,
            load_artifact(dir, KNN_SCALER)?,
            load_artifact(dir, KNN_AMENITIES)?,
            load_artifact(dir, KNN_MODEL)?,
        )
    }
}

/// Rental recommender:
/// `[one-hot(City, Location, Property Type), amenities, scaled(Bedrooms, Area, Price)]`
#[derive(Debug, Clone)]
pub struct RentalPipeline {
    pub encoder: OneHotEncoder,
    pub amenities: MultiLabelBinarizer,
    pub scaler: StandardScaler,
    pub index: KnnIndex,
}

impl RentalPipeline {
    /// Loads from `<dir>/rental/`. Returns `None` when the pipeline was not
    /// exported.
    pub fn load_optional(dir: &Path) -> ModelResult<Option<Self>> {
        let dir = dir.join(RENTAL_DIR);
        let Some(index) = load_optional_artifact::<KnnIndex>(&dir, RENTAL_MODEL)? else {
            return Ok(None);
        };
        Ok(Some(Self {
            encoder: load_artifact(&dir, RENTAL_ENCODER)?,
            amenities: load_artifact(&dir, RENTAL_AMENITIES)?,
            scaler: load_artifact(&dir, RENTAL_SCALER)?,
            index,
        }))
    }
}

/// Sale and rent valuation models. Either may be missing; requests for a
/// missing one fail at request time.
#[derive(Debug, Clone, Default)]
pub struct ValuationModels {
    pub sales: Option<FeatureAlignedModel>,
    pub rents: Option<FeatureAlignedModel>,
}

impl ValuationModels {
    pub fn load(dir: &Path) -> ModelResult<Self> {
        Ok(Self {
            sales: load_optional_artifact(dir, SALES_MODEL)?,
            rents: load_optional_artifact(dir, RENTS_MODEL)?,
        })
    }
}

/// Every artifact the service needs, loaded once at startup.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    pub regression: RegressionPipeline,
    pub neighbors: NeighborPipeline,
    pub rental: Option<RentalPipeline>,
    pub valuation: ValuationModels,
}

impl ModelBundle {
    pub fn load(dir: &Path) -> ModelResult<Self> {
        let regression = RegressionPipeline::load(dir)?;
        let neighbors = NeighborPipeline::load(dir)?;
        let rental = RentalPipeline::load_optional(dir)?;
        let valuation = ValuationModels::load(dir)?;

        info!(
            regression_features = regression.model.n_features(),
            knn_rows = neighbors.index.len(),
            knn_features = neighbors.index.dim(),
            rental = rental.is_some(),
            sales_model = valuation.sales.is_some(),
            rents_model = valuation.rents.is_some(),
            "Model artifacts loaded"
        );

        Ok(Self {
            regression,
            neighbors,
            rental,
            valuation,
        })
    }
}
