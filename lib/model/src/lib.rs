//! # EstateX Model
//!
//! Fit-free inference over pre-trained artifacts.
//!
//! Training happens offline. This crate only loads the fitted parameters and
//! exposes three contracts:
//!
//! - [`Transform`] - encoders and scalers (`transform`)
//! - [`Regressor`] - point predictions (`predict`)
//! - [`NeighborIndex`] - nearest-neighbor queries (`kneighbors`)
//!
//! ## Example
//!
//! ```rust
//! use estatex_model::{KnnIndex, NeighborIndex, OneHotEncoder, HandleUnknown, Transform};
//!
//! let encoder = OneHotEncoder::new(vec![vec!["Pune".into(), "Mumbai".into()]], HandleUnknown::Ignore);
//! let features = encoder.transform(&["Mumbai".to_string()]).unwrap();
//!
//! let index = KnnIndex::new(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
//! let neighbors = index.kneighbors(&features, 1).unwrap();
//! assert_eq!(neighbors[0].index, 1);
//! ```

pub mod artifacts;
pub mod encoder;
pub mod error;
pub mod knn;
pub mod pipeline;
pub mod regression;
pub mod scaler;

pub use artifacts::{load_artifact, save_artifact, ArtifactFormat};
pub use encoder::{HandleUnknown, MultiLabelBinarizer, OneHotEncoder};
pub use error::{ModelError, ModelResult};
pub use knn::KnnIndex;
pub use pipeline::{ModelBundle, NeighborPipeline, RegressionPipeline, RentalPipeline, ValuationModels};
pub use regression::{FeatureAlignedModel, LinearRegression};
pub use scaler::StandardScaler;

/// A fitted, stateless feature transformation.
pub trait Transform: Send + Sync {
    type Input: ?Sized;

    /// Width of the produced feature block
    fn output_dim(&self) -> usize;

    fn transform(&self, input: &Self::Input) -> ModelResult<Vec<f64>>;
}

/// A fitted model producing a single continuous value.
pub trait Regressor: Send + Sync {
    fn n_features(&self) -> usize;

    fn predict(&self, features: &[f64]) -> ModelResult<f64>;
}

/// One hit from a nearest-neighbor query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Row of the fitted matrix (and of the dataset it was fitted on)
    pub index: usize,
    pub distance: f64,
}

/// A fitted nearest-neighbor structure.
pub trait NeighborIndex: Send + Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `k` closest rows, nearest first.
    fn kneighbors(&self, query: &[f64], k: usize) -> ModelResult<Vec<Neighbor>>;
}
