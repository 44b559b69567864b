use std::path::PathBuf;

pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Errors raised by fitted artifacts at load or inference time
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("unknown category '{value}' in column {column}")]
    UnknownCategory { column: usize, value: String },

    #[error("model produced a non-finite value: {0}")]
    NonFinite(f64),

    #[error("expected n_neighbors <= n_samples, got n_neighbors={requested}, n_samples={available}")]
    TooManyNeighbors { requested: usize, available: usize },

    #[error("artifact not found: {0}")]
    MissingArtifact(PathBuf),

    #[error("failed to load {path}: {message}")]
    Load { path: PathBuf, message: String },

    #[error("invalid artifact: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ModelError> for estatex_core::Error {
    fn from(e: ModelError) -> Self {
        estatex_core::Error::Artifact(e.to_string())
    }
}
