use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Request field missing or malformed. Raised before any model call.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// A model stage failed while serving a request.
    #[error("{stage} inference failed: {message}")]
    Inference { stage: String, message: String },

    #[error("User not logged in")]
    Unauthenticated,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound(message.into())
    }

    pub fn inference(stage: impl Into<String>, message: impl ToString) -> Self {
        Error::Inference {
            stage: stage.into(),
            message: message.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
