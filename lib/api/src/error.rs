use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use estatex_core::Error;
use tracing::error;

/// Maps domain errors to `{"error": message}` responses.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError(Error::validation(message))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError(Error::not_found(message))
    }

    /// Client-facing message. Unexpected failures are wrapped as
    /// `Server error: ...`.
    pub fn message(&self) -> String {
        match &self.0 {
            Error::Validation(_)
            | Error::NotFound(_)
            | Error::Unauthenticated
            | Error::Inference { .. } => self.0.to_string(),
            other => format!("Server error: {}", other),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        HttpResponse::build(status).json(serde_json::json!({
            "error": self.message()
        }))
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError(Error::Unauthenticated).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError(Error::inference("KNN", "boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ApiError(Error::inference("Regression", "bad shape")).message(),
            "Regression inference failed: bad shape"
        );
        assert_eq!(
            ApiError(Error::Storage("disk full".into())).message(),
            "Server error: Storage error: disk full"
        );
        assert_eq!(ApiError(Error::Unauthenticated).message(), "User not logged in");
    }
}
