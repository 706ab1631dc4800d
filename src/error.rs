/// Unified error types for the Atelier API
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Validation errors (missing/invalid input)
    #[error("{0}")]
    Validation(String),

    /// Upload rejected by the file-type allow-list
    #[error("{0}")]
    UnsupportedFileType(String),

    /// Not found errors
    #[error("{0}")]
    NotFound(String),

    /// Asset storage errors
    #[error("Asset storage error: {0}")]
    AssetStorage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body
///
/// Client errors carry `{message}` only; server errors additionally carry
/// an `error` code while the underlying cause stays in the server log.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, error_code) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            ApiError::UnsupportedFileType(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            ApiError::Database(_)
            | ApiError::Io(_)
            | ApiError::AssetStorage(_)
            | ApiError::Internal(_) => {
                // Don't leak details to the client
                tracing::error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some("InternalServerError".to_string()),
                )
            }
        };

        let body = Json(ErrorResponse {
            message,
            error: error_code,
        });

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_400_class() {
        let resp = ApiError::Validation("Title is required".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ApiError::UnsupportedFileType("Invalid image file type".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ApiError::NotFound("Article abc not found".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_server_errors_map_to_500() {
        let resp = ApiError::AssetStorage("disk full".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = ApiError::Internal("boom".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_body_shape() {
        let body = ErrorResponse {
            message: "Invalid image file type".into(),
            error: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"message": "Invalid image file type"})
        );

        let body = ErrorResponse {
            message: "Internal server error".into(),
            error: Some("InternalServerError".into()),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "InternalServerError");
    }
}
