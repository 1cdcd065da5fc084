pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Standard error response structure.
///
/// Every failure is reported as a list of human-readable messages:
///
/// ```json
/// { "errors": ["First Name is required", "Email ID is required"] }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// One message per failed rule, in a stable order
    pub errors: Vec<String>,
}

impl ErrorResponse {
    pub fn new(errors: Vec<String>) -> Self {
        Self { errors }
    }

    pub fn single(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }
}

/// Application error type that can be converted to HTTP responses.
///
/// Server-side variants carry details for the logs only; the client always
/// receives the generic message for their code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::JsonExtractorRejection(_)
            | AppError::Validation(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::JsonExtractorRejection(_) => ErrorCode::JsonExtraction,
            AppError::Validation(_) => ErrorCode::ValidationError,
            AppError::BadRequest(_) => ErrorCode::BadRequest,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::InternalServerError(_) => ErrorCode::InternalError,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let errors = match self {
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(
                    error_code = code.code(),
                    "JSON extraction error: {:?}",
                    e
                );
                vec![e.body_text()]
            }
            AppError::Validation(messages) => {
                tracing::info!(
                    error_code = code.code(),
                    "Validation error: {:?}",
                    messages
                );
                messages
            }
            AppError::BadRequest(msg) => {
                tracing::info!(error_code = code.code(), "Bad request: {}", msg);
                vec![msg]
            }
            AppError::NotFound(msg) => {
                tracing::info!(error_code = code.code(), "Not found: {}", msg);
                vec![msg]
            }
            AppError::Database(details) => {
                tracing::error!(error_code = code.code(), "Database error: {}", details);
                vec![code.default_message().to_string()]
            }
            AppError::InternalServerError(details) => {
                tracing::error!(
                    error_code = code.code(),
                    "Internal server error: {}",
                    details
                );
                vec![code.default_message().to_string()]
            }
        };

        (status, Json(ErrorResponse::new(errors))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    async fn render(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_error_lists_every_message() {
        let (status, body) = render(AppError::Validation(vec![
            "First Name is required".to_string(),
            "Address is required".to_string(),
        ]))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "errors": ["First Name is required", "Address is required"] })
        );
    }

    #[tokio::test]
    async fn test_bad_request_and_not_found() {
        let (status, body) = render(AppError::BadRequest("Email already exists".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "errors": ["Email already exists"] }));

        let (status, body) = render(AppError::NotFound("User not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "errors": ["User not found"] }));
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let (status, body) = render(AppError::Database("connection refused".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "errors": ["Server Error"] }));

        let (status, body) = render(AppError::InternalServerError("boom".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "errors": ["Server Error"] }));
    }

    #[test]
    fn test_error_codes_per_variant() {
        assert_eq!(
            AppError::Validation(vec![]).code(),
            ErrorCode::ValidationError
        );
        assert_eq!(
            AppError::Database(String::new()).code(),
            ErrorCode::DatabaseError
        );
    }
}
