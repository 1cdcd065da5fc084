//! Type-safe error codes for API responses.
//!
//! Each code carries:
//! - String representation for log fields (e.g., "VALIDATION_ERROR")
//! - Integer code for logging and monitoring (e.g., 1001)
//! - Default human-readable message
//!
//! # Example
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standardized error codes attached to every error log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request was rejected with a caller-supplied message
    BadRequest,

    /// One or more field rules failed
    ValidationError,

    /// JSON extraction from request body failed
    JsonExtraction,

    /// Requested resource or route was not found
    NotFound,

    /// An unexpected internal server error occurred
    InternalError,

    // Database errors (2000-2999)
    /// Database connection or query error
    DatabaseError,
}

impl ErrorCode {
    /// Returns the string identifier used in structured logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::JsonExtraction => "JSON_EXTRACTION",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
        }
    }

    /// Returns the integer error code for monitoring.
    pub fn code(&self) -> i32 {
        match self {
            ErrorCode::BadRequest => 1000,
            ErrorCode::ValidationError => 1001,
            ErrorCode::JsonExtraction => 1003,
            ErrorCode::NotFound => 1004,
            ErrorCode::InternalError => 1005,
            ErrorCode::DatabaseError => 2003,
        }
    }

    /// Returns the message sent to clients when no more specific one applies.
    ///
    /// Server-side failures never expose their details, so both server
    /// codes share the generic message.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "Bad Request",
            ErrorCode::ValidationError => "Validation failed",
            ErrorCode::JsonExtraction => "Invalid JSON body",
            ErrorCode::NotFound => "Not Found",
            ErrorCode::InternalError | ErrorCode::DatabaseError => "Server Error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_string_representation() {
        assert_eq!(ErrorCode::ValidationError.as_str(), "VALIDATION_ERROR");
        assert_eq!(ErrorCode::NotFound.as_str(), "NOT_FOUND");
        assert_eq!(ErrorCode::DatabaseError.as_str(), "DATABASE_ERROR");
    }

    #[test]
    fn test_error_code_integer_codes() {
        assert_eq!(ErrorCode::BadRequest.code(), 1000);
        assert_eq!(ErrorCode::NotFound.code(), 1004);
        assert_eq!(ErrorCode::DatabaseError.code(), 2003);
    }

    #[test]
    fn test_server_errors_share_generic_message() {
        assert_eq!(ErrorCode::InternalError.default_message(), "Server Error");
        assert_eq!(ErrorCode::DatabaseError.default_message(), "Server Error");
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::JsonExtraction.to_string(), "JSON_EXTRACTION");
    }

    #[test]
    fn test_error_code_serde() {
        let json = serde_json::to_string(&ErrorCode::ValidationError).unwrap();
        assert_eq!(json, "\"VALIDATION_ERROR\"");

        let code: ErrorCode = serde_json::from_str("\"NOT_FOUND\"").unwrap();
        assert_eq!(code, ErrorCode::NotFound);
    }
}
