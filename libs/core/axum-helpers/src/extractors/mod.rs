//! Custom extractors for Axum handlers.
//!
//! Extractors here reject with [`crate::AppError`] so that malformed requests
//! share the same `{"errors": [..]}` body as every other failure.

pub mod json_body;

pub use json_body::JsonBody;
