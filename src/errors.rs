//! Rental API error types.
//!
//! Every failure a service can produce is a [`RentalError`].  The enum
//! implements [`axum::response::IntoResponse`] so handlers can simply
//! return `Err(RentalError::NotFound { .. })` and the caller receives a
//! status code plus a `{"error": kind, "message": text}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Generate a 16-character hex request ID.
pub fn generate_request_id() -> String {
    let bytes: [u8; 8] = rand::random();
    hex::encode(bytes).to_uppercase()
}

/// Failure kinds surfaced by the car catalog and booking services.
#[derive(Debug, Error)]
pub enum RentalError {
    /// A required field or image is missing, or a value is malformed.
    #[error("{message}")]
    Validation { message: String },

    /// The request body went past `server.max_upload_size`.
    #[error("Upload exceeds the {limit}-byte limit")]
    TooLarge { limit: usize },

    /// The targeted row does not exist.
    #[error("{entity} with id {id} was not found")]
    NotFound { entity: &'static str, id: i64 },

    /// No stored image under this key.
    #[error("Image {key} was not found")]
    MissingObject { key: String },

    /// Reserved for write conflicts.
    #[error("{message}")]
    Conflict { message: String },

    /// The relational store failed.
    #[error("Database operation failed")]
    Database(#[source] anyhow::Error),

    /// The object store failed.
    #[error("Image storage operation failed")]
    ObjectStorage(#[source] anyhow::Error),
}

/// JSON body returned for every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Error kind: `ValidationError`, `NotFound`, `ConflictError` or `StoreError`.
    pub error: String,
    /// Human-readable description.
    pub message: String,
}

impl RentalError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        RentalError::Validation {
            message: message.into(),
        }
    }

    /// Return the error kind string placed in the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            RentalError::Validation { .. } | RentalError::TooLarge { .. } => "ValidationError",
            RentalError::NotFound { .. } | RentalError::MissingObject { .. } => "NotFound",
            RentalError::Conflict { .. } => "ConflictError",
            RentalError::Database(_) => "StoreError",
            RentalError::ObjectStorage(_) => "StoreError",
        }
    }

    /// Return the appropriate HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RentalError::Validation { .. } => StatusCode::BAD_REQUEST,
            RentalError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RentalError::NotFound { .. } | RentalError::MissingObject { .. } => {
                StatusCode::NOT_FOUND
            }
            RentalError::Conflict { .. } => StatusCode::CONFLICT,
            RentalError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RentalError::ObjectStorage(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Build the response body without consuming the error.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.code().to_string(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for RentalError {
    fn into_response(self) -> Response {
        match &self {
            RentalError::Database(source) => {
                tracing::error!("Database error: {:#}", source);
            }
            RentalError::ObjectStorage(source) => {
                tracing::error!("Object storage error: {:#}", source);
            }
            RentalError::Validation { message } => {
                tracing::warn!("Validation error: {}", message);
            }
            RentalError::TooLarge { limit } => {
                tracing::warn!("Upload rejected: body over {} bytes", limit);
            }
            RentalError::NotFound { entity, id } => {
                tracing::warn!("{} {} not found", entity, id);
            }
            RentalError::MissingObject { key } => {
                tracing::debug!("Image {} not found", key);
            }
            RentalError::Conflict { message } => {
                tracing::warn!("Conflict: {}", message);
            }
        }

        (self.status_code(), Json(self.body())).into_response()
    }
}
