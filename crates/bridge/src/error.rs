//! Unified error handling for the bridge.
//!
//! Every endpoint answers with a JSON body carrying a `status` field and one
//! of the HTTP codes {200, 400, 404, 500}. Workflow gates (invalid code,
//! duplicate order, upstream refusal) are client-visible 400s with their
//! exact message; database and unexpected errors are opaque 500s.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::shopify::ShopifyError;

/// Application-level error type for the bridge.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed input (webhook payload, request body).
    #[error("{0}")]
    Validation(String),

    /// A lookup against our own records came up empty. Workflow gates
    /// answer 400 (the webhook sender cannot fix a 404 by retrying a
    /// different URL); the public validate endpoint builds its own 404.
    #[error("{0}")]
    NotFound(String),

    /// The operation was already performed (duplicate webhook delivery).
    #[error("{0}")]
    Conflict(String),

    /// A remote store call on the critical path failed.
    #[error("{0}")]
    Upstream(String),

    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wrap a store-client failure with a step-specific message, keeping the
    /// source in the logs.
    pub fn upstream(message: impl Into<String>, source: &ShopifyError) -> Self {
        let message = message.into();
        tracing::error!(error = %source, "{message}");
        Self::Upstream(message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Bridge request error"
            );
        }

        let status = match &self {
            Self::Validation(_)
            | Self::NotFound(_)
            | Self::Conflict(_)
            | Self::Upstream(_)
            | Self::InvalidSignature => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) => "Database error".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        let body = Json(json!({ "status": "failure", "message": message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::Conflict(
            "Draft order already exists for this merchant order ID: 42".to_string(),
        );
        assert_eq!(
            err.to_string(),
            "Draft order already exists for this merchant order ID: 42"
        );

        assert_eq!(AppError::InvalidSignature.to_string(), "Invalid signature");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            status_of(AppError::Validation("missing".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Conflict("dup".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Upstream("Failed to place order on hold".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::InvalidSignature),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::NotFound("customer".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let response = AppError::Internal("connection pool exhausted".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // Body is rebuilt from the redacted message, not the source error.
        let err = AppError::Internal("connection pool exhausted".into());
        assert!(err.to_string().contains("connection pool exhausted"));
    }
}
