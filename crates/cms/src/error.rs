//! Unified error handling for the CMS API.
//!
//! The HTTP contract the editor frontends were written against is unusual:
//! validation and lookup failures are *successful* HTTP exchanges carrying
//! `{"success": false, "message": ...}` with status 200. Only a malformed
//! request (missing/unknown action, broken multipart body) is a 400, and
//! only an I/O failure underneath the store is a 500.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Application-level error type for the CMS API.
#[derive(Debug, Error)]
pub enum AppError {
    /// The request carried no `action` parameter.
    #[error("No action specified")]
    MissingAction,

    /// The `action` parameter names no known operation.
    #[error("Invalid action: {0}")]
    UnknownAction(String),

    /// The multipart body could not be read.
    #[error("Malformed request body: {0}")]
    Multipart(#[from] MultipartError),

    /// A catalog store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingAction | Self::UnknownAction(_) | Self::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Store(store) => {
                if store.is_io() {
                    StatusCode::INTERNAL_SERVER_ERROR
                } else {
                    // Domain failures keep the 200 envelope.
                    StatusCode::OK
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status() == StatusCode::INTERNAL_SERVER_ERROR {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "CMS request error"
            );
        }

        let body = json!({
            "success": false,
            "message": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}
