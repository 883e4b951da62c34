//! Handler-boundary error mapping: every error a handler can raise is
//! caught here and rendered as a JSON body with a non-2xx status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use blacklist_reconciler::ReconcileError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed request body: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Reconcile(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "blacklist check_hash handler failed");
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
