use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use tunecheck_common::TunecheckError;

/// Error bodies are always `{ "error": ..., "details"?: ... }`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Rate limit exceeded, try again later")]
    RateLimited,

    #[error("{error}")]
    Internal {
        error: String,
        details: Option<String>,
    },
}

impl From<TunecheckError> for ApiError {
    fn from(err: TunecheckError) -> Self {
        if err.is_client_error() {
            return ApiError::BadRequest(err.to_string());
        }
        let details = err.details();
        let error = if matches!(err, TunecheckError::AllSourcesFailed { .. }) {
            err.to_string()
        } else {
            format!("Analysis failed: {err}")
        };
        ApiError::Internal { error, details }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(error) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error,
                    details: None,
                },
            ),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorBody {
                    error: ApiError::RateLimited.to_string(),
                    details: None,
                },
            ),
            ApiError::Internal { error, details } => {
                error!(error = %error, details = ?details, "Analysis failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody { error, details },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
