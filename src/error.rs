use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{models::ErrorBody, validation::ValidationError};

/// ApiError
///
/// Failures talking to an external collaborator. `Status` carries the best-effort
/// message pulled from the response body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Rejected(String),

    #[error("Server returned invalid data")]
    Decode(#[source] serde_json::Error),

    #[error("Authentication failed: No token received")]
    MissingToken,
}

/// AppError
///
/// Everything a portal handler can fail with. Converted into a JSON `{ "error": .. }`
/// response with a matching status code.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not signed in")]
    Unauthorized,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Upstream(#[from] ApiError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Upstream(ApiError::Status { status, .. }) => StatusCode::from_u16(*status)
                .ok()
                .filter(StatusCode::is_client_error)
                .unwrap_or(StatusCode::BAD_GATEWAY),
            AppError::Upstream(ApiError::Rejected(_) | ApiError::MissingToken) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Upstream collaborator failed");
        }

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
