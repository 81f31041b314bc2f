//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and JSON error bodies. Errors
//! reported by the hosted backend keep their message verbatim so the user
//! sees exactly what the backend said.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use coachline_core::errors::CoachError;
use coachline_remote::RemoteError;
use serde_json::json;
use tracing::error;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use coachline_api::middleware::error_handling::AppError;
/// use coachline_core::errors::CoachError;
///
/// async fn handler(content: String) -> Result<Json<String>, AppError> {
///     if content.trim().is_empty() {
///         return Err(AppError(CoachError::Validation("Message cannot be empty".into())));
///     }
///     Ok(Json(content))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub CoachError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CoachError::NotFound(_) => StatusCode::NOT_FOUND,
            CoachError::Validation(_) => StatusCode::BAD_REQUEST,
            CoachError::Authentication(_) => StatusCode::UNAUTHORIZED,
            CoachError::Authorization(_) => StatusCode::FORBIDDEN,
            CoachError::Conflict(_) => StatusCode::CONFLICT,
            // Client errors from the backend pass through; anything else is
            // the backend failing.
            CoachError::Remote { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(StatusCode::is_client_error)
                .unwrap_or(StatusCode::BAD_GATEWAY),
            CoachError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }

        let message = self.0.to_string();
        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

impl From<CoachError> for AppError {
    fn from(err: CoachError) -> Self {
        AppError(err)
    }
}

impl From<RemoteError> for AppError {
    fn from(err: RemoteError) -> Self {
        AppError(err.into())
    }
}

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(CoachError::Internal(err))
    }
}
