use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Service-level errors for the analytics endpoints
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Caller has no profile row in the store
    #[error("User profile not found")]
    ProfileNotFound,

    /// Invalid query parameters
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Database error; the whole request fails, no partial aggregation
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Error response structure for API responses
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl From<validator::ValidationErrors> for AnalyticsError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AnalyticsError::ValidationError(errors.to_string())
    }
}

impl IntoResponse for AnalyticsError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            AnalyticsError::ProfileNotFound => (
                StatusCode::FORBIDDEN,
                "PROFILE_NOT_FOUND",
                "User profile not found".to_string(),
            ),
            AnalyticsError::ValidationError(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg)
            }
            AnalyticsError::DatabaseError(e) => {
                // Full detail stays in the log; the client gets a generic body
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Failed to generate consumption report".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
