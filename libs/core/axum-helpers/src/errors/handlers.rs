use axum::response::{IntoResponse, Response};

use super::AppError;

/// Router fallback for unknown paths.
pub async fn not_found() -> Response {
    AppError::NotFound("Route not found".to_string()).into_response()
}
