//! Integer path parameter extractor.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

/// Extractor for integer `{id}` path parameters.
///
/// An id that is not an integer cannot match any row, so it is rejected
/// with 404 rather than 400.
///
/// # Example
/// ```ignore
/// async fn get_one(IdPath(id): IdPath) -> String {
///     format!("Category {}", id)
/// }
///
/// let app = Router::new().route("/get-one/{id}", get(get_one));
/// ```
pub struct IdPath(pub i32);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        raw.trim()
            .parse::<i32>()
            .map(IdPath)
            .map_err(|_| AppError::NotFound("Resource not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::{Request, StatusCode}, routing::get};
    use tower::ServiceExt;

    async fn echo(IdPath(id): IdPath) -> String {
        id.to_string()
    }

    #[tokio::test]
    async fn test_integer_id_is_extracted() {
        let app = Router::new().route("/items/{id}", get(echo));
        let response = app
            .oneshot(Request::get("/items/42").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_non_integer_id_is_not_found() {
        let app = Router::new().route("/items/{id}", get(echo));
        let response = app
            .oneshot(Request::get("/items/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
