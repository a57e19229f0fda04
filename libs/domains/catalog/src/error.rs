use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Category {0} not found")]
    CategoryNotFound(i32),

    #[error("Product {0} not found")]
    ProductNotFound(i32),

    /// A uniqueness rule was violated by the store after validation passed.
    #[error("Duplicate record: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<DbErr> for CatalogError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => CatalogError::Conflict(detail),
            _ => CatalogError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Storage(err.to_string())
    }
}

/// Convert CatalogError to AppError for standardized error responses
impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(errors) => AppError::Validation(errors),
            CatalogError::CategoryNotFound(_) => AppError::NotFound("Category not found".to_string()),
            CatalogError::ProductNotFound(_) => AppError::NotFound("Product not found".to_string()),
            CatalogError::Conflict(msg) => AppError::InternalServerError(msg),
            CatalogError::Storage(msg) => {
                AppError::InternalServerError(format!("Failed to store the image: {}", msg))
            }
            CatalogError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_not_found_maps_to_404() {
        let response = CatalogError::ProductNotFound(7).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_is_a_write_failure() {
        let response = CatalogError::Conflict("products_name_key".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_generic_db_error_is_internal() {
        let err = CatalogError::from(DbErr::Custom("boom".into()));
        assert!(matches!(err, CatalogError::Internal(msg) if msg.contains("boom")));
    }
}
