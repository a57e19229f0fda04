//! Reusable OpenAPI response types for consistent API documentation.

use super::{ErrorResponse, ValidationErrorResponse};
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Validation failed",
    content_type = "application/json",
    example = json!({
        "errors": {
            "name": ["The name field is required."],
            "is_active": ["The is active field must be true or false."]
        }
    })
)]
pub struct UnprocessableEntityResponse(pub ValidationErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({ "error": "Category not found" })
)]
pub struct NotFoundResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Malformed request body",
    content_type = "application/json",
    example = json!({ "error": "Failed to parse the request body as JSON" })
)]
pub struct BadRequestResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({ "error": "Database error: connection closed" })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Request body exceeds the route's size limit",
    content_type = "application/json",
    example = json!({ "error": "Failed to buffer the request body: length limit exceeded" })
)]
pub struct PayloadTooLargeResponse(pub ErrorResponse);
