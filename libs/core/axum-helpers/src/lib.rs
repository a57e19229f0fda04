//! # Axum Helpers
//!
//! Shared HTTP plumbing for the catalog services.
//!
//! - **[`errors`]**: `AppError` and the JSON error envelopes
//!   (`{"error": ..}` and the 422 `{"errors": {field: [..]}}`)
//! - **[`extractors`]**: `FormInput` (JSON, urlencoded or multipart fields and files)
//!   and `IdPath`
//! - **[`http`]**: CORS and security headers
//! - **[`server`]**: router assembly with OpenAPI UIs, health probes, graceful shutdown

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use errors::{AppError, ErrorResponse, ValidationErrorResponse, field_messages};
pub use extractors::{FormInput, IdPath, UploadedFile};
pub use http::{create_cors_layer, security_headers};
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};
