use axum::{Router, routing::get};
use axum_helpers::server::{create_router, health_router};
use domain_catalog::{
    CategoryService, LocalImageStore, PgCategoryRepository, PgProductRepository, ProductService,
    UPLOADS_ROUTE,
};
use tower_http::services::ServeDir;

use crate::openapi::ApiDoc;
use crate::state::AppState;

pub mod health;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix will be added by the `create_router` helper.
pub fn routes(state: &AppState) -> Router {
    let categories = CategoryService::new(PgCategoryRepository::new(state.db.clone()));
    let products = ProductService::new(
        PgProductRepository::new(state.db.clone()),
        LocalImageStore::new(state.config.uploads.clone()),
    );

    domain_catalog::handlers::router(categories, products)
}

/// Top-level routes:
/// - /health: liveness with app name/version
/// - /ready: database ping
/// - /uploads/products/*: stored product images
pub fn root_routes(state: &AppState) -> Router {
    Router::new()
        .merge(health_router(state.config.app))
        .merge(ready_router(state.clone()))
        .nest_service(UPLOADS_ROUTE, ServeDir::new(&state.config.uploads.dir))
}

pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

/// The complete application: API, probes, static images and docs.
pub fn app(state: &AppState) -> std::io::Result<Router> {
    create_router::<ApiDoc>(routes(state), root_routes(state), &state.config.server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use core_config::{app_info, server::ServerConfig};
    use database::postgres::PostgresConfig;
    use domain_catalog::UploadConfig;
    use http_body_util::BodyExt;
    use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, Value};
    use std::collections::BTreeMap;
    use tower::ServiceExt;

    fn state(upload_dir: &std::path::Path) -> AppState {
        state_with_db(
            upload_dir,
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        )
    }

    fn state_with_db(upload_dir: &std::path::Path, db: DatabaseConnection) -> AppState {
        AppState {
            config: Config {
                app: app_info!(),
                database: PostgresConfig::new("postgres://catalog@localhost/catalog"),
                server: ServerConfig::default(),
                environment: Environment::Development,
                uploads: UploadConfig::new(upload_dir, "http://localhost:8080"),
                run_migrations: false,
            },
            db,
        }
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_health_reports_app_info() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&state(dir.path())).unwrap();

        let (status, body) = get(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        let body = String::from_utf8(body).unwrap();
        assert!(body.contains("catalog_api"), "{body}");
    }

    #[tokio::test]
    async fn test_serves_stored_images() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1_lamp.png"), b"PNG").unwrap();
        let app = app(&state(dir.path())).unwrap();

        let (status, body) = get(app, "/uploads/products/1_lamp.png").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"PNG");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&state(dir.path())).unwrap();

        let (status, body) = get(app, "/api/nothing-here").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            String::from_utf8(body).unwrap(),
            r#"{"error":"Route not found"}"#
        );
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&state(dir.path())).unwrap();

        let (status, body) = get(app, "/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        let body = String::from_utf8(body).unwrap();
        assert!(body.contains("/product/get-all"));
    }

    #[tokio::test]
    async fn test_ready_when_database_answers() {
        let dir = tempfile::tempdir().unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([("one", Value::Int(Some(1)))])]])
            .into_connection();
        let app = app(&state_with_db(dir.path(), db)).unwrap();

        let (status, body) = get(app, "/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("connected"));
    }

    #[tokio::test]
    async fn test_not_ready_when_database_fails() {
        let dir = tempfile::tempdir().unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection refused".into())])
            .into_connection();
        let app = app(&state_with_db(dir.path(), db)).unwrap();

        let (status, body) = get(app, "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(String::from_utf8(body).unwrap().contains("disconnected"));
    }
}
