//! Application state shared by the routers.

/// Configuration plus the PostgreSQL pool.
///
/// Cloning is cheap: the pool is reference-counted.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// PostgreSQL database connection pool
    pub db: database::postgres::DatabaseConnection,
}
