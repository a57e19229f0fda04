use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use super::PostgresConfig;
use crate::common::{DatabaseError, DatabaseResult, RetryConfig, retry_with_backoff};

/// Open a pool with explicit options.
///
/// # Arguments
/// * `options` - sea-orm connect options, usually from [`PostgresConfig::into_connect_options`]
pub async fn connect_with_options(options: ConnectOptions) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(options).await?;
    info!("Connected to PostgreSQL");
    Ok(db)
}

/// Open a pool from a [`PostgresConfig`].
///
/// The URL is logged with its password redacted.
///
/// # Example
/// ```ignore
/// use database::postgres::{PostgresConfig, connect_from_config};
///
/// let db = connect_from_config(PostgresConfig::new("postgres://catalog@localhost/catalog")).await?;
/// ```
pub async fn connect_from_config(config: PostgresConfig) -> Result<DatabaseConnection, DbErr> {
    info!(url = %config.redacted_url(), "Connecting to PostgreSQL");
    connect_with_options(config.into_connect_options()).await
}

/// Open a pool, retrying with exponential backoff.
///
/// Meant for startup, where the database container may still be coming up.
///
/// # Arguments
/// * `config` - Pool settings
/// * `retry_config` - Backoff policy; `None` uses [`RetryConfig::default`]
///
/// # Returns
/// The pool, or the error of the final attempt.
///
/// # Example
/// ```ignore
/// use database::postgres::{PostgresConfig, connect_from_config_with_retry};
///
/// let config = PostgresConfig::new(std::env::var("DATABASE_URL")?);
/// let db = connect_from_config_with_retry(config, None).await?;
/// ```
pub async fn connect_from_config_with_retry(
    config: PostgresConfig,
    retry_config: Option<RetryConfig>,
) -> Result<DatabaseConnection, DbErr> {
    info!(url = %config.redacted_url(), "Connecting to PostgreSQL");
    let options = config.into_connect_options();

    retry_with_backoff(
        || connect_with_options(options.clone()),
        retry_config.unwrap_or_default(),
    )
    .await
}

/// Apply all pending migrations of `M`.
///
/// # Arguments
/// * `db` - Database connection
/// * `app_name` - Name of the app for logging (e.g., "catalog_api")
///
/// # Returns
/// [`DatabaseError::Migration`] when a migration fails; errors listing the
/// pending set come through as [`DatabaseError::Postgres`].
///
/// # Example
/// ```ignore
/// use migration::Migrator;
/// use database::postgres::run_migrations;
///
/// run_migrations::<Migrator>(&db, "catalog_api").await?;
/// ```
pub async fn run_migrations<M: MigratorTrait>(
    db: &DatabaseConnection,
    app_name: &str,
) -> DatabaseResult<()> {
    let pending = M::get_pending_migrations(db).await?.len();
    info!(app = app_name, pending, "Running database migrations");

    M::up(db, None)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    info!(app = app_name, "Migrations completed");
    Ok(())
}
