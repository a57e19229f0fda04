use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use tracing::debug;

use crate::common::DatabaseError;

/// Check that the pool can reach PostgreSQL by running `SELECT 1`.
///
/// # Arguments
/// * `db` - Database connection
///
/// # Returns
/// `Ok(())` when the query answers, [`DatabaseError::Unhealthy`] carrying the
/// driver message otherwise.
///
/// # Example
/// ```ignore
/// use database::postgres::check_health;
///
/// if check_health(&db).await.is_err() {
///     tracing::warn!("database unreachable");
/// }
/// ```
pub async fn check_health(db: &DatabaseConnection) -> Result<(), DatabaseError> {
    let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1".to_owned());
    db.query_one_raw(stmt)
        .await
        .map_err(|e| DatabaseError::Unhealthy(e.to_string()))?;

    debug!("PostgreSQL health check passed");
    Ok(())
}
