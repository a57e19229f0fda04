//! PostgreSQL connectivity for the catalog services.
//!
//! - `postgres`: pool configuration, connecting with retry, migrations, health checks
//! - `common`: the shared error type and retry helpers
//!
//! # Features
//!
//! - `config` - `core_config::FromEnv` support for [`postgres::PostgresConfig`]
//!
//! # Example
//!
//! ```ignore
//! use database::postgres::{self, PostgresConfig};
//! use migration::Migrator;
//!
//! let db = postgres::connect_from_config_with_retry(PostgresConfig::new(url), None).await?;
//! postgres::run_migrations::<Migrator>(&db, "catalog_api").await?;
//! ```

pub mod common;
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult};
