//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and
//! domain records. Row structs (`models.rs`) and table definitions
//! (`schema.rs`) stay private to this module. Connections come from a
//! `bb8` pool driven by `diesel-async`.
//!
//! # Example
//!
//! ```ignore
//! use listshare::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/listshare")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_list_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_list_repository::DieselListRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

/// Migrations shipped with the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply pending migrations over a blocking connection.
///
/// Call from `spawn_blocking` when running inside an async runtime.
pub fn run_migrations(database_url: &str) -> Result<usize, PoolError> {
    use diesel::Connection;
    use diesel::pg::PgConnection;

    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| PoolError::build(format!("migration connection: {err}")))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map(|applied| applied.len())
        .map_err(|err| PoolError::build(format!("migration failed: {err}")))
}
