//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Default maximum connections for the pool.
/// Kept low for single-user tooling.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Create a PostgreSQL connection pool.
///
/// `connect_timeout` bounds how long acquiring a connection may take,
/// including the first one opened here.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool("postgres://localhost/docrecord", Duration::from_secs(2)).await?;
/// ```
pub async fn create_pool(
    database_url: &str,
    connect_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    create_pool_with_options(database_url, DEFAULT_MAX_CONNECTIONS, connect_timeout).await
}

/// Create a PostgreSQL connection pool with custom limits.
pub async fn create_pool_with_options(
    database_url: &str,
    max_connections: u32,
    connect_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(connect_timeout)
        .connect(database_url)
        .await
}
