pub mod models;
pub mod repositories;
pub mod schema;

pub mod mock;

use std::time::Duration;

use eyre::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

pub type DbPool = Pool<Postgres>;

pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Pool that connects on first use. An unreachable store then shows up as
/// failed queries, which the repositories answer from the local cache.
pub fn create_lazy_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect_lazy(database_url)?;

    Ok(pool)
}
