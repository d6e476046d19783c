use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

use crate::config::Config;

/// Pool settings for the discussion store. The minimum never exceeds the
/// maximum, whatever the environment says.
pub fn pool_options(config: &Config) -> PgPoolOptions {
    let max_connections = config.database_max_connections.max(1);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(config.database_min_connections.min(max_connections))
        .acquire_timeout(Duration::from_secs(config.database_acquire_timeout_seconds))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
}

pub async fn create_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    let pool = pool_options(config).connect(&config.database_url).await?;

    tracing::debug!(
        max_connections = config.database_max_connections,
        min_connections = config.database_min_connections,
        "Postgres pool connected"
    );

    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
