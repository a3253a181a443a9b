use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

use crate::db::DbProvider;
use crate::error::DbResult;
use gateway_core::config::DatabaseConfig;

pub type DbPool = Pool<AsyncPgConnection>;
pub type DbConnection<'pool> = PooledConnection<'pool, AsyncPgConnection>;

/// How long a request may wait for a pooled connection before giving up.
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(10);

/// Idle connections are recycled after this long so a quiet gateway does not
/// pin Postgres sessions overnight.
const IDLE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// ## Summary
/// Builds the connection pool from the database configuration. Connections
/// are validated on checkout so a request never receives a session Postgres
/// has already closed.
///
/// ## Errors
/// Returns an error if the pool cannot be built against the configured URL.
#[tracing::instrument(skip(config), fields(pool_size = config.max_connections))]
pub async fn create_pool(config: &DatabaseConfig) -> anyhow::Result<DbPool> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.url);

    let pool = Pool::builder()
        .max_size(u32::from(config.max_connections))
        .connection_timeout(CHECKOUT_TIMEOUT)
        .idle_timeout(Some(IDLE_TIMEOUT))
        .test_on_check_out(true)
        .build(manager)
        .await?;

    tracing::info!(
        pool_size = config.max_connections,
        "Database connection pool ready"
    );

    Ok(pool)
}

impl DbProvider for DbPool {
    fn get_connection<'a>(
        &'a self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = DbResult<DbConnection<'a>>> + Send + 'a>>
    {
        Box::pin(async move { Ok(self.get().await?) })
    }
}
