//! Connection pool utilities

use crate::config::DatabaseConfig;
use crate::error::{JobError, JobResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

/// Create a connection pool from a [`DatabaseConfig`].
///
/// Uses `NoTls` and fast recycling. A configured statement timeout is applied
/// per connection through the `statement_timeout` session option.
///
/// # Example
///
/// ```ignore
/// let pool = jobboard::create_pool(&DatabaseConfig::from_env()?)?;
/// let client = pool.get().await?;
/// ```
pub fn create_pool(config: &DatabaseConfig) -> JobResult<Pool> {
    let mut pg_config: tokio_postgres::Config = config
        .url
        .parse()
        .map_err(|e: tokio_postgres::Error| JobError::Connection(e.to_string()))?;

    if let Some(ms) = config.statement_timeout_ms {
        pg_config.options(&format!("-c statement_timeout={ms}"));
    }

    let mgr = Manager::from_config(pg_config, NoTls, default_manager_config());
    Pool::builder(mgr)
        .max_size(config.pool_size)
        .build()
        .map_err(|e| JobError::Pool(e.to_string()))
}

fn default_manager_config() -> ManagerConfig {
    ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    }
}
