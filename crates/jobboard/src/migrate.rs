//! Schema migrations via [`refinery`].
//!
//! The SQL files under `migrations/` are embedded at compile time and applied
//! in version order. Applied versions are recorded in
//! `refinery_schema_history`, so running again is a no-op.

use crate::error::JobResult;

pub use refinery::Report;

mod embedded {
    refinery::embed_migrations!("./migrations");
}

/// Run all pending migrations on a single PostgreSQL connection.
pub async fn run(client: &mut tokio_postgres::Client) -> JobResult<Report> {
    let report = embedded::migrations::runner().run_async(client).await?;
    tracing::info!(
        target: "jobboard.migrate",
        applied = report.applied_migrations().len(),
        "migrations complete"
    );
    Ok(report)
}

/// Acquire a connection from a pool and run migrations on it.
pub async fn run_pool(pool: &deadpool_postgres::Pool) -> JobResult<Report> {
    let mut client = pool.get().await?;
    run(&mut client).await
}

/// Names of the embedded migrations, in version order.
pub fn embedded_names() -> Vec<String> {
    let mut migrations = embedded::migrations::runner().get_migrations().to_vec();
    migrations.sort_by_key(|m| m.version());
    migrations.iter().map(|m| m.name().to_string()).collect()
}
