//! `tracing` instrumentation for SQL execution.
//!
//! [`TracedClient`] wraps any [`GenericClient`] and emits one event per
//! statement (target `jobboard.sql`) with the statement tag, kind, parameter
//! count, elapsed time and the SQL text. Failed statements are logged at
//! `WARN` regardless of the configured level.
//!
//! ```rust,ignore
//! use jobboard::{TracedClient, models::Job};
//!
//! let client = TracedClient::new(pool.get().await?).slow_query_threshold(Duration::from_millis(200));
//! let jobs = Job::find_all(&client, &filter).await?;
//! ```

use crate::client::GenericClient;
use crate::error::JobResult;
use std::time::{Duration, Instant};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::Level;

/// The type of SQL operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

impl QueryType {
    /// Detect query type from the leading keyword of a SQL string.
    pub fn from_sql(sql: &str) -> Self {
        let keyword = sql
            .trim_start()
            .split(|c: char| !c.is_ascii_alphabetic())
            .next()
            .unwrap_or("");

        if keyword.eq_ignore_ascii_case("SELECT") {
            QueryType::Select
        } else if keyword.eq_ignore_ascii_case("INSERT") {
            QueryType::Insert
        } else if keyword.eq_ignore_ascii_case("UPDATE") {
            QueryType::Update
        } else if keyword.eq_ignore_ascii_case("DELETE") {
            QueryType::Delete
        } else {
            QueryType::Other
        }
    }
}

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// A client wrapper that logs every statement through `tracing`.
#[derive(Debug, Clone)]
pub struct TracedClient<C> {
    client: C,
    level: Level,
    max_sql_length: Option<usize>,
    slow_query_threshold: Option<Duration>,
}

impl<C: GenericClient> TracedClient<C> {
    /// Wrap `client`, logging at `DEBUG` with SQL truncated to 200 bytes.
    pub fn new(client: C) -> Self {
        Self {
            client,
            level: Level::DEBUG,
            max_sql_length: Some(200),
            slow_query_threshold: None,
        }
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Statements slower than `threshold` are additionally logged at `WARN`.
    pub fn slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    /// Get a reference to the inner client.
    pub fn inner(&self) -> &C {
        &self.client
    }

    /// Get the inner client, consuming this wrapper.
    pub fn into_inner(self) -> C {
        self.client
    }

    fn display_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)).into(),
            _ => sql.into(),
        }
    }

    fn record<T>(
        &self,
        tag: &str,
        sql: &str,
        param_count: usize,
        started: Instant,
        result: &JobResult<T>,
        rows: impl FnOnce(&T) -> u64,
    ) {
        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let elapsed = started.elapsed();
        let elapsed_ms = elapsed.as_millis() as u64;
        let query_type = QueryType::from_sql(sql);
        let sql = self.display_sql(sql);

        match result {
            Ok(value) => {
                let rows = rows(value);
                emit_at_level!(
                    self.level,
                    target: "jobboard.sql",
                    query_type = ?query_type,
                    tag,
                    param_count,
                    rows,
                    elapsed_ms,
                    sql = %sql,
                );
                if self.slow_query_threshold.is_some_and(|t| elapsed > t) {
                    tracing::warn!(
                        target: "jobboard.sql",
                        tag,
                        elapsed_ms,
                        sql = %sql,
                        "slow query",
                    );
                }
            }
            Err(err) => tracing::warn!(
                target: "jobboard.sql",
                query_type = ?query_type,
                tag,
                param_count,
                elapsed_ms,
                sql = %sql,
                error = %err,
                "query failed",
            ),
        }
    }
}

impl<C: GenericClient> GenericClient for TracedClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JobResult<Vec<Row>> {
        self.query_tagged("-", sql, params).await
    }

    async fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JobResult<Vec<Row>> {
        let started = Instant::now();
        let result = self.client.query_tagged(tag, sql, params).await;
        self.record(tag, sql, params.len(), started, &result, |rows| {
            rows.len() as u64
        });
        result
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JobResult<u64> {
        self.execute_tagged("-", sql, params).await
    }

    async fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JobResult<u64> {
        let started = Instant::now();
        let result = self.client.execute_tagged(tag, sql, params).await;
        self.record(tag, sql, params.len(), started, &result, |n| *n);
        result
    }
}
