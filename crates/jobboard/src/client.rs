//! The client seam entity operations are written against.
//!
//! Any connection-like value works: a direct `tokio_postgres` client, a
//! pooled `deadpool_postgres` client, a transaction from either, a reference
//! to one of those, or a [`TracedClient`](crate::TracedClient) around them.

use crate::error::{JobError, JobResult};
use std::future::Future;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

pub trait GenericClient: Send + Sync {
    /// Run `sql` and collect every row.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = JobResult<Vec<Row>>> + Send;

    /// Run `sql` and return the affected row count.
    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = JobResult<u64>> + Send;

    /// [`GenericClient::query`] under a statement tag such as `"jobs.find_all"`.
    ///
    /// Plain clients drop the tag; [`TracedClient`](crate::TracedClient) logs it.
    fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = JobResult<Vec<Row>>> + Send {
        let _ = tag;
        self.query(sql, params)
    }

    /// [`GenericClient::execute`] under a statement tag.
    fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = JobResult<u64>> + Send {
        let _ = tag;
        self.execute(sql, params)
    }

    /// First row, if any. Extra rows are ignored.
    fn query_opt_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = JobResult<Option<Row>>> + Send {
        async move { Ok(self.query_tagged(tag, sql, params).await?.into_iter().next()) }
    }

    /// First row; no row at all is [`JobError::NotFound`].
    fn query_one_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = JobResult<Row>> + Send {
        async move {
            self.query_opt_tagged(tag, sql, params)
                .await?
                .ok_or_else(|| JobError::not_found(format!("{tag}: expected a row, got none")))
        }
    }
}

/// Implement [`GenericClient`] by calling the `tokio_postgres` connection or
/// transaction that `$conn` reaches from `$this`.
macro_rules! forward_to_tokio_postgres {
    ($($ty:ty => |$this:ident| $conn:expr;)+) => {$(
        impl GenericClient for $ty {
            async fn query(
                &self,
                sql: &str,
                params: &[&(dyn ToSql + Sync)],
            ) -> JobResult<Vec<Row>> {
                let $this = self;
                $conn.query(sql, params).await.map_err(JobError::from_db_error)
            }

            async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JobResult<u64> {
                let $this = self;
                $conn.execute(sql, params).await.map_err(JobError::from_db_error)
            }
        }
    )+};
}

forward_to_tokio_postgres! {
    tokio_postgres::Client => |client| client;
    tokio_postgres::Transaction<'_> => |tx| tx;
    // Object -> ClientWrapper -> tokio_postgres::Client
    deadpool_postgres::Client => |client| &***client;
    deadpool_postgres::Transaction<'_> => |tx| &**tx;
}

// Lets `TracedClient` borrow a transaction instead of owning it.
impl<C: GenericClient> GenericClient for &C {
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = JobResult<Vec<Row>>> + Send {
        (**self).query(sql, params)
    }

    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = JobResult<u64>> + Send {
        (**self).execute(sql, params)
    }

    fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = JobResult<Vec<Row>>> + Send {
        (**self).query_tagged(tag, sql, params)
    }

    fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = JobResult<u64>> + Send {
        (**self).execute_tagged(tag, sql, params)
    }
}
