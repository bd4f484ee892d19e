//! # jobboard
//!
//! PostgreSQL data layer for a job board: companies, jobs, users and
//! applications.
//!
//! ## Features
//!
//! - **Partial updates**: an ordered field/value payload compiles to a
//!   parameterized `SET` list ([`compile_partial_update`])
//! - **Search filters**: typed filter sets compose into
//!   `WHERE ... ORDER BY ...` with bound values ([`compose_filtered_query`])
//! - **Transaction-friendly**: pass a transaction anywhere a `GenericClient` is expected
//! - **Logged SQL**: wrap any client in [`TracedClient`] to emit `tracing` events
//!
//! ## Example
//!
//! ```ignore
//! use jobboard::models::{Job, JobFilter};
//! use jobboard::{DatabaseConfig, TracedClient, create_pool, migrate};
//!
//! let pool = create_pool(&DatabaseConfig::from_env()?)?;
//! migrate::run_pool(&pool).await?;
//!
//! let client = TracedClient::new(pool.get().await?);
//! let jobs = Job::find_all(&client, &JobFilter {
//!     min_salary: Some(0),
//!     has_equity: Some(true),
//!     ..Default::default()
//! })
//! .await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod migrate;
pub mod models;
pub mod monitor;
pub mod pool;
pub mod row;
pub mod sql;
pub mod value;

pub use client::GenericClient;
pub use config::DatabaseConfig;
pub use error::{JobError, JobResult};
pub use monitor::{QueryType, TracedClient};
pub use pool::create_pool;
pub use row::{FromRow, RowExt};
pub use sql::{
    ColumnMap, FilterSet, Fragment, UpdatePayload, WhereBuilder, compile_partial_update,
    compose_filtered_query,
};
pub use value::SqlValue;
