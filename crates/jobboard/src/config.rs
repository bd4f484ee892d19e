//! Database configuration.
//!
//! Configuration comes from the process environment (after loading a `.env`
//! file, if present) or from a TOML document with a `[database]` table:
//!
//! ```toml
//! [database]
//! url = "postgres://localhost/jobboard"
//! pool_size = 8
//! statement_timeout_ms = 5000
//! ```

use crate::error::{JobError, JobResult};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_POOL_SIZE: usize = 16;

/// Connection settings for the job board database.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    #[serde(default)]
    pub statement_timeout_ms: Option<u64>,
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    database: DatabaseConfig,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool_size: DEFAULT_POOL_SIZE,
            statement_timeout_ms: None,
        }
    }

    pub fn pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn statement_timeout(&self) -> Option<Duration> {
        self.statement_timeout_ms.map(Duration::from_millis)
    }

    /// Load from environment variables, reading `.env` first.
    ///
    /// - `DATABASE_URL` (required)
    /// - `JOBBOARD_ENV=test` switches to `TEST_DATABASE_URL`
    /// - `DATABASE_POOL_SIZE` (default 16)
    /// - `DATABASE_STATEMENT_TIMEOUT_MS` (optional)
    pub fn from_env() -> JobResult<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(JobError::config(format!("failed to load .env: {e}")));
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`DatabaseConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> JobResult<Self> {
        let url_var = match lookup("JOBBOARD_ENV").as_deref() {
            Some("test") => "TEST_DATABASE_URL",
            _ => "DATABASE_URL",
        };
        let url = lookup(url_var)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| JobError::config(format!("{url_var} is not set")))?;

        let pool_size = match lookup("DATABASE_POOL_SIZE") {
            Some(raw) => parse_var("DATABASE_POOL_SIZE", &raw)?,
            None => DEFAULT_POOL_SIZE,
        };
        let statement_timeout_ms = lookup("DATABASE_STATEMENT_TIMEOUT_MS")
            .map(|raw| parse_var("DATABASE_STATEMENT_TIMEOUT_MS", &raw))
            .transpose()?;

        Self {
            url,
            pool_size,
            statement_timeout_ms,
        }
        .validated()
    }

    /// Parse the `[database]` table of a TOML document.
    pub fn from_toml_str(raw: &str) -> JobResult<Self> {
        let file: ConfigFile = toml::from_str(raw)
            .map_err(|e| JobError::config(format!("failed to parse config: {e}")))?;
        file.database.validated()
    }

    fn validated(self) -> JobResult<Self> {
        if self.pool_size == 0 {
            return Err(JobError::config("pool_size must be at least 1"));
        }
        Ok(self)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: &str) -> JobResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| JobError::config(format!("invalid {name}={raw:?}: {e}")))
}
