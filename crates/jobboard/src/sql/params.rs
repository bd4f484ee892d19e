//! Placeholder bookkeeping shared by the statement builders.

use crate::value::SqlValue;
use tokio_postgres::types::ToSql;

/// Ordered bind values with their 1-based `$n` positions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamList {
    values: Vec<SqlValue>,
}

impl ParamList {
    /// Create a new empty parameter list.
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Add a value and return its 1-based index.
    pub fn push(&mut self, value: impl Into<SqlValue>) -> usize {
        self.values.push(value.into());
        self.values.len()
    }

    /// Add a value and return the `$n` placeholder that refers to it.
    pub fn bind(&mut self, value: impl Into<SqlValue>) -> String {
        placeholder(self.push(value))
    }

    /// Index the next pushed value will receive.
    pub fn next_index(&self) -> usize {
        self.values.len() + 1
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }
}

/// Render a 1-based placeholder, e.g. `3` -> `$3`.
pub fn placeholder(index: usize) -> String {
    format!("${index}")
}

/// Parameter refs compatible with `tokio-postgres`.
pub fn params_ref(values: &[SqlValue]) -> Vec<&(dyn ToSql + Sync)> {
    values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}
