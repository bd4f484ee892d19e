//! Parameterized SQL fragments.
//!
//! Two independent builders live here:
//! - [`compile_partial_update`] turns an ordered field/value payload into a
//!   `SET` list (`"col"=$1, "col2"=$2`).
//! - [`compose_filtered_query`] turns a [`FilterSet`] into a full
//!   `SELECT ... WHERE ... ORDER BY ...` statement.
//!
//! Both return a [`Fragment`]: SQL text whose `$n` placeholders line up with
//! the value list. Only trusted column names are ever interpolated.
//!
//! # Example
//!
//! ```ignore
//! use jobboard::sql::{compile_partial_update, UpdatePayload};
//!
//! let data = UpdatePayload::new().with("numEmployees", 10).with("name", "Acme");
//! let set = compile_partial_update(&data, &[("numEmployees", "num_employees")])?;
//! assert_eq!(set.sql, r#""num_employees"=$1, "name"=$2"#);
//! ```

mod filter;
mod params;
mod partial_update;


pub use filter::{FilterSet, WhereBuilder, compose_filtered_query};
pub use params::{ParamList, params_ref, placeholder};
pub use partial_update::{ColumnMap, UpdatePayload, column_for, compile_partial_update};

use crate::value::SqlValue;
use tokio_postgres::types::ToSql;

/// SQL text plus the values its `$1..$n` placeholders refer to, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

impl Fragment {
    pub fn new(sql: impl Into<String>, values: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            values,
        }
    }

    /// Index for a parameter appended after this fragment's values.
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }

    /// Append one more bind value, returning its `$n` placeholder.
    pub fn bind(&mut self, value: impl Into<SqlValue>) -> String {
        self.values.push(value.into());
        placeholder(self.values.len())
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        params_ref(&self.values)
    }
}
