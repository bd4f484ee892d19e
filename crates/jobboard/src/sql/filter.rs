//! Search-filter composition for list operations.
//!
//! A list operation starts from a fixed `SELECT ... FROM ...`, lets its filter
//! set contribute predicates in a fixed order, and ends with a fixed
//! `ORDER BY`. Only parameterized predicates consume placeholders.

use super::Fragment;
use super::params::ParamList;
use crate::value::SqlValue;

/// Collects `WHERE` predicates and their bind values.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct WhereBuilder {
    where_expressions: Vec<String>,
    params: ParamList,
}

impl WhereBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `column >= $n` when `value` is provided. `Some(0)` is a real threshold.
    pub fn at_least<T: Into<SqlValue>>(&mut self, column: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            let ph = self.params.bind(value);
            self.where_expressions.push(format!("{column} >= {ph}"));
        }
        self
    }

    /// `column <= $n` when `value` is provided.
    pub fn at_most<T: Into<SqlValue>>(&mut self, column: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            let ph = self.params.bind(value);
            self.where_expressions.push(format!("{column} <= {ph}"));
        }
        self
    }

    /// `column > 0`, unparameterized, only when `flag` is `Some(true)`.
    ///
    /// `Some(false)` does not mean "column = 0"; it leaves the column unconstrained.
    pub fn positive_if(&mut self, column: &str, flag: Option<bool>) -> &mut Self {
        if flag == Some(true) {
            self.where_expressions.push(format!("{column} > 0"));
        }
        self
    }

    /// `column ILIKE $n` bound to `%needle%` when `needle` is provided.
    pub fn contains_ignore_case(&mut self, column: &str, needle: Option<&str>) -> &mut Self {
        if let Some(needle) = needle {
            let ph = self.params.bind(format!("%{needle}%"));
            self.where_expressions.push(format!("{column} ILIKE {ph}"));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.where_expressions.is_empty()
    }

    /// Number of predicates collected so far.
    pub fn len(&self) -> usize {
        self.where_expressions.len()
    }

    /// Assemble `base_query [WHERE ...] ORDER BY order_by`.
    pub fn finish(self, base_query: &str, order_by: &str) -> Fragment {
        let mut sql = String::with_capacity(base_query.len() + 64);
        sql.push_str(base_query);
        if !self.where_expressions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_expressions.join(" AND "));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(order_by);
        Fragment::new(sql, self.params.into_values())
    }
}

/// A typed set of optional search predicates for one entity.
pub trait FilterSet {
    /// Column list operations order by.
    fn order_by(&self) -> &'static str;

    /// Contribute predicates to `builder`, always in the same order.
    fn apply(&self, builder: &mut WhereBuilder);
}

/// Compose `base_query` with the predicates from `filters`.
///
/// `base_query` must not already contain `WHERE` or `ORDER BY`. Never fails:
/// a filter matching nothing yields zero rows at execution time.
pub fn compose_filtered_query(base_query: &str, filters: &impl FilterSet) -> Fragment {
    let mut builder = WhereBuilder::new();
    filters.apply(&mut builder);
    builder.finish(base_query, filters.order_by())
}
