//! `SET` clause generation for partial updates.

use super::Fragment;
use super::params::ParamList;
use crate::error::{JobError, JobResult};
use crate::value::SqlValue;
use serde::Deserialize;

/// Trusted field-name → column-name renames, e.g. `("numEmployees", "num_employees")`.
///
/// Keys missing from the map are used as column names verbatim.
pub type ColumnMap = [(&'static str, &'static str)];

/// Look up the column for `field`, falling back to the field name itself.
pub fn column_for<'a>(column_names: &'a ColumnMap, field: &'a str) -> &'a str {
    column_names
        .iter()
        .find(|(from, _)| *from == field)
        .map_or(field, |&(_, to)| to)
}

/// Ordered `field -> value` pairs to write.
///
/// Order is significant: it is the order of the generated `SET` clauses and
/// of the bind values. Deserializing from a JSON object keeps the object's
/// key order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "serde_json::Map<String, serde_json::Value>")]
pub struct UpdatePayload {
    entries: Vec<(String, SqlValue)>,
}

impl UpdatePayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`UpdatePayload::set`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.set(field, value);
        self
    }

    /// Set `field`, replacing an existing entry in place or appending a new one.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> &mut Self {
        let field = field.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field, value)),
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&SqlValue> {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(f, v)| (f.as_str(), v))
    }

    /// Reject any field not in `allowed`.
    ///
    /// Unmapped fields become column names verbatim, so entity operations
    /// call this before compiling a payload that came from a request.
    pub fn ensure_only(&self, allowed: &[&str]) -> JobResult<()> {
        match self.iter().find(|(field, _)| !allowed.contains(field)) {
            Some((field, _)) => Err(JobError::bad_request(format!(
                "field {field:?} cannot be updated"
            ))),
            None => Ok(()),
        }
    }

    /// Build from a JSON object, keeping key order.
    pub fn from_json(value: &serde_json::Value) -> JobResult<Self> {
        match value {
            serde_json::Value::Object(map) => Self::try_from(map.clone()),
            other => Err(JobError::bad_request(format!(
                "expected an object of fields to update, got {other}"
            ))),
        }
    }
}

impl TryFrom<serde_json::Map<String, serde_json::Value>> for UpdatePayload {
    type Error = JobError;

    fn try_from(map: serde_json::Map<String, serde_json::Value>) -> JobResult<Self> {
        let entries = map
            .into_iter()
            .map(|(field, value)| Ok((field, SqlValue::from_json(&value)?)))
            .collect::<JobResult<Vec<_>>>()?;
        Ok(Self { entries })
    }
}

impl<K, V> FromIterator<(K, V)> for UpdatePayload
where
    K: Into<String>,
    V: Into<SqlValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = Self::new();
        for (field, value) in iter {
            payload.set(field, value);
        }
        payload
    }
}

/// Compile `data` into `"col"=$1, "col2"=$2, ...` plus its bind values.
///
/// Placeholders always start at `$1`; callers appending a `WHERE` parameter
/// use [`Fragment::next_placeholder`].
///
/// Returns [`JobError::BadRequest`] for an empty payload.
pub fn compile_partial_update(data: &UpdatePayload, column_names: &ColumnMap) -> JobResult<Fragment> {
    if data.is_empty() {
        return Err(JobError::bad_request("No data"));
    }

    let mut params = ParamList::new();
    let mut sql = String::new();
    for (i, (field, value)) in data.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        let column = column_for(column_names, field);
        sql.push('"');
        sql.push_str(column);
        sql.push_str("\"=");
        sql.push_str(&params.bind(value.clone()));
    }

    Ok(Fragment::new(sql, params.into_values()))
}
