//! Companies: `handle`-keyed employers that own jobs.

use crate::client::GenericClient;
use crate::error::{JobError, JobResult};
use crate::row::{FromRow, RowExt};
use crate::sql::{
    ColumnMap, FilterSet, UpdatePayload, WhereBuilder, compile_partial_update,
    compose_filtered_query,
};
use crate::value::SqlValue;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// Request field names that differ from their column.
pub const COLUMN_NAMES: &ColumnMap = &[("numEmployees", "num_employees"), ("logoUrl", "logo_url")];

/// Fields a partial update may touch.
pub const UPDATABLE_FIELDS: &[&str] = &["name", "description", "numEmployees", "logoUrl"];

const SELECT_COMPANIES: &str = "SELECT handle, name, description, num_employees, logo_url FROM companies";
const RETURNING: &str = "RETURNING handle, name, description, num_employees, logo_url";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JobResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// A job as listed under its company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyJob {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

impl FromRow for CompanyJob {
    fn from_row(row: &Row) -> JobResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
        })
    }
}

/// A company together with its jobs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<CompanyJob>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Search filters for [`Company::find_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
    /// Case-insensitive partial match on the company name.
    pub name: Option<String>,
}

impl CompanyFilter {
    /// Reject a range no company can satisfy.
    pub fn validate(&self) -> JobResult<()> {
        if let (Some(min), Some(max)) = (self.min_employees, self.max_employees) {
            if min > max {
                return Err(JobError::bad_request(
                    "minEmployees cannot be greater than maxEmployees",
                ));
            }
        }
        Ok(())
    }
}

impl FilterSet for CompanyFilter {
    fn order_by(&self) -> &'static str {
        "name"
    }

    fn apply(&self, builder: &mut WhereBuilder) {
        builder
            .at_least("num_employees", self.min_employees)
            .at_most("num_employees", self.max_employees)
            .contains_ignore_case("name", self.name.as_deref());
    }
}

impl Company {
    /// Insert a company. A taken handle or name is a bad request.
    pub async fn create(client: &impl GenericClient, data: &NewCompany) -> JobResult<Company> {
        let duplicate = client
            .query_opt_tagged(
                "companies.create.check",
                "SELECT handle FROM companies WHERE handle = $1",
                &[&data.handle],
            )
            .await?;
        if duplicate.is_some() {
            return Err(JobError::bad_request(format!(
                "Duplicate company: {}",
                data.handle
            )));
        }

        let inserted = client
            .query_one_tagged(
                "companies.create",
                &format!(
                    "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
                     VALUES ($1, $2, $3, $4, $5) {RETURNING}"
                ),
                &[
                    &data.handle,
                    &data.name,
                    &data.description,
                    &data.num_employees,
                    &data.logo_url,
                ],
            )
            .await
            .map_err(|e| taken_name(e, &data.name))?;
        Company::from_row(&inserted)
    }

    /// List companies matching `filter`, ordered by name.
    pub async fn find_all(
        client: &impl GenericClient,
        filter: &CompanyFilter,
    ) -> JobResult<Vec<Company>> {
        filter.validate()?;
        let q = compose_filtered_query(SELECT_COMPANIES, filter);
        let rows = client
            .query_tagged("companies.find_all", &q.sql, &q.params_ref())
            .await?;
        Company::from_rows(&rows)
    }

    /// Fetch one company with its jobs.
    pub async fn get(client: &impl GenericClient, handle: &str) -> JobResult<CompanyDetail> {
        let row = client
            .query_opt_tagged(
                "companies.get",
                &format!("{SELECT_COMPANIES} WHERE handle = $1"),
                &[&handle],
            )
            .await?
            .ok_or_else(|| missing(handle))?;
        let company = Company::from_row(&row)?;

        let job_rows = client
            .query_tagged(
                "companies.get.jobs",
                "SELECT id, title, salary, equity FROM jobs WHERE company_handle = $1 ORDER BY id",
                &[&handle],
            )
            .await?;

        Ok(CompanyDetail {
            company,
            jobs: CompanyJob::from_rows(&job_rows)?,
        })
    }

    /// Partially update a company. The handle itself cannot change, and
    /// renaming onto a taken name is a bad request.
    pub async fn update(
        client: &impl GenericClient,
        handle: &str,
        data: &UpdatePayload,
    ) -> JobResult<Company> {
        data.ensure_only(UPDATABLE_FIELDS)?;
        let mut set = compile_partial_update(data, COLUMN_NAMES)?;
        let handle_idx = set.bind(handle);
        let new_name = data.get("name").and_then(SqlValue::as_str).unwrap_or_default();

        let sql = format!("UPDATE companies SET {} WHERE handle = {handle_idx} {RETURNING}", set.sql);
        let row = client
            .query_opt_tagged("companies.update", &sql, &set.params_ref())
            .await
            .map_err(|e| taken_name(e, new_name))?
            .ok_or_else(|| missing(handle))?;
        Company::from_row(&row)
    }

    /// Delete a company (and, by cascade, its jobs).
    pub async fn remove(client: &impl GenericClient, handle: &str) -> JobResult<()> {
        let deleted = client
            .execute_tagged(
                "companies.remove",
                "DELETE FROM companies WHERE handle = $1",
                &[&handle],
            )
            .await?;
        if deleted == 0 {
            return Err(missing(handle));
        }
        Ok(())
    }
}

/// Map a clash on the unique `name` column to a bad request.
fn taken_name(err: JobError, name: &str) -> JobError {
    if err.is_unique_violation() {
        tracing::debug!(target: "jobboard.models", name, "company name taken");
        return JobError::bad_request(format!("Duplicate company name: {name}"));
    }
    err
}

fn missing(handle: &str) -> JobError {
    tracing::debug!(target: "jobboard.models", handle, "company not found");
    JobError::not_found(format!("No company: {handle}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_rejects_inverted_range() {
        let filter = CompanyFilter {
            min_employees: Some(5),
            max_employees: Some(2),
            name: None,
        };
        assert!(filter.validate().unwrap_err().is_bad_request());

        let equal = CompanyFilter {
            min_employees: Some(2),
            max_employees: Some(2),
            name: None,
        };
        assert!(equal.validate().is_ok());
        assert!(CompanyFilter::default().validate().is_ok());
    }

    #[test]
    fn filter_deserializes_camel_case() {
        let filter: CompanyFilter =
            serde_json::from_str(r#"{"minEmployees": 0, "name": "net"}"#).unwrap();
        assert_eq!(filter.min_employees, Some(0));
        assert_eq!(filter.max_employees, None);
        assert_eq!(filter.name.as_deref(), Some("net"));
        assert!(serde_json::from_str::<CompanyFilter>(r#"{"size": 3}"#).is_err());
    }

    #[test]
    fn update_compiles_with_renamed_columns() {
        let data = UpdatePayload::new()
            .with("logoUrl", "http://new.img")
            .with("numEmployees", 40);
        data.ensure_only(UPDATABLE_FIELDS).unwrap();
        let set = compile_partial_update(&data, COLUMN_NAMES).unwrap();
        assert_eq!(set.sql, "\"logo_url\"=$1, \"num_employees\"=$2");
        assert_eq!(set.next_placeholder(), 3);
        assert_eq!(set.values[1], SqlValue::Int(40));
    }

    #[test]
    fn name_clash_becomes_bad_request() {
        let clash = JobError::UniqueViolation("companies_name_key: duplicate key".into());
        let err = taken_name(clash, "C1");
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("C1"));

        let other = taken_name(JobError::CheckViolation("num_employees".into()), "C1");
        assert!(matches!(other, JobError::CheckViolation(_)));
    }

    #[test]
    fn handle_is_not_updatable() {
        let data = UpdatePayload::new().with("handle", "new-handle");
        assert!(data.ensure_only(UPDATABLE_FIELDS).unwrap_err().is_bad_request());
    }

    #[test]
    fn detail_serializes_flat_with_jobs() {
        let detail = CompanyDetail {
            company: Company {
                handle: "c1".into(),
                name: "C1".into(),
                description: "Desc1".into(),
                num_employees: Some(1),
                logo_url: Some("http://c1.img".into()),
            },
            jobs: vec![CompanyJob {
                id: 1,
                title: "t1".into(),
                salary: Some(100),
                equity: Some("0.1".parse().unwrap()),
            }],
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "handle": "c1",
                "name": "C1",
                "description": "Desc1",
                "numEmployees": 1,
                "logoUrl": "http://c1.img",
                "jobs": [{"id": 1, "title": "t1", "salary": 100, "equity": "0.1"}],
            })
        );
    }
}
