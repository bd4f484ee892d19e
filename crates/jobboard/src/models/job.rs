//! Jobs: postings owned by a company.

use super::company::Company;
use crate::client::GenericClient;
use crate::error::{JobError, JobResult};
use crate::row::{FromRow, RowExt};
use crate::sql::{
    FilterSet, UpdatePayload, WhereBuilder, compile_partial_update, compose_filtered_query,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// Fields a partial update may touch. Jobs never move between companies.
pub const UPDATABLE_FIELDS: &[&str] = &["title", "salary", "equity"];

const SELECT_JOBS: &str = "SELECT id, title, salary, equity, company_handle FROM jobs";
const RETURNING: &str = "RETURNING id, title, salary, equity, company_handle";

/// A job row as listed and returned from writes; serialized with `company_handle`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JobResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// A job with its company expanded in place of the handle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDetail {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company: Company,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    #[serde(alias = "company_handle")]
    pub company_handle: String,
}

/// Search filters for [`Job::find_all`].
///
/// `has_equity: Some(false)` is the same as `None`: it does not restrict to
/// jobs without equity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    pub min_salary: Option<i32>,
    pub has_equity: Option<bool>,
    /// Case-insensitive partial match on the job title.
    pub title: Option<String>,
}

impl FilterSet for JobFilter {
    fn order_by(&self) -> &'static str {
        "title"
    }

    fn apply(&self, builder: &mut WhereBuilder) {
        builder
            .at_least("salary", self.min_salary)
            .positive_if("equity", self.has_equity)
            .contains_ignore_case("title", self.title.as_deref());
    }
}

impl Job {
    /// Insert a job. The same title twice at one company is a bad request,
    /// and an unknown company is not found.
    pub async fn create(client: &impl GenericClient, data: &NewJob) -> JobResult<Job> {
        let duplicate = client
            .query_opt_tagged(
                "jobs.create.check",
                "SELECT title, company_handle FROM jobs WHERE title = $1 AND company_handle = $2",
                &[&data.title, &data.company_handle],
            )
            .await?;
        if duplicate.is_some() {
            return Err(JobError::bad_request(format!(
                "Duplicate job: {} at {}",
                data.title, data.company_handle
            )));
        }

        let inserted = client
            .query_one_tagged(
                "jobs.create",
                &format!(
                    "INSERT INTO jobs (title, salary, equity, company_handle) \
                     VALUES ($1, $2, $3, $4) {RETURNING}"
                ),
                &[&data.title, &data.salary, &data.equity, &data.company_handle],
            )
            .await;

        match inserted {
            Ok(row) => Job::from_row(&row),
            Err(JobError::ForeignKeyViolation(_)) => Err(JobError::not_found(format!(
                "No company: {}",
                data.company_handle
            ))),
            Err(e) => Err(e),
        }
    }

    /// List jobs matching `filter`, ordered by title. No match is an empty list.
    pub async fn find_all(client: &impl GenericClient, filter: &JobFilter) -> JobResult<Vec<Job>> {
        let q = compose_filtered_query(SELECT_JOBS, filter);
        let rows = client
            .query_tagged("jobs.find_all", &q.sql, &q.params_ref())
            .await?;
        Job::from_rows(&rows)
    }

    /// Fetch one job with its company.
    pub async fn get(client: &impl GenericClient, id: i32) -> JobResult<JobDetail> {
        let row = client
            .query_opt_tagged("jobs.get", &format!("{SELECT_JOBS} WHERE id = $1"), &[&id])
            .await?
            .ok_or_else(|| missing(id))?;
        let job = Job::from_row(&row)?;

        let company_row = client
            .query_one_tagged(
                "jobs.get.company",
                "SELECT handle, name, description, num_employees, logo_url \
                 FROM companies WHERE handle = $1",
                &[&job.company_handle],
            )
            .await?;

        Ok(JobDetail {
            id: job.id,
            title: job.title,
            salary: job.salary,
            equity: job.equity,
            company: Company::from_row(&company_row)?,
        })
    }

    /// Partially update a job's title, salary or equity.
    pub async fn update(
        client: &impl GenericClient,
        id: i32,
        data: &UpdatePayload,
    ) -> JobResult<Job> {
        data.ensure_only(UPDATABLE_FIELDS)?;
        let mut set = compile_partial_update(data, &[])?;
        let id_idx = set.bind(id);

        let sql = format!("UPDATE jobs SET {} WHERE id = {id_idx} {RETURNING}", set.sql);
        let row = client
            .query_opt_tagged("jobs.update", &sql, &set.params_ref())
            .await?
            .ok_or_else(|| missing(id))?;
        Job::from_row(&row)
    }

    pub async fn remove(client: &impl GenericClient, id: i32) -> JobResult<()> {
        let deleted = client
            .execute_tagged("jobs.remove", "DELETE FROM jobs WHERE id = $1", &[&id])
            .await?;
        if deleted == 0 {
            return Err(missing(id));
        }
        Ok(())
    }
}

fn missing(id: i32) -> JobError {
    tracing::debug!(target: "jobboard.models", id, "job not found");
    JobError::not_found(format!("No job: {id}"))
}
