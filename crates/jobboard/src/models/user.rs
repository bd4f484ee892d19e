//! Users and their job applications.

use crate::client::GenericClient;
use crate::error::{JobError, JobResult};
use crate::row::{FromRow, RowExt};
use crate::sql::{ColumnMap, UpdatePayload, compile_partial_update};
use crate::value::SqlValue;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// Request field names that differ from their column.
pub const COLUMN_NAMES: &ColumnMap = &[
    ("firstName", "first_name"),
    ("lastName", "last_name"),
    ("isAdmin", "is_admin"),
];

/// Fields a partial update may touch.
pub const UPDATABLE_FIELDS: &[&str] = &["firstName", "lastName", "password", "email", "isAdmin"];

const SELECT_USERS: &str = "SELECT username, first_name, last_name, email, is_admin FROM users";
const RETURNING: &str = "RETURNING username, first_name, last_name, email, is_admin";

/// Password hashing collaborator.
///
/// The crate stores and compares only what this returns; the algorithm and
/// its work factor belong to the implementation.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> JobResult<String>;

    fn verify(&self, password: &str, hash: &str) -> JobResult<bool>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

impl FromRow for User {
    fn from_row(row: &Row) -> JobResult<Self> {
        Ok(Self {
            username: row.try_get_column("username")?,
            first_name: row.try_get_column("first_name")?,
            last_name: row.try_get_column("last_name")?,
            email: row.try_get_column("email")?,
            is_admin: row.try_get_column("is_admin")?,
        })
    }
}

/// A user plus the ids of jobs they applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub jobs: Vec<i32>,
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("is_admin", &self.is_admin)
            .finish()
    }
}

impl User {
    /// Register a user, hashing the password with `hasher`.
    pub async fn register(
        client: &impl GenericClient,
        hasher: &impl PasswordHasher,
        data: &NewUser,
    ) -> JobResult<User> {
        let taken = client
            .query_opt_tagged(
                "users.register.check",
                "SELECT username FROM users WHERE username = $1",
                &[&data.username],
            )
            .await?;
        if taken.is_some() {
            return Err(duplicate(&data.username));
        }

        let hashed = hasher.hash(&data.password)?;
        let row = client
            .query_one_tagged(
                "users.register",
                &format!(
                    "INSERT INTO users (username, password, first_name, last_name, email, is_admin) \
                     VALUES ($1, $2, $3, $4, $5, $6) {RETURNING}"
                ),
                &[
                    &data.username,
                    &hashed,
                    &data.first_name,
                    &data.last_name,
                    &data.email,
                    &data.is_admin,
                ],
            )
            .await
            .map_err(|e| {
                // Lost a race with a concurrent registration of the same name.
                if e.is_unique_violation() {
                    duplicate(&data.username)
                } else {
                    e
                }
            })?;
        User::from_row(&row)
    }

    /// Check credentials. Unknown users and wrong passwords look the same.
    pub async fn authenticate(
        client: &impl GenericClient,
        hasher: &impl PasswordHasher,
        username: &str,
        password: &str,
    ) -> JobResult<User> {
        let row = client
            .query_opt_tagged(
                "users.authenticate",
                "SELECT username, password, first_name, last_name, email, is_admin \
                 FROM users WHERE username = $1",
                &[&username],
            )
            .await?;

        if let Some(row) = row {
            let hash: String = row.try_get_column("password")?;
            if hasher.verify(password, &hash)? {
                return User::from_row(&row);
            }
        }

        tracing::debug!(target: "jobboard.models", username, "authentication failed");
        Err(JobError::unauthorized("Invalid username/password"))
    }

    /// All users, ordered by username.
    pub async fn find_all(client: &impl GenericClient) -> JobResult<Vec<User>> {
        let rows = client
            .query_tagged(
                "users.find_all",
                &format!("{SELECT_USERS} ORDER BY username"),
                &[],
            )
            .await?;
        User::from_rows(&rows)
    }

    /// Fetch one user with the ids of jobs they applied to.
    pub async fn get(client: &impl GenericClient, username: &str) -> JobResult<UserDetail> {
        let row = client
            .query_opt_tagged(
                "users.get",
                &format!("{SELECT_USERS} WHERE username = $1"),
                &[&username],
            )
            .await?
            .ok_or_else(|| missing(username))?;
        let user = User::from_row(&row)?;

        let app_rows = client
            .query_tagged(
                "users.get.applications",
                "SELECT job_id FROM applications WHERE username = $1 ORDER BY job_id",
                &[&username],
            )
            .await?;
        let jobs = app_rows
            .iter()
            .map(|r| r.try_get_column("job_id"))
            .collect::<JobResult<Vec<i32>>>()?;

        Ok(UserDetail { user, jobs })
    }

    /// Partially update a user. A `password` entry is hashed before it is stored.
    pub async fn update(
        client: &impl GenericClient,
        hasher: &impl PasswordHasher,
        username: &str,
        data: &UpdatePayload,
    ) -> JobResult<User> {
        data.ensure_only(UPDATABLE_FIELDS)?;

        let mut data = data.clone();
        if let Some(password) = data.get("password") {
            let plain = password
                .as_str()
                .ok_or_else(|| JobError::bad_request("password must be a string"))?;
            let hashed = hasher.hash(plain)?;
            data.set("password", SqlValue::Text(hashed));
        }

        let mut set = compile_partial_update(&data, COLUMN_NAMES)?;
        let username_idx = set.bind(username);

        let sql = format!(
            "UPDATE users SET {} WHERE username = {username_idx} {RETURNING}",
            set.sql
        );
        let row = client
            .query_opt_tagged("users.update", &sql, &set.params_ref())
            .await?
            .ok_or_else(|| missing(username))?;
        User::from_row(&row)
    }

    pub async fn remove(client: &impl GenericClient, username: &str) -> JobResult<()> {
        let deleted = client
            .execute_tagged(
                "users.remove",
                "DELETE FROM users WHERE username = $1",
                &[&username],
            )
            .await?;
        if deleted == 0 {
            return Err(missing(username));
        }
        Ok(())
    }

    /// Record that `username` applied to `job_id`. Applying twice is a bad request.
    pub async fn apply_to_job(
        client: &impl GenericClient,
        username: &str,
        job_id: i32,
    ) -> JobResult<()> {
        client
            .query_opt_tagged("users.apply.job", "SELECT id FROM jobs WHERE id = $1", &[&job_id])
            .await?
            .ok_or_else(|| JobError::not_found(format!("No job: {job_id}")))?;

        client
            .query_opt_tagged(
                "users.apply.user",
                "SELECT username FROM users WHERE username = $1",
                &[&username],
            )
            .await?
            .ok_or_else(|| missing(username))?;

        let inserted = client
            .execute_tagged(
                "users.apply",
                "INSERT INTO applications (job_id, username) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
                &[&job_id, &username],
            )
            .await?;
        if inserted == 0 {
            return Err(JobError::bad_request(format!(
                "{username} already applied to job {job_id}"
            )));
        }
        Ok(())
    }
}

fn duplicate(username: &str) -> JobError {
    JobError::bad_request(format!("Duplicate username: {username}"))
}

fn missing(username: &str) -> JobError {
    tracing::debug!(target: "jobboard.models", username, "user not found");
    JobError::not_found(format!("No user: {username}"))
}
