//! Shared fixtures for database-backed tests.
//!
//! Tests connect to `DATABASE_URL`, skip when it is unset, and do all their
//! work inside a transaction that is rolled back when dropped.

#![allow(dead_code)]

use jobboard::models::{Company, Job, NewCompany, NewJob, NewUser, PasswordHasher, User};
use jobboard::{JobError, JobResult, migrate};
use tokio_postgres::{NoTls, Transaction};

static MIGRATED: tokio::sync::Mutex<bool> = tokio::sync::Mutex::const_new(false);

/// Connect and migrate, or `None` when `DATABASE_URL` is not set.
pub async fn try_connect(test_name: &str) -> JobResult<Option<tokio_postgres::Client>> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test_name}");
            return Ok(None);
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let (mut client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .map_err(JobError::from_db_error)?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("tokio-postgres connection error: {e}");
        }
    });

    let mut migrated = MIGRATED.lock().await;
    if !*migrated {
        migrate::run(&mut client).await?;
        *migrated = true;
    }
    Ok(Some(client))
}

/// Prefixes the password; enough to prove the hash, not the plaintext, is stored.
/// Refuses empty passwords.
pub struct PrefixHasher;

impl PasswordHasher for PrefixHasher {
    fn hash(&self, password: &str) -> JobResult<String> {
        if password.is_empty() {
            return Err(JobError::Hashing("refusing to hash an empty password".into()));
        }
        Ok(format!("hashed:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> JobResult<bool> {
        Ok(hash.strip_prefix("hashed:") == Some(password))
    }
}

/// Ids of the seeded jobs t1, t2, t3.
pub struct Seeded {
    pub job_ids: [i32; 3],
}

/// Clear every table and insert companies c1..c3, jobs t1..t3 and users u1, u2.
///
/// t1: c1, salary 100, equity 0.1. t2: c2, salary 200, no equity.
/// t3: c3, salary 300, equity 0.5.
pub async fn seed(tx: &Transaction<'_>) -> JobResult<Seeded> {
    for table in ["applications", "users", "jobs", "companies"] {
        tx.execute(&format!("DELETE FROM {table}"), &[])
            .await
            .map_err(JobError::from_db_error)?;
    }

    for n in 1..=3 {
        Company::create(
            tx,
            &NewCompany {
                handle: format!("c{n}"),
                name: format!("C{n}"),
                description: format!("Desc{n}"),
                num_employees: Some(n),
                logo_url: Some(format!("http://c{n}.img")),
            },
        )
        .await?;
    }

    let jobs = [
        ("t1", 100, Some("0.1"), "c1"),
        ("t2", 200, None, "c2"),
        ("t3", 300, Some("0.5"), "c3"),
    ];
    let mut job_ids = [0; 3];
    for (i, (title, salary, equity, handle)) in jobs.into_iter().enumerate() {
        let job = Job::create(
            tx,
            &NewJob {
                title: title.into(),
                salary: Some(salary),
                equity: equity.map(|e| e.parse().expect("valid decimal")),
                company_handle: handle.into(),
            },
        )
        .await?;
        job_ids[i] = job.id;
    }

    for n in 1..=2 {
        User::register(
            tx,
            &PrefixHasher,
            &NewUser {
                username: format!("u{n}"),
                password: format!("password{n}"),
                first_name: format!("U{n}F"),
                last_name: format!("U{n}L"),
                email: format!("user{n}@user.com"),
                is_admin: false,
            },
        )
        .await?;
    }

    Ok(Seeded { job_ids })
}
