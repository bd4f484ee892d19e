mod common;

use common::seed;
use jobboard::models::{Company, CompanyFilter, Job, JobFilter};
use jobboard::{DatabaseConfig, JobResult, TracedClient, create_pool, migrate};

#[tokio::test]
async fn pooled_client_runs_entity_operations() -> JobResult<()> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL is not set; skipping pooled_client_runs_entity_operations");
        return Ok(());
    };

    let pool = create_pool(&DatabaseConfig::new(url).pool_size(2))?;
    migrate::run_pool(&pool).await?;
    let again = migrate::run_pool(&pool).await?;
    assert!(again.applied_migrations().is_empty());

    let mut client = pool.get().await?;
    Company::find_all(&client, &CompanyFilter::default()).await?;

    let tx = client.transaction().await?;
    let seeded = seed(&tx).await?;

    let filter = JobFilter {
        min_salary: Some(150),
        ..Default::default()
    };
    let titles: Vec<String> = Job::find_all(&tx, &filter)
        .await?
        .into_iter()
        .map(|j| j.title)
        .collect();
    assert_eq!(titles, ["t2", "t3"]);

    let traced = TracedClient::new(&tx);
    let job = Job::get(&traced, seeded.job_ids[2]).await?;
    assert_eq!(job.company.handle, "c3");
    Ok(())
}
