mod common;

use common::{seed, try_connect};
use jobboard::models::{Company, CompanyFilter, NewCompany};
use jobboard::{JobResult, UpdatePayload};

fn handles(companies: &[Company]) -> Vec<&str> {
    companies.iter().map(|c| c.handle.as_str()).collect()
}

#[tokio::test]
async fn find_all_filters_by_employee_range() -> JobResult<()> {
    let Some(mut client) = try_connect("find_all_filters_by_employee_range").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    seed(&tx).await?;

    let all = Company::find_all(&tx, &CompanyFilter::default()).await?;
    assert_eq!(handles(&all), ["c1", "c2", "c3"]);

    let range = CompanyFilter {
        min_employees: Some(2),
        max_employees: Some(3),
        name: None,
    };
    assert_eq!(handles(&Company::find_all(&tx, &range).await?), ["c2", "c3"]);

    let at_most = CompanyFilter {
        max_employees: Some(1),
        ..Default::default()
    };
    assert_eq!(handles(&Company::find_all(&tx, &at_most).await?), ["c1"]);
    Ok(())
}

#[tokio::test]
async fn find_all_filters_by_name() -> JobResult<()> {
    let Some(mut client) = try_connect("find_all_filters_by_name").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    seed(&tx).await?;

    let filter = CompanyFilter {
        name: Some("c2".into()),
        ..Default::default()
    };
    assert_eq!(handles(&Company::find_all(&tx, &filter).await?), ["c2"]);

    let none = CompanyFilter {
        name: Some("nope".into()),
        ..Default::default()
    };
    assert!(Company::find_all(&tx, &none).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn find_all_rejects_inverted_range() -> JobResult<()> {
    let Some(mut client) = try_connect("find_all_rejects_inverted_range").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    seed(&tx).await?;

    let filter = CompanyFilter {
        min_employees: Some(3),
        max_employees: Some(1),
        name: None,
    };
    let err = Company::find_all(&tx, &filter).await.unwrap_err();
    assert!(err.is_bad_request());
    Ok(())
}

#[tokio::test]
async fn create_rejects_taken_handle() -> JobResult<()> {
    let Some(mut client) = try_connect("create_rejects_taken_handle").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    seed(&tx).await?;

    let new = NewCompany {
        handle: "new".into(),
        name: "New".into(),
        description: "New Description".into(),
        num_employees: Some(1),
        logo_url: None,
    };
    let company = Company::create(&tx, &new).await?;
    assert_eq!(company.name, "New");
    assert_eq!(company.logo_url, None);

    assert!(Company::create(&tx, &new).await.unwrap_err().is_bad_request());
    Ok(())
}

#[tokio::test]
async fn create_rejects_taken_name() -> JobResult<()> {
    let Some(mut client) = try_connect("create_rejects_taken_name").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    seed(&tx).await?;

    let clash = NewCompany {
        handle: "c9".into(),
        name: "C1".into(),
        description: "Same name as c1".into(),
        num_employees: None,
        logo_url: None,
    };
    let err = Company::create(&tx, &clash).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert!(err.to_string().contains("C1"));
    Ok(())
}

#[tokio::test]
async fn update_rejects_taken_name() -> JobResult<()> {
    let Some(mut client) = try_connect("update_rejects_taken_name").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    seed(&tx).await?;

    let rename = UpdatePayload::new().with("name", "C1");
    let err = Company::update(&tx, "c2", &rename).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert!(err.is_bad_request());
    Ok(())
}

#[tokio::test]
async fn get_includes_jobs_in_id_order() -> JobResult<()> {
    let Some(mut client) = try_connect("get_includes_jobs_in_id_order").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    let seeded = seed(&tx).await?;

    let detail = Company::get(&tx, "c1").await?;
    assert_eq!(detail.company.name, "C1");
    assert_eq!(detail.jobs.len(), 1);
    assert_eq!(detail.jobs[0].id, seeded.job_ids[0]);
    assert_eq!(detail.jobs[0].title, "t1");

    assert!(Company::get(&tx, "nope").await.unwrap_err().is_not_found());
    Ok(())
}

#[tokio::test]
async fn update_maps_request_fields_to_columns() -> JobResult<()> {
    let Some(mut client) = try_connect("update_maps_request_fields_to_columns").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    seed(&tx).await?;

    let data: UpdatePayload = serde_json::from_str(
        r#"{"name": "New", "numEmployees": 10, "logoUrl": null}"#,
    )
    .unwrap();
    let company = Company::update(&tx, "c1", &data).await?;
    assert_eq!(
        company,
        Company {
            handle: "c1".into(),
            name: "New".into(),
            description: "Desc1".into(),
            num_employees: Some(10),
            logo_url: None,
        }
    );

    let handle_change = UpdatePayload::new().with("handle", "c9");
    let err = Company::update(&tx, "c1", &handle_change).await.unwrap_err();
    assert!(err.is_bad_request());

    let name = UpdatePayload::new().with("name", "x");
    assert!(Company::update(&tx, "nope", &name).await.unwrap_err().is_not_found());
    Ok(())
}

#[tokio::test]
async fn remove_cascades_to_jobs() -> JobResult<()> {
    let Some(mut client) = try_connect("remove_cascades_to_jobs").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    let seeded = seed(&tx).await?;

    Company::remove(&tx, "c1").await?;
    assert!(Company::get(&tx, "c1").await.unwrap_err().is_not_found());
    assert!(
        jobboard::models::Job::get(&tx, seeded.job_ids[0])
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(Company::remove(&tx, "c1").await.unwrap_err().is_not_found());
    Ok(())
}
