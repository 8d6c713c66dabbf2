mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

fn titles(body: &Value) -> Vec<&str> {
    body["jobs"]
        .as_array()
        .map(|jobs| jobs.iter().filter_map(|j| j["title"].as_str()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn create_get_delete_round_trip() -> Result<()> {
    let server = common::start().await?;

    let res = server
        .admin(Method::POST, "/jobs")
        .json(&json!({"title": "eng", "salary": 80000, "equity": "0", "companyHandle": "c1"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = common::body(res).await?["job"].clone();
    let id = created["id"].as_i64().unwrap_or_default();
    assert!(id > 0);
    assert_eq!(created["salary"], 80000);
    assert_eq!(created["equity"], "0");
    assert_eq!(created["companyHandle"], "c1");

    let res = server.anon(Method::GET, &format!("/jobs/{}", id)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(common::body(res).await?["job"], created);

    let res = server.admin(Method::DELETE, &format!("/jobs/{}", id)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        common::body(res).await?,
        json!({ "deleted": format!("Job with id of: {}", id) })
    );

    let res = server.anon(Method::GET, &format!("/jobs/{}", id)).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn only_admins_write_jobs() -> Result<()> {
    let server = common::start().await?;
    let job = json!({"title": "eng", "companyHandle": "c1"});
    let path = format!("/jobs/{}", server.job_ids[0]);

    let res = server.user(Method::POST, "/jobs").json(&job).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .user(Method::PATCH, &path)
        .json(&json!({"title": "x"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.anon(Method::DELETE, &path).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn title_is_unique_within_a_company() -> Result<()> {
    let server = common::start().await?;

    let res = server
        .admin(Method::POST, "/jobs")
        .json(&json!({"title": "J1", "companyHandle": "c1"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .admin(Method::POST, "/jobs")
        .json(&json!({"title": "J1", "companyHandle": "c2"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn invalid_jobs_are_rejected() -> Result<()> {
    let server = common::start().await?;

    let res = server
        .admin(Method::POST, "/jobs")
        .json(&json!({"title": "eng", "companyHandle": "nope"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::body(res).await?["message"], "No company: nope");

    let res = server
        .admin(Method::POST, "/jobs")
        .json(&json!({"title": "", "salary": -5, "equity": "1.5", "companyHandle": "c1"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = common::body(res).await?;
    for field in ["title", "salary", "equity"] {
        assert!(body["field_errors"][field].is_string(), "missing error for {}", field);
    }
    Ok(())
}

#[tokio::test]
async fn listing_is_ordered_by_title() -> Result<()> {
    let server = common::start().await?;

    let res = server.anon(Method::GET, "/jobs").send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(titles(&common::body(res).await?), vec!["J1", "J2", "J3"]);
    Ok(())
}

#[tokio::test]
async fn listing_filters() -> Result<()> {
    let server = common::start().await?;

    let res = server.anon(Method::GET, "/jobs?minSalary=2").send().await?;
    assert_eq!(titles(&common::body(res).await?), vec!["J2", "J3"]);

    // J3 has zero equity
    let res = server.anon(Method::GET, "/jobs?hasEquity=true").send().await?;
    assert_eq!(titles(&common::body(res).await?), vec!["J1", "J2"]);

    let res = server
        .anon(Method::GET, "/jobs?minSalary=2&hasEquity=true&title=j")
        .send()
        .await?;
    assert_eq!(titles(&common::body(res).await?), vec!["J2"]);

    let res = server.anon(Method::GET, "/jobs?hasEquity=false").send().await?;
    assert_eq!(titles(&common::body(res).await?).len(), 3);

    let res = server.anon(Method::GET, "/jobs?minSalary=-1").send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn update_changes_supplied_fields() -> Result<()> {
    let server = common::start().await?;
    let id = server.job_ids[0];

    let res = server
        .admin(Method::PATCH, &format!("/jobs/{}", id))
        .json(&json!({"title": "J-New", "salary": null}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        common::body(res).await?,
        json!({
            "job": {
                "id": id,
                "title": "J-New",
                "salary": null,
                "equity": "0.1",
                "companyHandle": "c1"
            }
        })
    );
    Ok(())
}

#[tokio::test]
async fn update_refuses_id_and_company_handle() -> Result<()> {
    let server = common::start().await?;
    let path = format!("/jobs/{}", server.job_ids[0]);

    for body in [
        json!({"companyHandle": "c2"}),
        json!({"id": 99}),
        json!({"title": "fine", "companyHandle": "c2"}),
    ] {
        let res = server.admin(Method::PATCH, &path).json(&body).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", body);
    }

    // nothing changed
    let res = server.anon(Method::GET, &path).send().await?;
    assert_eq!(common::body(res).await?["job"]["title"], "J1");
    Ok(())
}

#[tokio::test]
async fn missing_and_malformed_ids() -> Result<()> {
    let server = common::start().await?;

    let res = server.anon(Method::GET, "/jobs/0").send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.anon(Method::GET, "/jobs/abc").send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .admin(Method::PATCH, "/jobs/0")
        .json(&json!({"title": "x"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.admin(Method::DELETE, "/jobs/0").send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
