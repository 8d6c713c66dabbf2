mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

fn handles(body: &Value) -> Vec<&str> {
    body["companies"]
        .as_array()
        .map(|companies| companies.iter().filter_map(|c| c["handle"].as_str()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn admin_creates_a_company() -> Result<()> {
    let server = common::start().await?;

    let res = server
        .admin(Method::POST, "/companies")
        .json(&common::new_company())
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(common::body(res).await?, json!({ "company": common::new_company() }));
    Ok(())
}

#[tokio::test]
async fn non_admin_and_anonymous_cannot_create() -> Result<()> {
    let server = common::start().await?;

    let res = server
        .user(Method::POST, "/companies")
        .json(&common::new_company())
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .anon(Method::POST, "/companies")
        .json(&common::new_company())
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn duplicate_and_invalid_companies_are_bad_requests() -> Result<()> {
    let server = common::start().await?;

    let mut duplicate = common::new_company();
    duplicate["handle"] = json!("c1");
    let res = server.admin(Method::POST, "/companies").json(&duplicate).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .admin(Method::POST, "/companies")
        .json(&json!({"handle": "new", "numEmployees": "ten", "logoUrl": "not-a-url"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = common::body(res).await?;
    for field in ["name", "description", "numEmployees", "logoUrl"] {
        assert!(body["field_errors"][field].is_string(), "missing error for {}", field);
    }
    Ok(())
}

#[tokio::test]
async fn listing_is_public_and_ordered_by_name() -> Result<()> {
    let server = common::start().await?;

    let res = server.anon(Method::GET, "/companies").send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = common::body(res).await?;
    assert_eq!(handles(&body), vec!["c1", "c2", "c3"]);
    assert_eq!(body["companies"][0]["numEmployees"], 1);
    Ok(())
}

#[tokio::test]
async fn filters_combine_with_and() -> Result<()> {
    let server = common::start().await?;

    let res = server
        .anon(Method::GET, "/companies?minEmployees=2&maxEmployees=3")
        .send()
        .await?;
    assert_eq!(handles(&common::body(res).await?), vec!["c2", "c3"]);

    // c1 matches the name, c3 matches the range; neither matches both
    let res = server
        .anon(Method::GET, "/companies?name=1&minEmployees=3")
        .send()
        .await?;
    assert!(handles(&common::body(res).await?).is_empty());

    let res = server.anon(Method::GET, "/companies?name=C2").send().await?;
    assert_eq!(handles(&common::body(res).await?), vec!["c2"]);
    Ok(())
}

#[tokio::test]
async fn bad_filters_are_rejected() -> Result<()> {
    let server = common::start().await?;

    for query in [
        "/companies?minEmployees=5&maxEmployees=1",
        "/companies?minEmployees=lots",
        "/companies?color=blue",
    ] {
        let res = server.anon(Method::GET, query).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", query);
    }
    Ok(())
}

#[tokio::test]
async fn detail_includes_jobs_by_id() -> Result<()> {
    let server = common::start().await?;

    let res = server.anon(Method::GET, "/companies/c1").send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = common::body(res).await?;
    assert_eq!(body["company"]["handle"], "c1");

    let ids: Vec<i64> = body["company"]["jobs"]
        .as_array()
        .map(|jobs| jobs.iter().filter_map(|j| j["id"].as_i64()).collect())
        .unwrap_or_default();
    let expected: Vec<i64> = server.job_ids.iter().map(|&id| id as i64).collect();
    assert_eq!(ids, expected);
    assert_eq!(body["company"]["jobs"][0]["equity"], "0.1");
    assert!(body["company"]["jobs"][0].get("companyHandle").is_none());

    let res = server.anon(Method::GET, "/companies/c2").send().await?;
    assert_eq!(common::body(res).await?["company"]["jobs"], json!([]));
    Ok(())
}

#[tokio::test]
async fn missing_company_is_not_found() -> Result<()> {
    let server = common::start().await?;

    let res = server.anon(Method::GET, "/companies/nope").send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn admin_updates_only_supplied_fields() -> Result<()> {
    let server = common::start().await?;

    let res = server
        .admin(Method::PATCH, "/companies/c1")
        .json(&json!({"name": "C1-new", "logoUrl": null}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        common::body(res).await?,
        json!({
            "company": {
                "handle": "c1",
                "name": "C1-new",
                "description": "Desc1",
                "numEmployees": 1,
                "logoUrl": null
            }
        })
    );
    Ok(())
}

#[tokio::test]
async fn update_rejections() -> Result<()> {
    let server = common::start().await?;

    let res = server
        .user(Method::PATCH, "/companies/c1")
        .json(&json!({"name": "x"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .admin(Method::PATCH, "/companies/c1")
        .json(&json!({"handle": "c1-new"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .admin(Method::PATCH, "/companies/c1")
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::body(res).await?["message"], "No data");

    let res = server
        .admin(Method::PATCH, "/companies/nope")
        .json(&json!({"name": "x"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn delete_cascades_to_jobs() -> Result<()> {
    let server = common::start().await?;

    let res = server.user(Method::DELETE, "/companies/c1").send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.admin(Method::DELETE, "/companies/c1").send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(common::body(res).await?, json!({ "deleted": "c1" }));

    let job = server
        .anon(Method::GET, &format!("/jobs/{}", server.job_ids[0]))
        .send()
        .await?;
    assert_eq!(job.status(), StatusCode::NOT_FOUND);

    let res = server.admin(Method::DELETE, "/companies/c1").send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
