mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::start().await?;

    let res = server.anon(Method::GET, "/health").send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = common::body(res).await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "memory");
    Ok(())
}

#[tokio::test]
async fn token_for_valid_credentials() -> Result<()> {
    let server = common::start().await?;

    let res = server
        .anon(Method::POST, "/auth/token")
        .json(&json!({"username": "u1", "password": "password-u1"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = common::body(res).await?;
    assert!(body["token"].as_str().is_some_and(|t| t.split('.').count() == 3));
    Ok(())
}

#[tokio::test]
async fn wrong_password_and_unknown_user_look_the_same() -> Result<()> {
    let server = common::start().await?;

    let wrong = server
        .anon(Method::POST, "/auth/token")
        .json(&json!({"username": "u1", "password": "nope-nope"}))
        .send()
        .await?;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let wrong = common::body(wrong).await?;

    let unknown = server
        .anon(Method::POST, "/auth/token")
        .json(&json!({"username": "ghost", "password": "password-u1"}))
        .send()
        .await?;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown = common::body(unknown).await?;

    assert_eq!(wrong["message"], unknown["message"]);
    Ok(())
}

#[tokio::test]
async fn token_request_is_validated() -> Result<()> {
    let server = common::start().await?;

    let res = server
        .anon(Method::POST, "/auth/token")
        .json(&json!({"username": 42}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = common::body(res).await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["username"].is_string());
    assert!(body["field_errors"]["password"].is_string());
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_rejected() -> Result<()> {
    let server = common::start().await?;

    let res = server
        .anon(Method::POST, "/auth/token")
        .header("content-type", "application/json")
        .body("{\"username\": ")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::body(res).await?["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn register_creates_a_non_admin_user() -> Result<()> {
    let server = common::start().await?;

    let res = server
        .anon(Method::POST, "/auth/register")
        .json(&json!({
            "username": "new",
            "password": "password",
            "firstName": "first",
            "lastName": "last",
            "email": "new@email.com"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let token = common::body(res).await?["token"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_default();

    // the new token opens the user's own record but not the admin listing
    let own = server
        .request(Method::GET, "/users/new", Some(&token))
        .send()
        .await?;
    assert_eq!(own.status(), StatusCode::OK);
    assert_eq!(common::body(own).await?["user"]["isAdmin"], false);

    let listing = server
        .request(Method::GET, "/users", Some(&token))
        .send()
        .await?;
    assert_eq!(listing.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn register_refuses_admin_flag_and_duplicates() -> Result<()> {
    let server = common::start().await?;

    let with_admin = server
        .anon(Method::POST, "/auth/register")
        .json(&json!({
            "username": "new",
            "password": "password",
            "firstName": "first",
            "lastName": "last",
            "email": "new@email.com",
            "isAdmin": true
        }))
        .send()
        .await?;
    assert_eq!(with_admin.status(), StatusCode::BAD_REQUEST);

    let duplicate = server
        .anon(Method::POST, "/auth/register")
        .json(&json!({
            "username": "u1",
            "password": "password",
            "firstName": "first",
            "lastName": "last",
            "email": "u1@email.com"
        }))
        .send()
        .await?;
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn garbage_token_is_treated_as_anonymous() -> Result<()> {
    let server = common::start().await?;

    // public routes still work
    let public = server
        .request(Method::GET, "/companies", Some("not.a.token"))
        .send()
        .await?;
    assert_eq!(public.status(), StatusCode::OK);

    let protected = server
        .request(Method::GET, "/users", Some("not.a.token"))
        .send()
        .await?;
    assert_eq!(protected.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
