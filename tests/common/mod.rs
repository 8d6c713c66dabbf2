#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::{json, Value};

use jobly_api::auth::create_token;
use jobly_api::config::AppConfig;
use jobly_api::database::models::{NewCompany, NewJob, NewUser, User};
use jobly_api::gateway::Store;
use jobly_api::{router, AppState};

/// An in-process server on its own port, backed by a freshly seeded store.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    /// admin
    pub u1_token: String,
    /// not admin
    pub u2_token: String,
    /// ids of j1, j2, j3 (all at c1)
    pub job_ids: Vec<i32>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub fn admin(&self, method: Method, path: &str) -> RequestBuilder {
        self.request(method, path, Some(&self.u1_token))
    }

    pub fn user(&self, method: Method, path: &str) -> RequestBuilder {
        self.request(method, path, Some(&self.u2_token))
    }

    pub fn anon(&self, method: Method, path: &str) -> RequestBuilder {
        self.request(method, path, None)
    }
}

pub async fn start() -> Result<TestServer> {
    let config = AppConfig::test();
    let store = Store::memory(config.security.bcrypt_cost);
    let (users, job_ids) = seed(&store).await?;

    let u1_token = create_token(&users[0], &config.security)?;
    let u2_token = create_token(&users[1], &config.security)?;

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;

    let app = router(AppState::new(store, config));
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("test server stopped: {}", e);
        }
    });

    Ok(TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        client: Client::new(),
        u1_token,
        u2_token,
        job_ids,
    })
}

async fn seed(store: &Store) -> Result<(Vec<User>, Vec<i32>)> {
    for n in 1..=3 {
        store
            .companies
            .create(NewCompany {
                handle: format!("c{}", n),
                name: format!("C{}", n),
                description: format!("Desc{}", n),
                num_employees: n,
                logo_url: Some(format!("http://c{}.img", n)),
            })
            .await?;
    }

    let mut job_ids = Vec::new();
    for (title, salary, equity) in [("J1", 1, "0.1"), ("J2", 2, "0.2"), ("J3", 3, "0")] {
        let job = store
            .jobs
            .create(NewJob {
                title: title.to_string(),
                salary: Some(salary),
                equity: Some(equity.to_string()),
                company_handle: "c1".to_string(),
            })
            .await?;
        job_ids.push(job.id);
    }

    let mut users = Vec::new();
    for (username, is_admin) in [("u1", true), ("u2", false)] {
        let user = store
            .users
            .register(NewUser {
                username: username.to_string(),
                password: format!("password-{}", username),
                first_name: format!("U{}F", &username[1..]),
                last_name: format!("U{}L", &username[1..]),
                email: format!("{}@email.com", username),
                is_admin,
            })
            .await?;
        users.push(user);
    }

    Ok((users, job_ids))
}

pub fn new_company() -> Value {
    json!({
        "handle": "new",
        "name": "New",
        "description": "DescNew",
        "numEmployees": 10,
        "logoUrl": "http://new.img"
    })
}

pub async fn body(response: reqwest::Response) -> Result<Value> {
    Ok(response.json::<Value>().await?)
}
