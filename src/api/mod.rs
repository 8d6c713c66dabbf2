//! Route table and global layers.

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::authenticate_jwt;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(public::system::root))
        .route("/health", get(public::system::health))
        .merge(auth_routes())
        .merge(company_routes())
        .merge(job_routes())
        .merge(user_routes())
        .layer(middleware::from_fn_with_state(state.clone(), authenticate_jwt));

    if let Some(cors) = cors_layer(&state.config.security) {
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/token", post(auth::token))
        .route("/auth/register", post(auth::register))
}

fn company_routes() -> Router<AppState> {
    use protected::companies as admin;
    use public::companies;

    Router::new()
        .route("/companies", get(companies::list).post(admin::create))
        .route(
            "/companies/:handle",
            get(companies::get).patch(admin::update).delete(admin::remove),
        )
}

fn job_routes() -> Router<AppState> {
    use protected::jobs as admin;
    use public::jobs;

    Router::new()
        .route("/jobs", get(jobs::list).post(admin::create))
        .route("/jobs/:id", get(jobs::get).patch(admin::update).delete(admin::remove))
}

fn user_routes() -> Router<AppState> {
    use protected::users;

    Router::new()
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/:username",
            get(users::get).patch(users::update).delete(users::remove),
        )
        .route("/users/:username/jobs/:job_id", post(users::apply))
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }
    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Skipping invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::permissive().allow_origin(AllowOrigin::list(origins)),
    )
}
