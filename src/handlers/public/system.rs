// handlers/public/system.rs - GET /, GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::gateway::Backend;
use crate::state::AppState;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Jobly API",
        "version": version,
        "endpoints": {
            "auth": "/auth/token, /auth/register (public)",
            "companies": "/companies[/:handle] (read public, write admin)",
            "jobs": "/jobs[/:id] (read public, write admin)",
            "users": "/users[/:username] (admin or self)",
            "applications": "/users/:username/jobs/:job_id (admin or self)",
            "health": "/health (public)",
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = match state.store.backend() {
        Backend::Postgres(_) => "postgres",
        Backend::Memory => "memory",
    };

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "backend": backend,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "backend": backend,
                    "database": "unavailable"
                })),
            )
        }
    }
}
