// handlers/protected/jobs.rs - admin writes on /jobs

use axum::extract::{Path, State};
use serde_json::{json, Value};

use crate::database::models::NewJob;
use crate::handlers::{into_model, parse_job_id, validated, JsonBody};
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::schemas::definitions::{JOB_NEW, JOB_UPDATE};
use crate::state::AppState;

/// POST /jobs
pub async fn create(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    body: JsonBody,
) -> ApiResult<Value> {
    let job: NewJob = into_model(validated(body, &JOB_NEW)?)?;
    let job = state.store.jobs.create(job).await?;
    Ok(ApiResponse::created(json!({ "job": job })))
}

/// PATCH /jobs/:id - `id` and `companyHandle` are refused by the schema
pub async fn update(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<Value> {
    let id = parse_job_id(&id)?;
    let fields = validated(body, &JOB_UPDATE)?;
    let job = state.store.jobs.update(id, fields).await?;
    Ok(ApiResponse::ok(json!({ "job": job })))
}

/// DELETE /jobs/:id
pub async fn remove(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_job_id(&id)?;
    state.store.jobs.remove(id).await?;
    Ok(ApiResponse::ok(json!({ "deleted": format!("Job with id of: {}", id) })))
}
