// handlers/public/jobs.rs - GET /jobs, GET /jobs/:id

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use serde_json::{json, Value};

use crate::filter::JobFilter;
use crate::handlers::parse_job_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /jobs?title=&minSalary=&hasEquity=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    let filter = JobFilter::from_query(&query)?;
    let jobs = state.store.jobs.find_all(&filter).await?;
    Ok(ApiResponse::ok(json!({ "jobs": jobs })))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let job = state.store.jobs.get(parse_job_id(&id)?).await?;
    Ok(ApiResponse::ok(json!({ "job": job })))
}
