// handlers/public/companies.rs - GET /companies, GET /companies/:handle

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use serde_json::{json, Value};

use crate::filter::CompanyFilter;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /companies?name=&minEmployees=&maxEmployees=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    let filter = CompanyFilter::from_query(&query)?;
    let companies = state.store.companies.find_all(&filter).await?;
    Ok(ApiResponse::ok(json!({ "companies": companies })))
}

/// GET /companies/:handle - includes the company's jobs
pub async fn get(State(state): State<AppState>, Path(handle): Path<String>) -> ApiResult<Value> {
    let company = state.store.companies.get(&handle).await?;
    Ok(ApiResponse::ok(json!({ "company": company })))
}
