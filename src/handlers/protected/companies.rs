// handlers/protected/companies.rs - admin writes on /companies

use axum::extract::{Path, State};
use serde_json::{json, Value};

use crate::database::models::NewCompany;
use crate::handlers::{into_model, validated, JsonBody};
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::schemas::definitions::{COMPANY_NEW, COMPANY_UPDATE};
use crate::state::AppState;

/// POST /companies
pub async fn create(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    body: JsonBody,
) -> ApiResult<Value> {
    let company: NewCompany = into_model(validated(body, &COMPANY_NEW)?)?;
    let company = state.store.companies.create(company).await?;
    Ok(ApiResponse::created(json!({ "company": company })))
}

/// PATCH /companies/:handle
pub async fn update(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(handle): Path<String>,
    body: JsonBody,
) -> ApiResult<Value> {
    let fields = validated(body, &COMPANY_UPDATE)?;
    let company = state.store.companies.update(&handle, fields).await?;
    Ok(ApiResponse::ok(json!({ "company": company })))
}

/// DELETE /companies/:handle
pub async fn remove(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> ApiResult<Value> {
    state.store.companies.remove(&handle).await?;
    Ok(ApiResponse::ok(json!({ "deleted": handle })))
}
