// handlers/protected/users.rs - /users and /users/:username/jobs/:job_id

use axum::extract::{Path, State};
use serde_json::{json, Value};

use crate::auth::create_token;
use crate::database::models::NewUser;
use crate::handlers::{into_model, parse_job_id, validated, JsonBody};
use crate::middleware::{AdminUser, ApiResponse, ApiResult, SelfOrAdmin};
use crate::schemas::definitions::{USER_NEW, USER_UPDATE};
use crate::state::AppState;

/// POST /users - admin creates a user (optionally an admin) and gets their token
pub async fn create(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    body: JsonBody,
) -> ApiResult<Value> {
    let new_user: NewUser = into_model(validated(body, &USER_NEW)?)?;
    let user = state.store.users.register(new_user).await?;
    let token = create_token(&user, &state.config.security)?;

    tracing::info!("{} created user {}", admin.username, user.username);
    Ok(ApiResponse::created(json!({ "user": user, "token": token })))
}

/// GET /users
pub async fn list(AdminUser(_): AdminUser, State(state): State<AppState>) -> ApiResult<Value> {
    let users = state.store.users.find_all().await?;
    Ok(ApiResponse::ok(json!({ "users": users })))
}

/// GET /users/:username - includes applied job ids
pub async fn get(caller: SelfOrAdmin, State(state): State<AppState>) -> ApiResult<Value> {
    caller.authorize()?;
    let user = state.store.users.get(&caller.username).await?;
    Ok(ApiResponse::ok(json!({ "user": user })))
}

/// PATCH /users/:username
pub async fn update(
    caller: SelfOrAdmin,
    State(state): State<AppState>,
    body: JsonBody,
) -> ApiResult<Value> {
    let fields = validated(body, &USER_UPDATE)?;
    caller.authorize()?;
    let user = state.store.users.update(&caller.username, fields).await?;
    Ok(ApiResponse::ok(json!({ "user": user })))
}

/// DELETE /users/:username
pub async fn remove(caller: SelfOrAdmin, State(state): State<AppState>) -> ApiResult<Value> {
    caller.authorize()?;
    state.store.users.remove(&caller.username).await?;
    Ok(ApiResponse::ok(json!({ "deleted": caller.username })))
}

/// POST /users/:username/jobs/:job_id
pub async fn apply(
    caller: SelfOrAdmin,
    State(state): State<AppState>,
    Path((_, job_id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let job_id = parse_job_id(&job_id)?;
    caller.authorize()?;
    state.store.users.apply(&caller.username, job_id).await?;
    Ok(ApiResponse::created(json!({ "applied": job_id })))
}
