// handlers/public/auth.rs - POST /auth/token, POST /auth/register

use axum::extract::State;
use serde_json::{json, Value};

use crate::auth::create_token;
use crate::database::models::NewUser;
use crate::handlers::{into_model, validated, JsonBody};
use crate::middleware::{ApiResponse, ApiResult};
use crate::schemas::definitions::{USER_AUTH, USER_REGISTER};
use crate::state::AppState;

/// POST /auth/token - exchange username/password for a token
pub async fn token(State(state): State<AppState>, body: JsonBody) -> ApiResult<Value> {
    let fields = validated(body, &USER_AUTH)?;
    // both are required strings once validated
    let username = fields.get("username").and_then(Value::as_str).unwrap_or_default();
    let password = fields.get("password").and_then(Value::as_str).unwrap_or_default();

    let user = state.store.users.authenticate(username, password).await?;
    let token = create_token(&user, &state.config.security)?;

    tracing::info!("Issued token for {}", user.username);
    Ok(ApiResponse::ok(json!({ "token": token })))
}

/// POST /auth/register - self-service signup; never grants admin
pub async fn register(State(state): State<AppState>, body: JsonBody) -> ApiResult<Value> {
    let fields = validated(body, &USER_REGISTER)?;
    let new_user: NewUser = into_model(fields)?;

    let user = state.store.users.register(new_user).await?;
    let token = create_token(&user, &state.config.security)?;

    Ok(ApiResponse::created(json!({ "token": token })))
}
