use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{validate_jwt, Claims};
use crate::state::AppState;

/// Decoded claims of the request's bearer token
#[derive(Clone, Debug)]
pub struct AuthUser(pub Claims);

/// Global JWT middleware. A valid bearer token stores `AuthUser` in the
/// request extensions; a missing or bad token leaves the request anonymous
/// and the authorization extractors decide whether that is acceptable.
pub async fn authenticate_jwt(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_bearer(&headers) {
        match validate_jwt(token, &state.config.security.jwt_secret) {
            Ok(claims) => {
                tracing::debug!("Authenticated {} (admin: {})", claims.username, claims.is_admin);
                request.extensions_mut().insert(AuthUser(claims));
            }
            Err(e) => tracing::warn!("Ignoring rejected token: {}", e),
        }
    }

    next.run(request).await
}

/// Extract JWT token from Authorization header
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let auth_str = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}
