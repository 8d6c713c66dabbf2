//! Authorization extractors.
//!
//! `AdminUser` applies its policy during extraction. `SelfOrAdmin` only
//! requires a token; the handler calls [`SelfOrAdmin::authorize`] once the
//! request shape is validated and before any record is looked up.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use super::auth::AuthUser;
use crate::auth::policy::{is_admin, is_self_or_admin};
use crate::auth::Claims;
use crate::error::ApiError;

const UNAUTHORIZED: &str = "Unauthorized";

fn claims(parts: &Parts) -> Result<Claims, ApiError> {
    parts
        .extensions
        .get::<AuthUser>()
        .map(|AuthUser(claims)| claims.clone())
        .ok_or_else(|| {
            tracing::warn!("Denied anonymous {} {}", parts.method, parts.uri.path());
            ApiError::unauthorized(UNAUTHORIZED)
        })
}

/// Caller holding an admin token
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = claims(parts)?;
        if !is_admin(&claims) {
            tracing::warn!("Denied {} admin access to {}", claims.username, parts.uri.path());
            return Err(ApiError::unauthorized(UNAUTHORIZED));
        }
        Ok(AdminUser(claims))
    }
}

/// Authenticated caller addressing the `:username` path segment
#[derive(Debug, Clone)]
pub struct SelfOrAdmin {
    pub claims: Claims,
    pub username: String,
}

impl SelfOrAdmin {
    /// Allows the named user or any admin. Does not consult the store.
    pub fn authorize(&self) -> Result<(), ApiError> {
        if is_self_or_admin(&self.claims, &self.username) {
            return Ok(());
        }
        tracing::warn!("Denied {} access to user {}", self.claims.username, self.username);
        Err(ApiError::unauthorized(UNAUTHORIZED))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SelfOrAdmin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let claims = claims(parts)?;

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::bad_request("Missing username"))?;
        let username = params
            .get("username")
            .cloned()
            .ok_or_else(|| ApiError::bad_request("Missing username"))?;

        Ok(SelfOrAdmin { claims, username })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    fn parts(claims: Option<Claims>) -> Parts {
        let (mut parts, _) = Request::builder()
            .uri("/companies")
            .body(())
            .unwrap()
            .into_parts();
        if let Some(claims) = claims {
            parts.extensions.insert(AuthUser(claims));
        }
        parts
    }

    #[tokio::test]
    async fn admin_extractor_requires_admin_claims() {
        let mut admin = parts(Some(Claims::new("u1", true, 1)));
        assert!(AdminUser::from_request_parts(&mut admin, &()).await.is_ok());

        let mut user = parts(Some(Claims::new("u2", false, 1)));
        let err = AdminUser::from_request_parts(&mut user, &()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let mut anonymous = parts(None);
        let err = AdminUser::from_request_parts(&mut anonymous, &()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    fn caller(username: &str, is_admin: bool, target: &str) -> SelfOrAdmin {
        SelfOrAdmin {
            claims: Claims::new(username, is_admin, 1),
            username: target.to_string(),
        }
    }

    #[test]
    fn self_or_admin_authorizes_after_extraction() {
        assert!(caller("u2", false, "u2").authorize().is_ok());
        assert!(caller("u1", true, "u2").authorize().is_ok());

        let err = caller("u2", false, "u1").authorize().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
