use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use std::convert::Infallible;

use crate::{error::AppError, AppState};

/// The authenticated identity carried by a bearer token. Handlers and
/// resolvers trust it as-is; no further identity checks are performed.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
}

/// Like `AuthUser` but never rejects; used by endpoints that behave
/// differently for anonymous and authenticated callers (e.g. poll listings
/// annotating the viewer's own vote).
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthenticated("Access token required".to_string()))?;

        state
            .auth_service
            .validate_token(token)
            .map_err(|_| AppError::Unauthenticated("Invalid or expired token".to_string()))
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = bearer_token(&parts.headers)
            .and_then(|token| state.auth_service.validate_token(token).ok());

        Ok(MaybeAuthUser(user))
    }
}
