//! Session resolution middleware and the authenticated-user extractor

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use common::session::{Claims, Role, resolve_session};
use tracing::error;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Authenticated user information, taken from a verified session token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Resolve the caller's session and attach it to the request
///
/// Requests without a usable session pass through anonymously; handlers that
/// need a session reject them through the [`AuthUser`] extractor.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = resolve_session(&state.sessions, state.revocations.as_ref(), req.headers())
        .await
        .map_err(|e| {
            error!("Failed to resolve session: {}", e);
            ApiError::InternalServerError
        })?;

    if let Some(claims) = claims {
        req.extensions_mut().insert(AuthUser::from(claims));
    }

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(ApiError::Unauthorized)
    }
}
