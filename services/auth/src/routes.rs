//! Authentication service routes

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use chrono::DateTime;
use common::{
    error::DatabaseError,
    session::{Role, cleared_session_cookie, resolve_session, session_cookie},
};
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    AppState,
    error::{AuthError, AuthResult, JsonBody},
    models::{
        NewUser, UserResponse,
        user::{RegisterRequest, SessionResponse, SignInRequest, SignInResponse},
    },
    validation::{validate_email, validate_password},
};

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/auth/register",
            post(register).fallback(method_not_allowed),
        )
        .route(
            "/auth/session",
            post(sign_in)
                .get(current_session)
                .delete(sign_out)
                .fallback(method_not_allowed),
        )
        .fallback(not_found)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

async fn method_not_allowed() -> AuthError {
    AuthError::MethodNotAllowed
}

async fn not_found() -> AuthError {
    AuthError::NotFound
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Registration endpoint
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> AuthResult<impl IntoResponse> {
    let (Some(email), Some(password)) = (non_empty(payload.email), non_empty(payload.password))
    else {
        return Err(AuthError::BadRequest("Missing email or password".to_string()));
    };

    validate_email(&email).map_err(AuthError::BadRequest)?;
    validate_password(&password).map_err(AuthError::BadRequest)?;

    if state.users.email_exists(&email).await? {
        info!("Registration rejected, email already in use: {}", email);
        return Err(AuthError::Conflict);
    }

    let password_hash = state.passwords.hash(password).await.map_err(|e| {
        error!("Failed to hash password: {}", e);
        AuthError::InternalServerError
    })?;

    let new_user = NewUser {
        email,
        password_hash,
        role: Role::User,
    };

    // The pre-check above can race with a concurrent registration
    let user = match state.users.create(&new_user).await {
        Ok(user) => user,
        Err(DatabaseError::UniqueViolation(_)) => return Err(AuthError::Conflict),
        Err(e) => return Err(e.into()),
    };

    info!("Registered user {} ({})", user.id, user.email);

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// Credential sign-in endpoint
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(payload): JsonBody<SignInRequest>,
) -> AuthResult<impl IntoResponse> {
    let (Some(email), Some(password)) = (non_empty(payload.email), non_empty(payload.password))
    else {
        warn!("Sign-in attempt with incomplete credentials");
        return Err(AuthError::InvalidCredentials);
    };

    let Some(user) = state.users.find_by_email(&email).await? else {
        // Unknown emails pay the same argon2 cost as wrong passwords
        if let Err(e) = state.passwords.verify_unknown(password).await {
            error!("Failed to hash password: {}", e);
        }
        warn!("Sign-in failed, unknown email: {}", email);
        return Err(AuthError::InvalidCredentials);
    };

    let valid = state
        .passwords
        .verify(password, user.password_hash.clone())
        .await
        .map_err(|e| {
            error!("Failed to verify password for user {}: {}", user.id, e);
            AuthError::InternalServerError
        })?;

    if !valid {
        warn!("Sign-in failed, wrong password: {}", email);
        return Err(AuthError::InvalidCredentials);
    }

    let (token, _) = state
        .sessions
        .issue(user.id, &user.email, user.role)
        .map_err(|e| {
            error!("Failed to issue session token: {}", e);
            AuthError::InternalServerError
        })?;

    info!("User {} signed in with role {}", user.id, user.role);

    let response = SignInResponse {
        access_token: token.clone(),
        token_type: "Bearer".to_string(),
        expires_in: state.sessions.ttl_seconds(),
        user: UserResponse::from(&user),
    };

    Ok((jar.add(session_cookie(token)), Json(response)))
}

/// Current session endpoint
pub async fn current_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse> {
    let claims = resolve_session(&state.sessions, state.revocations.as_ref(), &headers)
        .await
        .map_err(|e| {
            error!("Failed to resolve session: {}", e);
            AuthError::InternalServerError
        })?
        .ok_or(AuthError::Unauthorized)?;

    let expires_at = DateTime::from_timestamp(claims.exp as i64, 0).ok_or_else(|| {
        error!("Session {} carries an out-of-range expiry", claims.jti);
        AuthError::InternalServerError
    })?;

    Ok(Json(SessionResponse {
        user: UserResponse::from(&claims),
        expires_at,
    }))
}

/// Sign-out endpoint
pub async fn sign_out(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse> {
    let claims = resolve_session(&state.sessions, state.revocations.as_ref(), &headers)
        .await
        .map_err(|e| {
            error!("Failed to resolve session: {}", e);
            AuthError::InternalServerError
        })?
        .ok_or(AuthError::Unauthorized)?;

    state
        .revocations
        .revoke(&claims.jti.to_string(), claims.remaining_seconds())
        .await
        .map_err(|e| {
            error!("Failed to revoke session {}: {}", claims.jti, e);
            AuthError::InternalServerError
        })?;

    info!("User {} signed out", claims.sub);

    Ok((
        jar.remove(cleared_session_cookie()),
        Json(json!({"message": "Signed out"})),
    ))
}
