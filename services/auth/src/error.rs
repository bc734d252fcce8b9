//! Error types for the authentication service

use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown email, wrong password or incomplete credentials
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No valid session on the request
    #[error("Not authenticated")]
    Unauthorized,

    /// Bad request with message
    #[error("{0}")]
    BadRequest(String),

    /// Email already registered
    #[error("User already exists")]
    Conflict,

    #[error("Not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::InvalidCredentials | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::Conflict => StatusCode::CONFLICT,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AuthError::InternalServerError | AuthError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let error_message = match self {
            AuthError::Database(e) => {
                error!("Database failure: {}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::BadRequest(rejection.body_text())
    }
}

/// JSON body extractor whose rejection uses the service's error shape
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AuthError))]
pub struct JsonBody<T>(pub T);

/// Type alias for authentication results
pub type AuthResult<T> = Result<T, AuthError>;
