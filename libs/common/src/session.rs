//! Signed session tokens
//!
//! A session is an HS256 JWT carrying the caller's id, email and role. It is
//! minted by the auth service on sign-in and verified again on every request
//! by both services; the role is only ever read from a verified token.

use anyhow::Result;
use axum::http::HeaderMap;
use axum_extra::{
    extract::cookie::{Cookie, CookieJar, SameSite},
    headers::{Authorization, HeaderMapExt, authorization::Bearer},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::cache::RevocationList;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session_token";

/// Default session lifetime: 30 days
const DEFAULT_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;

/// Caller role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Moderator => "MODERATOR",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "MODERATOR" => Ok(Role::Moderator),
            "ADMIN" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// User email
    pub email: String,
    /// User role
    pub role: Role,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Token id, used for revocation
    pub jti: Uuid,
}

impl Claims {
    /// Seconds until the token expires, zero if it already has
    pub fn remaining_seconds(&self) -> u64 {
        self.exp.saturating_sub(now())
    }
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Shared secret used to sign and verify tokens
    pub secret: String,
    /// Token lifetime in seconds
    pub ttl_seconds: u64,
}

impl SessionConfig {
    /// Create a new SessionConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SESSION_SECRET`: signing secret (required)
    /// - `SESSION_TTL_SECONDS`: token lifetime in seconds (default: 2592000)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("SESSION_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("SESSION_SECRET environment variable not set"))?;

        let ttl_seconds = std::env::var("SESSION_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TTL_SECONDS);

        Ok(SessionConfig {
            secret,
            ttl_seconds,
        })
    }
}

/// Signs and verifies session tokens
#[derive(Clone)]
pub struct SessionKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl SessionKeys {
    pub fn new(config: &SessionConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            ttl_seconds: config.ttl_seconds,
        }
    }

    /// Mint a token for an authenticated user
    pub fn issue(&self, id: Uuid, email: &str, role: Role) -> Result<(String, Claims)> {
        let iat = now();
        let claims = Claims {
            sub: id,
            email: email.to_string(),
            role,
            iat,
            exp: iat + self.ttl_seconds,
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok((token, claims))
    }

    /// Verify signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }
}

/// Read the session token from the `Authorization: Bearer` header or,
/// failing that, from the session cookie
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Resolve the caller's session from request headers
///
/// Missing, malformed, expired and revoked tokens all resolve to `None`.
/// Only a failure to reach the revocation store is an error.
pub async fn resolve_session(
    keys: &SessionKeys,
    revocations: &dyn RevocationList,
    headers: &HeaderMap,
) -> Result<Option<Claims>> {
    let Some(token) = session_token(headers) else {
        return Ok(None);
    };

    let claims = match keys.verify(&token) {
        Ok(claims) => claims,
        Err(e) => {
            debug!("Rejected session token: {}", e);
            return Ok(None);
        }
    };

    if revocations.is_revoked(&claims.jti.to_string()).await? {
        debug!("Rejected revoked session {}", claims.jti);
        return Ok(None);
    }

    Ok(Some(claims))
}

/// Cookie carrying a freshly issued token
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie template used to clear the session cookie
pub fn cleared_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

fn now() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header};
    use std::{collections::HashSet, sync::Mutex};

    struct Revoked(Mutex<HashSet<String>>);

    #[async_trait::async_trait]
    impl RevocationList for Revoked {
        async fn revoke(&self, token_id: &str, _ttl_seconds: u64) -> Result<()> {
            self.0.lock().unwrap().insert(token_id.to_string());
            Ok(())
        }

        async fn is_revoked(&self, token_id: &str) -> Result<bool> {
            Ok(self.0.lock().unwrap().contains(token_id))
        }
    }

    fn keys() -> SessionKeys {
        SessionKeys::new(&SessionConfig {
            secret: "test-secret".to_string(),
            ttl_seconds: 3600,
        })
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_role_round_trips_through_text() {
        for role in [Role::User, Role::Moderator, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_issue_and_verify() {
        let keys = keys();
        let id = Uuid::new_v4();
        let (token, issued) = keys.issue(id, "a@x.com", Role::Moderator).unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.role, Role::Moderator);
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let other = SessionKeys::new(&SessionConfig {
            secret: "other-secret".to_string(),
            ttl_seconds: 3600,
        });
        let (token, _) = other.issue(Uuid::new_v4(), "a@x.com", Role::Admin).unwrap();

        assert!(keys().verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let keys = keys();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            role: Role::User,
            iat: now() - 7200,
            exp: now() - 3600,
            jti: Uuid::new_v4(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn test_session_token_prefers_bearer_over_cookie() {
        let mut headers = bearer("from-header");
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("session_token=from-cookie"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("from-header"));

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session_token=from-cookie"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("from-cookie"));

        assert_eq!(session_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_resolve_session_honours_revocation() {
        let keys = keys();
        let revocations = Revoked(Mutex::new(HashSet::new()));
        let (token, claims) = keys.issue(Uuid::new_v4(), "a@x.com", Role::User).unwrap();

        let resolved = resolve_session(&keys, &revocations, &bearer(&token))
            .await
            .unwrap();
        assert_eq!(resolved.map(|c| c.sub), Some(claims.sub));

        revocations
            .revoke(&claims.jti.to_string(), claims.remaining_seconds())
            .await
            .unwrap();
        let resolved = resolve_session(&keys, &revocations, &bearer(&token))
            .await
            .unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_resolve_session_ignores_garbage() {
        let revocations = Revoked(Mutex::new(HashSet::new()));
        let resolved = resolve_session(&keys(), &revocations, &bearer("not-a-jwt"))
            .await
            .unwrap();
        assert!(resolved.is_none());
    }
}
