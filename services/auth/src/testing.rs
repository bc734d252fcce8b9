//! In-memory collaborators for router tests

use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::Result;
use argon2::Params;
use async_trait::async_trait;
use axum::{body::Body, response::Response};
use common::{
    cache::RevocationList,
    error::{DatabaseError, DatabaseResult},
    session::{Role, SessionConfig, SessionKeys},
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    AppState,
    models::{NewUser, User},
    password::PasswordService,
    repositories::UserRepository,
};

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
    hide_existing: AtomicBool,
}

impl MemoryUserRepository {
    /// Make the existence pre-check miss, as when two registrations race
    pub fn hide_existing_emails(&self) {
        self.hide_existing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn email_exists(&self, email: &str) -> DatabaseResult<bool> {
        if self.hide_existing.load(Ordering::SeqCst) {
            return Ok(false);
        }
        Ok(self.users.lock().unwrap().iter().any(|u| u.email == email))
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(DatabaseError::UniqueViolation("users_email_key".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            role: new_user.role,
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[derive(Default)]
pub struct MemoryRevocations(Mutex<HashSet<String>>);

#[async_trait]
impl RevocationList for MemoryRevocations {
    async fn revoke(&self, token_id: &str, _ttl_seconds: u64) -> Result<()> {
        self.0.lock().unwrap().insert(token_id.to_string());
        Ok(())
    }

    async fn is_revoked(&self, token_id: &str) -> Result<bool> {
        Ok(self.0.lock().unwrap().contains(token_id))
    }
}

pub struct TestContext {
    pub users: Arc<MemoryUserRepository>,
    pub revocations: Arc<MemoryRevocations>,
    pub keys: SessionKeys,
    pub passwords: PasswordService,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::default()),
            revocations: Arc::new(MemoryRevocations::default()),
            keys: SessionKeys::new(&SessionConfig {
                secret: "test-secret".to_string(),
                ttl_seconds: 3600,
            }),
            passwords: PasswordService::with_params(Params::new(8, 1, 1, None).unwrap()),
        }
    }

    pub fn state(&self) -> AppState {
        AppState {
            users: self.users.clone(),
            sessions: self.keys.clone(),
            revocations: self.revocations.clone(),
            passwords: self.passwords.clone(),
        }
    }

    /// Insert a user directly, bypassing registration
    pub async fn seed_user(&self, email: &str, password: &str, role: Role) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: self.passwords.hash(password.to_string()).await.unwrap(),
            role,
        };
        self.users.users.lock().unwrap().push(user.clone());
        user
    }
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
