use std::sync::Arc;

use anyhow::Result;
use tracing::info;

mod error;
mod models;
mod password;
mod repositories;
mod routes;
#[cfg(test)]
mod testing;
mod validation;

use common::{
    cache::{RedisConfig, RedisPool, RevocationList},
    database::{self, DatabaseConfig},
    session::{SessionConfig, SessionKeys},
    settings::ServerSettings,
    telemetry,
};

use crate::{
    password::PasswordService,
    repositories::{PgUserRepository, UserRepository},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub sessions: SessionKeys,
    pub revocations: Arc<dyn RevocationList>,
    pub passwords: PasswordService,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    info!("Starting authentication service");

    let settings = ServerSettings::load("AUTH", 3000)?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool).await?;

    // Session signing keys
    let session_config = SessionConfig::from_env()?;
    let sessions = SessionKeys::new(&session_config);

    // Initialize Redis client for session revocation
    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;

    if redis_pool.health_check().await? {
        info!("Redis connection successful");
    } else {
        anyhow::bail!("Failed to connect to Redis");
    }

    let app_state = AppState {
        users: Arc::new(PgUserRepository::new(pool)),
        sessions,
        revocations: Arc::new(redis_pool),
        passwords: PasswordService::default(),
    };

    info!("Authentication service initialized successfully");

    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(settings.bind_address()).await?;
    info!("Authentication service listening on {}", settings.bind_address());

    axum::serve(listener, app).await?;

    Ok(())
}
