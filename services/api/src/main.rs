use std::sync::Arc;

use anyhow::Result;
use tracing::info;

mod error;
mod guard;
mod middleware;
mod models;
mod repositories;
mod routes;
mod state;
#[cfg(test)]
mod testing;
mod validation;
mod views;

use common::{
    cache::{RedisConfig, RedisPool},
    database::{self, DatabaseConfig},
    session::{SessionConfig, SessionKeys},
    settings::ServerSettings,
    telemetry,
};

use crate::{
    repositories::{PgMovieRepository, PgReviewRepository},
    state::AppState,
};

const DEFAULT_SIGN_IN_PATH: &str = "/auth/signin";

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    info!("Starting API service");

    let settings = ServerSettings::load("API", 3001)?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool).await?;

    let session_config = SessionConfig::from_env()?;
    let sessions = SessionKeys::new(&session_config);

    // Sessions signed out through the auth service are revoked in Redis
    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;

    if redis_pool.health_check().await? {
        info!("Redis connection successful");
    } else {
        anyhow::bail!("Failed to connect to Redis");
    }

    let sign_in_path = std::env::var("API_SIGN_IN_PATH")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SIGN_IN_PATH.to_string());

    let app_state = AppState {
        movies: Arc::new(PgMovieRepository::new(pool.clone())),
        reviews: Arc::new(PgReviewRepository::new(pool)),
        sessions,
        revocations: Arc::new(redis_pool),
        sign_in_path,
    };

    info!("API service initialized successfully");

    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(settings.bind_address()).await?;
    info!("API service listening on {}", settings.bind_address());

    axum::serve(listener, app).await?;

    Ok(())
}
