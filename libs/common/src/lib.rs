//! Common library for the movie catalog services
//!
//! This crate provides the functionality shared by the auth and API
//! services: database connectivity and migrations, the storage error
//! taxonomy, signed session tokens, session revocation, settings and
//! tracing setup.
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = init_pool(&config).await?;
//!     run_migrations(&pool).await?;
//!     println!("Database health check: {}", health_check(&pool).await?);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod database;
pub mod error;
pub mod session;
pub mod settings;
pub mod telemetry;
