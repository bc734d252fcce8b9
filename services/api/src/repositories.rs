//! Repositories for database operations
//!
//! Each repository is a trait with a PostgreSQL implementation; handlers
//! only see the traits through the shared state.

pub mod movie;
pub mod review;

pub use movie::{MovieRepository, PgMovieRepository};
pub use review::{PgReviewRepository, ReviewRepository};
