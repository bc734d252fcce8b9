//! Application state shared across handlers

use std::sync::Arc;

use common::{cache::RevocationList, session::SessionKeys};

use crate::repositories::{MovieRepository, ReviewRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub movies: Arc<dyn MovieRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub sessions: SessionKeys,
    pub revocations: Arc<dyn RevocationList>,
    /// Where page requests without a session are sent
    pub sign_in_path: String,
}
