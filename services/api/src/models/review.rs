//! Review models for the API service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::NumericInput;

/// Review record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: i64,
    pub user_id: Uuid,
    pub movie_id: i64,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Review joined with its author's email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ReviewWithAuthor {
    pub id: i64,
    pub user_id: Uuid,
    pub user_email: String,
    pub movie_id: i64,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Raw review submission
#[derive(Debug, Default, Deserialize)]
pub struct ReviewPayload {
    pub movie_id: Option<NumericInput>,
    pub rating: Option<NumericInput>,
    pub comment: Option<String>,
}

/// Raw review edit
#[derive(Debug, Default, Deserialize)]
pub struct ReviewUpdatePayload {
    pub rating: Option<NumericInput>,
    pub comment: Option<String>,
}

/// Query parameters for review listing
#[derive(Debug, Default, Deserialize)]
pub struct ReviewQuery {
    /// Restrict to one movie's reviews
    pub movie_id: Option<String>,
}

/// Validated review ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub user_id: Uuid,
    pub movie_id: i64,
    pub rating: i32,
    pub comment: String,
}

/// Validated review edit
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewChanges {
    pub rating: i32,
    pub comment: String,
}
