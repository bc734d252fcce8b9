//! Movie models for the API service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::validation::NumericInput;

/// Movie record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub year: i32,
    pub genre: String,
    pub created_at: DateTime<Utc>,
}

/// Catalog listing row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MovieSummary {
    pub id: i64,
    pub title: String,
    pub year: i32,
}

/// Raw movie form as submitted by the client
#[derive(Debug, Default, Deserialize)]
pub struct MoviePayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub year: Option<NumericInput>,
    pub genre: Option<String>,
}

/// Validated editable movie fields
#[derive(Debug, Clone, PartialEq)]
pub struct MovieFields {
    pub title: String,
    pub description: String,
    pub year: i32,
    pub genre: String,
}
