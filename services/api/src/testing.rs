//! In-memory collaborators for router tests

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, header},
    response::Response,
};
use chrono::Utc;
use common::{
    cache::RevocationList,
    error::{DatabaseError, DatabaseResult},
    session::{Role, SessionConfig, SessionKeys},
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    models::{Movie, MovieFields, MovieSummary, NewReview, Review, ReviewChanges, ReviewWithAuthor},
    repositories::{MovieRepository, ReviewRepository},
    state::AppState,
};

#[derive(Default)]
struct Tables {
    movies: Vec<Movie>,
    reviews: Vec<Review>,
    emails: HashMap<Uuid, String>,
    next_movie_id: i64,
    next_review_id: i64,
}

/// Movies, reviews and user emails behind one lock, with cascade and
/// foreign-key behaviour matching the schema
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    /// Make the next review delete lose a race with another request
    lose_review_delete: AtomicBool,
}

impl MemoryStore {
    pub fn add_user(&self, id: Uuid, email: &str) {
        self.tables
            .lock()
            .unwrap()
            .emails
            .insert(id, email.to_string());
    }

    /// The next review delete finds its row already removed by a
    /// concurrent request
    pub fn race_next_review_delete(&self) {
        self.lose_review_delete.store(true, Ordering::SeqCst);
    }

    pub fn review_count(&self) -> usize {
        self.tables.lock().unwrap().reviews.len()
    }
}

#[async_trait]
impl MovieRepository for MemoryStore {
    async fn list(&self) -> DatabaseResult<Vec<Movie>> {
        let mut movies = self.tables.lock().unwrap().movies.clone();
        movies.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(movies)
    }

    async fn list_catalog(&self) -> DatabaseResult<Vec<MovieSummary>> {
        let mut movies: Vec<MovieSummary> = self
            .tables
            .lock()
            .unwrap()
            .movies
            .iter()
            .map(|m| MovieSummary {
                id: m.id,
                title: m.title.clone(),
                year: m.year,
            })
            .collect();
        movies.sort_by_key(|m| m.id);
        Ok(movies)
    }

    async fn get(&self, id: i64) -> DatabaseResult<Option<Movie>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .movies
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn create(&self, fields: &MovieFields) -> DatabaseResult<Movie> {
        let mut tables = self.tables.lock().unwrap();
        tables.next_movie_id += 1;
        let movie = Movie {
            id: tables.next_movie_id,
            title: fields.title.clone(),
            description: fields.description.clone(),
            year: fields.year,
            genre: fields.genre.clone(),
            created_at: Utc::now(),
        };
        tables.movies.push(movie.clone());
        Ok(movie)
    }

    async fn update(&self, id: i64, fields: &MovieFields) -> DatabaseResult<Option<Movie>> {
        let mut tables = self.tables.lock().unwrap();
        let Some(movie) = tables.movies.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        movie.title = fields.title.clone();
        movie.description = fields.description.clone();
        movie.year = fields.year;
        movie.genre = fields.genre.clone();
        Ok(Some(movie.clone()))
    }

    async fn delete(&self, id: i64) -> DatabaseResult<u64> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.movies.len();
        tables.movies.retain(|m| m.id != id);
        tables.reviews.retain(|r| r.movie_id != id);
        Ok((before - tables.movies.len()) as u64)
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn list_all(&self) -> DatabaseResult<Vec<Review>> {
        let mut reviews = self.tables.lock().unwrap().reviews.clone();
        reviews.sort_by_key(|r| r.id);
        Ok(reviews)
    }

    async fn list_by_movie(&self, movie_id: i64) -> DatabaseResult<Vec<ReviewWithAuthor>> {
        let tables = self.tables.lock().unwrap();
        let mut reviews: Vec<ReviewWithAuthor> = tables
            .reviews
            .iter()
            .filter(|r| r.movie_id == movie_id)
            .filter_map(|r| {
                tables.emails.get(&r.user_id).map(|email| ReviewWithAuthor {
                    id: r.id,
                    user_id: r.user_id,
                    user_email: email.clone(),
                    movie_id: r.movie_id,
                    rating: r.rating,
                    comment: r.comment.clone(),
                    created_at: r.created_at,
                })
            })
            .collect();
        reviews.sort_by_key(|r| (r.created_at, r.id));
        Ok(reviews)
    }

    async fn get(&self, id: i64) -> DatabaseResult<Option<Review>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .reviews
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn create(&self, review: &NewReview) -> DatabaseResult<Review> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.movies.iter().any(|m| m.id == review.movie_id) {
            return Err(DatabaseError::ForeignKeyViolation(
                "reviews_movie_id_fkey".to_string(),
            ));
        }
        if !tables.emails.contains_key(&review.user_id) {
            return Err(DatabaseError::ForeignKeyViolation(
                "reviews_user_id_fkey".to_string(),
            ));
        }

        tables.next_review_id += 1;
        let review = Review {
            id: tables.next_review_id,
            user_id: review.user_id,
            movie_id: review.movie_id,
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: Utc::now(),
        };
        tables.reviews.push(review.clone());
        Ok(review)
    }

    async fn update(&self, id: i64, changes: &ReviewChanges) -> DatabaseResult<Option<Review>> {
        let mut tables = self.tables.lock().unwrap();
        let Some(review) = tables.reviews.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        review.rating = changes.rating;
        review.comment = changes.comment.clone();
        Ok(Some(review.clone()))
    }

    async fn delete(&self, id: i64) -> DatabaseResult<u64> {
        let mut tables = self.tables.lock().unwrap();
        if self.lose_review_delete.swap(false, Ordering::SeqCst) {
            tables.reviews.retain(|r| r.id != id);
            return Ok(0);
        }
        let before = tables.reviews.len();
        tables.reviews.retain(|r| r.id != id);
        Ok((before - tables.reviews.len()) as u64)
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

/// A signed-in test user
pub struct TestUser {
    pub id: Uuid,
    pub token: String,
    pub jti: String,
}

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub revocations: Arc<MemoryRevocations>,
    pub keys: SessionKeys,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::default()),
            revocations: Arc::new(MemoryRevocations::default()),
            keys: SessionKeys::new(&SessionConfig {
                secret: "test-secret".to_string(),
                ttl_seconds: 3600,
            }),
        }
    }

    pub fn state(&self) -> AppState {
        AppState {
            movies: self.store.clone(),
            reviews: self.store.clone(),
            sessions: self.keys.clone(),
            revocations: self.revocations.clone(),
            sign_in_path: "/auth/signin".to_string(),
        }
    }

    /// Register a user in the store and mint a session token for them
    pub fn sign_in(&self, email: &str, role: Role) -> TestUser {
        let id = Uuid::new_v4();
        self.store.add_user(id, email);
        let (token, claims) = self.keys.issue(id, email, role).unwrap();
        TestUser {
            id,
            token,
            jti: claims.jti.to_string(),
        }
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
