//! Movie repository for database operations

use async_trait::async_trait;
use common::error::DatabaseResult;
use sqlx::PgPool;

use crate::models::{Movie, MovieFields, MovieSummary};

#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// All movies, newest first
    async fn list(&self) -> DatabaseResult<Vec<Movie>>;

    /// Id, title and year of every movie, by id
    async fn list_catalog(&self) -> DatabaseResult<Vec<MovieSummary>>;

    async fn get(&self, id: i64) -> DatabaseResult<Option<Movie>>;

    async fn create(&self, fields: &MovieFields) -> DatabaseResult<Movie>;

    /// Overwrite the editable fields; `None` when the movie does not exist
    async fn update(&self, id: i64, fields: &MovieFields) -> DatabaseResult<Option<Movie>>;

    /// Delete a movie and its reviews, returning the number of movies removed
    async fn delete(&self, id: i64) -> DatabaseResult<u64>;
}

/// PostgreSQL-backed movie repository
#[derive(Clone)]
pub struct PgMovieRepository {
    pool: PgPool,
}

impl PgMovieRepository {
    /// Create a new movie repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MovieRepository for PgMovieRepository {
    async fn list(&self) -> DatabaseResult<Vec<Movie>> {
        let movies = sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, description, year, genre, created_at
            FROM movies
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(movies)
    }

    async fn list_catalog(&self) -> DatabaseResult<Vec<MovieSummary>> {
        let movies =
            sqlx::query_as::<_, MovieSummary>("SELECT id, title, year FROM movies ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(movies)
    }

    async fn get(&self, id: i64) -> DatabaseResult<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, description, year, genre, created_at
            FROM movies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(movie)
    }

    async fn create(&self, fields: &MovieFields) -> DatabaseResult<Movie> {
        let movie = sqlx::query_as::<_, Movie>(
            r#"
            INSERT INTO movies (title, description, year, genre, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, title, description, year, genre, created_at
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.year)
        .bind(&fields.genre)
        .fetch_one(&self.pool)
        .await?;

        Ok(movie)
    }

    async fn update(&self, id: i64, fields: &MovieFields) -> DatabaseResult<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>(
            r#"
            UPDATE movies
            SET title = $1, description = $2, year = $3, genre = $4
            WHERE id = $5
            RETURNING id, title, description, year, genre, created_at
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.year)
        .bind(&fields.genre)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(movie)
    }

    async fn delete(&self, id: i64) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
