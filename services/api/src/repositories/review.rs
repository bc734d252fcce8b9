//! Review repository for database operations

use async_trait::async_trait;
use common::error::DatabaseResult;
use sqlx::PgPool;

use crate::models::{NewReview, Review, ReviewChanges, ReviewWithAuthor};

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// All reviews, by id
    async fn list_all(&self) -> DatabaseResult<Vec<Review>>;

    /// One movie's reviews with their authors' emails, oldest first
    async fn list_by_movie(&self, movie_id: i64) -> DatabaseResult<Vec<ReviewWithAuthor>>;

    async fn get(&self, id: i64) -> DatabaseResult<Option<Review>>;

    /// Insert a review; an unknown movie surfaces as
    /// [`common::error::DatabaseError::ForeignKeyViolation`]
    async fn create(&self, review: &NewReview) -> DatabaseResult<Review>;

    async fn update(&self, id: i64, changes: &ReviewChanges) -> DatabaseResult<Option<Review>>;

    /// Delete a review, returning the number of rows removed
    async fn delete(&self, id: i64) -> DatabaseResult<u64>;
}

/// PostgreSQL-backed review repository
#[derive(Clone)]
pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    /// Create a new review repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn list_all(&self) -> DatabaseResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, user_id, movie_id, rating, comment, created_at
            FROM reviews
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn list_by_movie(&self, movie_id: i64) -> DatabaseResult<Vec<ReviewWithAuthor>> {
        let reviews = sqlx::query_as::<_, ReviewWithAuthor>(
            r#"
            SELECT r.id, r.user_id, u.email AS user_email, r.movie_id, r.rating,
                   r.comment, r.created_at
            FROM reviews r
            JOIN users u ON r.user_id = u.id
            WHERE r.movie_id = $1
            ORDER BY r.created_at ASC
            "#,
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn get(&self, id: i64) -> DatabaseResult<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, user_id, movie_id, rating, comment, created_at
            FROM reviews
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    async fn create(&self, review: &NewReview) -> DatabaseResult<Review> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (user_id, movie_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, user_id, movie_id, rating, comment, created_at
            "#,
        )
        .bind(review.user_id)
        .bind(review.movie_id)
        .bind(review.rating)
        .bind(&review.comment)
        .fetch_one(&self.pool)
        .await?;

        Ok(review)
    }

    async fn update(&self, id: i64, changes: &ReviewChanges) -> DatabaseResult<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            UPDATE reviews
            SET rating = $1, comment = $2
            WHERE id = $3
            RETURNING id, user_id, movie_id, rating, comment, created_at
            "#,
        )
        .bind(changes.rating)
        .bind(&changes.comment)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    async fn delete(&self, id: i64) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
