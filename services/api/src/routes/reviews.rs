//! Review handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::json;
use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult, JsonBody},
    guard::{Action, authorize},
    middleware::AuthUser,
    models::{Review, ReviewPayload, ReviewQuery, ReviewUpdatePayload},
    state::AppState,
    validation::{parse_id, validate_new_review, validate_review_update},
};

async fn find_review(state: &AppState, raw_id: &str) -> ApiResult<Review> {
    let id =
        parse_id(raw_id).ok_or_else(|| ApiError::BadRequest("Invalid review id".to_string()))?;

    state
        .reviews
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Review not found".to_string()))
}

/// List every review, or one movie's reviews with author emails
pub async fn list_reviews(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ReviewQuery>,
) -> ApiResult<Response> {
    authorize(&user, Action::ListReviews)?;

    match query.movie_id {
        Some(raw) => {
            let movie_id =
                parse_id(&raw).ok_or_else(|| ApiError::BadRequest("Invalid movie id".to_string()))?;
            let reviews = state.reviews.list_by_movie(movie_id).await?;
            Ok(Json(reviews).into_response())
        }
        None => {
            let reviews = state.reviews.list_all().await?;
            Ok(Json(reviews).into_response())
        }
    }
}

/// Post a review as the current user
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(payload): JsonBody<ReviewPayload>,
) -> ApiResult<impl IntoResponse> {
    authorize(&user, Action::CreateReview)?;

    let new_review = validate_new_review(user.id, payload).map_err(ApiError::BadRequest)?;

    let review = match state.reviews.create(&new_review).await {
        Ok(review) => review,
        Err(DatabaseError::ForeignKeyViolation(_)) => {
            return Err(ApiError::BadRequest("Movie does not exist".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        "User {} reviewed movie {} with rating {}",
        user.id, review.movie_id, review.rating
    );

    Ok((StatusCode::CREATED, Json(review)))
}

/// Edit a review's rating and comment
pub async fn update_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<ReviewUpdatePayload>,
) -> ApiResult<impl IntoResponse> {
    let review = find_review(&state, &id).await?;

    let changes = validate_review_update(payload).map_err(ApiError::BadRequest)?;
    authorize(
        &user,
        Action::EditReview {
            owner: review.user_id,
        },
    )?;

    let updated = state
        .reviews
        .update(review.id, &changes)
        .await?
        .ok_or_else(|| ApiError::NotFound("Review not found".to_string()))?;

    info!("User {} updated review {}", user.id, updated.id);

    Ok(Json(updated))
}

/// Delete a review
pub async fn delete_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let review = find_review(&state, &id).await?;

    authorize(
        &user,
        Action::DeleteReview {
            owner: review.user_id,
        },
    )?;

    if state.reviews.delete(review.id).await? == 0 {
        warn!(
            "User {} deleted review {} which was already removed",
            user.id, review.id
        );
    } else {
        info!("User {} deleted review {}", user.id, review.id);
    }

    Ok(Json(json!({"message": "Review deleted"})))
}
