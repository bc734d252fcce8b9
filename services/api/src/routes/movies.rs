//! Movie handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::{info, warn};

use super::current_year;
use crate::{
    error::{ApiError, ApiResult, JsonBody},
    guard::{Action, authorize},
    middleware::AuthUser,
    models::MoviePayload,
    state::AppState,
    validation::{parse_id, validate_movie},
};

fn movie_id(raw: &str) -> ApiResult<i64> {
    parse_id(raw).ok_or_else(|| ApiError::BadRequest("Invalid movie id".to_string()))
}

/// List movies, newest first
pub async fn list_movies(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    authorize(&user, Action::ListMovies)?;

    let movies = state.movies.list().await?;
    Ok(Json(movies))
}

/// Get a movie by ID
pub async fn get_movie(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    authorize(&user, Action::ListMovies)?;
    let id = movie_id(&id)?;

    let movie = state
        .movies
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Movie not found".to_string()))?;

    Ok(Json(movie))
}

/// Add a movie to the catalog
///
/// The body is decoded only after the role check, so non-admins get 403
/// whatever they send.
pub async fn create_movie(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<JsonBody<MoviePayload>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    authorize(&user, Action::CreateMovie)?;
    let JsonBody(payload) = body?;

    let fields = validate_movie(payload, current_year()).map_err(ApiError::BadRequest)?;
    let movie = state.movies.create(&fields).await?;

    info!("User {} created movie {} ({})", user.id, movie.id, movie.title);

    Ok((StatusCode::CREATED, Json(movie)))
}

/// Replace a movie's editable fields
pub async fn update_movie(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    body: Result<JsonBody<MoviePayload>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    authorize(&user, Action::EditMovie)?;
    let id = movie_id(&id)?;
    let JsonBody(payload) = body?;

    let fields = validate_movie(payload, current_year()).map_err(ApiError::BadRequest)?;
    let movie = state
        .movies
        .update(id, &fields)
        .await?
        .ok_or_else(|| ApiError::NotFound("Movie not found".to_string()))?;

    info!("User {} updated movie {}", user.id, movie.id);

    Ok(Json(movie))
}

/// Delete a movie; deleting an unknown id still succeeds
pub async fn delete_movie(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    authorize(&user, Action::DeleteMovie)?;
    let id = movie_id(&id)?;

    if state.movies.delete(id).await? == 0 {
        warn!("User {} deleted movie {} which does not exist", user.id, id);
    } else {
        info!("User {} deleted movie {}", user.id, id);
    }

    Ok(Json(json!({"message": "Movie deleted"})))
}
