//! Page view-model handlers
//!
//! Pages redirect instead of answering 401: no session goes to the sign-in
//! location, an unknown movie goes back to the catalog.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};

use super::current_year;
use crate::{
    error::ApiResult,
    middleware::AuthUser,
    state::AppState,
    validation::parse_id,
    views::{CatalogView, MovieDetailView, MovieFormView},
};

const CATALOG_PATH: &str = "/pages/movies";

/// Movie list page
pub async fn catalog_page(
    State(state): State<AppState>,
    user: Option<AuthUser>,
) -> ApiResult<Response> {
    let Some(user) = user else {
        return Ok(Redirect::to(&state.sign_in_path).into_response());
    };

    let movies = state.movies.list_catalog().await?;
    Ok(Json(CatalogView::build(&user, movies)).into_response())
}

/// Add-movie form
pub async fn new_movie_page(
    State(state): State<AppState>,
    user: Option<AuthUser>,
) -> Response {
    match user {
        Some(user) => Json(MovieFormView::build(&user, current_year())).into_response(),
        None => Redirect::to(&state.sign_in_path).into_response(),
    }
}

/// Movie detail page with reviews and average rating
pub async fn movie_page(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let Some(user) = user else {
        return Ok(Redirect::to(&state.sign_in_path).into_response());
    };

    let Some(id) = parse_id(&id) else {
        return Ok(Redirect::to(CATALOG_PATH).into_response());
    };

    let Some(movie) = state.movies.get(id).await? else {
        return Ok(Redirect::to(CATALOG_PATH).into_response());
    };

    let reviews = state.reviews.list_by_movie(movie.id).await?;
    Ok(Json(MovieDetailView::build(&user, movie, reviews)).into_response())
}
