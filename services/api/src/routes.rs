//! API service routes

use axum::{
    Json, Router, middleware,
    response::IntoResponse,
    routing::{get, put},
};
use chrono::{Datelike, Utc};
use serde_json::json;

use crate::{error::ApiError, middleware::session_middleware, state::AppState};

mod movies;
mod pages;
mod reviews;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/movies",
            get(movies::list_movies)
                .post(movies::create_movie)
                .fallback(method_not_allowed),
        )
        .route(
            "/movies/:id",
            get(movies::get_movie)
                .put(movies::update_movie)
                .delete(movies::delete_movie)
                .fallback(method_not_allowed),
        )
        .route(
            "/reviews",
            get(reviews::list_reviews)
                .post(reviews::create_review)
                .fallback(method_not_allowed),
        )
        .route(
            "/reviews/:id",
            put(reviews::update_review)
                .delete(reviews::delete_review)
                .fallback(method_not_allowed),
        )
        .route(
            "/pages/movies",
            get(pages::catalog_page).fallback(method_not_allowed),
        )
        .route(
            "/pages/movies/new",
            get(pages::new_movie_page).fallback(method_not_allowed),
        )
        .route(
            "/pages/movies/:id",
            get(pages::movie_page).fallback(method_not_allowed),
        )
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

fn current_year() -> i32 {
    Utc::now().year()
}
