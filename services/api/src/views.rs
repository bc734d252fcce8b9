//! Page view models
//!
//! The catalog, movie detail and add-movie pages are rendered client-side
//! from these documents. Capability flags come from the authorization
//! guard so a page never offers an action the API would refuse.

use common::session::Role;
use serde::Serialize;

use crate::{
    guard::{Action, permits},
    middleware::AuthUser,
    models::{Movie, MovieSummary, ReviewWithAuthor},
    validation::{
        COMMENT_MAX_CHARS, DESCRIPTION_MAX_CHARS, GENRE_MAX_CHARS, MAX_RATING, MIN_MOVIE_YEAR,
        MIN_RATING, TITLE_MAX_CHARS, max_movie_year,
    },
};

/// Arithmetic mean of the ratings, `None` when there are none
pub fn average_rating(ratings: &[i32]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let total: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    Some(total as f64 / ratings.len() as f64)
}

#[derive(Debug, Serialize)]
pub struct Viewer {
    pub email: String,
    pub role: Role,
}

impl From<&AuthUser> for Viewer {
    fn from(user: &AuthUser) -> Self {
        Self {
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Movie list page
#[derive(Debug, Serialize)]
pub struct CatalogView {
    pub viewer: Viewer,
    pub movies: Vec<MovieSummary>,
    pub can_add_movie: bool,
}

impl CatalogView {
    pub fn build(user: &AuthUser, movies: Vec<MovieSummary>) -> Self {
        Self {
            viewer: Viewer::from(user),
            movies,
            can_add_movie: permits(user, Action::CreateMovie),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: ReviewWithAuthor,
    pub can_modify: bool,
}

/// Movie detail page
#[derive(Debug, Serialize)]
pub struct MovieDetailView {
    pub viewer: Viewer,
    pub movie: Movie,
    pub average_rating: Option<f64>,
    pub reviews: Vec<ReviewView>,
    pub can_edit_movie: bool,
    pub can_delete_movie: bool,
    pub rating_range: (i64, i64),
    pub comment_max_chars: usize,
}

impl MovieDetailView {
    pub fn build(user: &AuthUser, movie: Movie, reviews: Vec<ReviewWithAuthor>) -> Self {
        let ratings: Vec<i32> = reviews.iter().map(|r| r.rating).collect();

        let reviews = reviews
            .into_iter()
            .map(|review| {
                let can_modify = permits(
                    user,
                    Action::EditReview {
                        owner: review.user_id,
                    },
                );
                ReviewView { review, can_modify }
            })
            .collect();

        Self {
            viewer: Viewer::from(user),
            movie,
            average_rating: average_rating(&ratings),
            reviews,
            can_edit_movie: permits(user, Action::EditMovie),
            can_delete_movie: permits(user, Action::DeleteMovie),
            rating_range: (MIN_RATING, MAX_RATING),
            comment_max_chars: COMMENT_MAX_CHARS,
        }
    }
}

/// Add-movie form
#[derive(Debug, Serialize)]
pub struct MovieFormView {
    pub allowed: bool,
    pub title_max_chars: usize,
    pub description_max_chars: usize,
    pub genre_max_chars: usize,
    pub min_year: i32,
    pub max_year: i32,
}

impl MovieFormView {
    pub fn build(user: &AuthUser, current_year: i32) -> Self {
        Self {
            allowed: permits(user, Action::CreateMovie),
            title_max_chars: TITLE_MAX_CHARS,
            description_max_chars: DESCRIPTION_MAX_CHARS,
            genre_max_chars: GENRE_MAX_CHARS,
            min_year: MIN_MOVIE_YEAR,
            max_year: max_movie_year(current_year),
        }
    }
}
