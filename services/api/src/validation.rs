//! Request validation
//!
//! Every check is fail-fast: the first failing rule produces the single
//! message returned to the client.

use serde::Deserialize;
use uuid::Uuid;

use crate::models::{
    MovieFields, MoviePayload, NewReview, ReviewChanges, ReviewPayload, ReviewUpdatePayload,
};

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const GENRE_MAX_CHARS: usize = 50;
pub const COMMENT_MAX_CHARS: usize = 500;
pub const MIN_MOVIE_YEAR: i32 = 1800;
pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// A number that clients may send either as a JSON number or as a string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl NumericInput {
    /// The value as an integer, if it denotes one exactly
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            NumericInput::Integer(n) => Some(*n),
            NumericInput::Float(f) => float_to_integer(*f),
            NumericInput::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(float_to_integer))
            }
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, NumericInput::Text(s) if s.trim().is_empty())
    }
}

fn float_to_integer(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn present_number(value: Option<NumericInput>) -> Option<NumericInput> {
    value.filter(|v| !v.is_blank())
}

fn too_long(value: &str, max: usize) -> bool {
    value.chars().count() > max
}

/// Latest release year accepted for a movie
pub fn max_movie_year(current_year: i32) -> i32 {
    current_year + 1
}

/// Validate a movie form against the length and year rules
pub fn validate_movie(payload: MoviePayload, current_year: i32) -> Result<MovieFields, String> {
    let (Some(title), Some(description), Some(year), Some(genre)) = (
        present(payload.title),
        present(payload.description),
        present_number(payload.year),
        present(payload.genre),
    ) else {
        return Err("Missing movie data".to_string());
    };

    if too_long(&title, TITLE_MAX_CHARS) {
        return Err(format!(
            "Title is too long (max {} characters)",
            TITLE_MAX_CHARS
        ));
    }
    if too_long(&description, DESCRIPTION_MAX_CHARS) {
        return Err(format!(
            "Description is too long (max {} characters)",
            DESCRIPTION_MAX_CHARS
        ));
    }
    if too_long(&genre, GENRE_MAX_CHARS) {
        return Err(format!(
            "Genre is too long (max {} characters)",
            GENRE_MAX_CHARS
        ));
    }

    let year = year
        .as_integer()
        .and_then(|y| i32::try_from(y).ok())
        .filter(|y| (MIN_MOVIE_YEAR..=max_movie_year(current_year)).contains(y))
        .ok_or_else(|| "Invalid movie year".to_string())?;

    Ok(MovieFields {
        title,
        description,
        year,
        genre,
    })
}

fn validate_rating(rating: &NumericInput) -> Result<i32, String> {
    rating
        .as_integer()
        .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
        .map(|r| r as i32)
        .ok_or_else(|| {
            format!(
                "Rating must be a number between {} and {}",
                MIN_RATING, MAX_RATING
            )
        })
}

fn validate_comment(comment: &str) -> Result<(), String> {
    if too_long(comment, COMMENT_MAX_CHARS) {
        return Err(format!(
            "Comment is too long (max {} characters)",
            COMMENT_MAX_CHARS
        ));
    }
    Ok(())
}

/// Validate a new review submitted by `user_id`
pub fn validate_new_review(user_id: Uuid, payload: ReviewPayload) -> Result<NewReview, String> {
    let (Some(movie_id), Some(rating), Some(comment)) = (
        present_number(payload.movie_id),
        present_number(payload.rating),
        present(payload.comment),
    ) else {
        return Err("Missing review data".to_string());
    };

    let movie_id = movie_id
        .as_integer()
        .filter(|id| *id > 0)
        .ok_or_else(|| "Invalid movie id".to_string())?;
    let rating = validate_rating(&rating)?;
    validate_comment(&comment)?;

    Ok(NewReview {
        user_id,
        movie_id,
        rating,
        comment,
    })
}

/// Validate a review edit; the comment must be present but may be empty
pub fn validate_review_update(payload: ReviewUpdatePayload) -> Result<ReviewChanges, String> {
    let (Some(rating), Some(comment)) = (payload.rating, payload.comment) else {
        return Err("Missing review data".to_string());
    };

    let rating = validate_rating(&rating)?;
    validate_comment(&comment)?;

    Ok(ReviewChanges { rating, comment })
}

/// Parse a path or query id; only positive integers are ids
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}
