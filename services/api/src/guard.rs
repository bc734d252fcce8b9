//! Authorization guard
//!
//! Decides whether an authenticated caller may perform an action. The role
//! always comes from the verified session, never from the request body.

use common::session::Role;
use uuid::Uuid;

use crate::{error::ApiError, middleware::AuthUser};

/// Actions subject to authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListMovies,
    CreateMovie,
    EditMovie,
    DeleteMovie,
    ListReviews,
    CreateReview,
    EditReview { owner: Uuid },
    DeleteReview { owner: Uuid },
}

/// Whether `user` may perform `action`
pub fn permits(user: &AuthUser, action: Action) -> bool {
    match action {
        Action::ListMovies | Action::ListReviews | Action::CreateReview => true,
        Action::CreateMovie | Action::EditMovie | Action::DeleteMovie => user.role == Role::Admin,
        Action::EditReview { owner } | Action::DeleteReview { owner } => {
            user.role == Role::Moderator || user.id == owner
        }
    }
}

/// Like [`permits`], failing with a 403 error
pub fn authorize(user: &AuthUser, action: Action) -> Result<(), ApiError> {
    if permits(user, action) {
        return Ok(());
    }

    let message = match action {
        Action::EditReview { .. } | Action::DeleteReview { .. } => {
            "You do not have permission to modify this review"
        }
        _ => "Administrator role required",
    };

    Err(ApiError::Forbidden(message.to_string()))
}
