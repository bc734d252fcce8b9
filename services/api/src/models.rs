//! API models for request and response payloads

pub mod movie;
pub mod review;

pub use movie::{Movie, MovieFields, MoviePayload, MovieSummary};
pub use review::{
    NewReview, Review, ReviewChanges, ReviewPayload, ReviewQuery, ReviewUpdatePayload,
    ReviewWithAuthor,
};
