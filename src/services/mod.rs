//! Engines and services over a [`Store`]
//!
//! Every service is a cheap `Clone` value around `Arc<dyn Store>`; none of
//! them keeps state between calls.

pub mod catalog;
pub mod feed;
pub mod graph;
pub mod likes;
pub mod ranking;
pub mod recommendations;
pub mod reviews;

pub use catalog::CatalogService;
pub use feed::EventFeed;
pub use graph::GraphQueries;
pub use likes::LikeService;
pub use ranking::{DirectorSort, RankingEngine, SearchScope};
pub use recommendations::RecommendationEngine;
pub use reviews::ReviewService;

use crate::{
    db::Store,
    error::{AppError, AppResult},
    models::{Film, Review, User},
};

pub(crate) async fn require_user(store: &dyn Store, id: i64) -> AppResult<User> {
    store
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))
}

pub(crate) async fn require_film(store: &dyn Store, id: i64) -> AppResult<Film> {
    store
        .get_film(id)
        .await?
        .ok_or_else(|| AppError::not_found("Film", id))
}

pub(crate) async fn require_review(store: &dyn Store, id: i64) -> AppResult<Review> {
    store
        .get_review(id)
        .await?
        .ok_or_else(|| AppError::not_found("Review", id))
}
