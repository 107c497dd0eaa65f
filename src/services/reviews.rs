use std::sync::Arc;

use crate::{
    db::Store,
    error::{AppError, AppResult},
    models::{EventType, NewEvent, NewReview, Operation, Review},
};

use super::{require_film, require_review, require_user, EventFeed};

pub const DEFAULT_REVIEW_COUNT: usize = 10;

#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn Store>,
    feed: EventFeed,
}

impl ReviewService {
    pub fn new(store: Arc<dyn Store>, feed: EventFeed) -> Self {
        Self { store, feed }
    }

    #[tracing::instrument(skip(self, review), fields(film_id = review.film_id, user_id = review.user_id))]
    pub async fn create(&self, review: NewReview) -> AppResult<Review> {
        require_film(self.store.as_ref(), review.film_id).await?;
        require_user(self.store.as_ref(), review.user_id).await?;

        let review = self.store.create_review(review).await?;
        self.feed
            .record(NewEvent::now(
                review.user_id,
                review.id,
                EventType::Review,
                Operation::Add,
            ))
            .await?;

        tracing::info!(review_id = review.id, "Review created");
        Ok(review)
    }

    /// Rewrites content and polarity; author, film and usefulness stay put
    #[tracing::instrument(skip(self, content))]
    pub async fn update(&self, id: i64, content: String, is_positive: bool) -> AppResult<Review> {
        NewReview::validate_content(&content)?;

        let review = self
            .store
            .update_review(id, content, is_positive)
            .await?
            .ok_or_else(|| AppError::not_found("Review", id))?;
        self.feed
            .record(NewEvent::now(
                review.user_id,
                review.id,
                EventType::Review,
                Operation::Update,
            ))
            .await?;

        tracing::info!(review_id = id, "Review updated");
        Ok(review)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let review = require_review(self.store.as_ref(), id).await?;
        if !self.store.delete_review(id).await? {
            return Err(AppError::not_found("Review", id));
        }
        self.feed
            .record(NewEvent::now(
                review.user_id,
                review.id,
                EventType::Review,
                Operation::Remove,
            ))
            .await?;

        tracing::info!(review_id = id, "Review deleted");
        Ok(())
    }

    pub async fn get(&self, id: i64) -> AppResult<Review> {
        require_review(self.store.as_ref(), id).await
    }

    /// Most useful reviews first, optionally for a single film
    pub async fn list(&self, film_id: Option<i64>, count: usize) -> AppResult<Vec<Review>> {
        self.store.reviews(film_id, count).await
    }
}
