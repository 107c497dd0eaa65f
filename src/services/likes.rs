use std::sync::Arc;

use crate::{
    db::Store,
    error::AppResult,
    models::{EventType, NewEvent, Operation},
};

use super::{require_film, require_user, EventFeed};

/// Film likes; each change is mirrored into the event feed
#[derive(Clone)]
pub struct LikeService {
    store: Arc<dyn Store>,
    feed: EventFeed,
}

impl LikeService {
    pub fn new(store: Arc<dyn Store>, feed: EventFeed) -> Self {
        Self { store, feed }
    }

    #[tracing::instrument(skip(self))]
    pub async fn add_like(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        require_film(self.store.as_ref(), film_id).await?;
        require_user(self.store.as_ref(), user_id).await?;

        if self.store.add_like(film_id, user_id).await? {
            self.feed
                .record(NewEvent::now(user_id, film_id, EventType::Like, Operation::Add))
                .await?;
            tracing::info!(film_id, user_id, "Like added");
        }
        Ok(())
    }

    /// Removing a like that was never there is not an error
    #[tracing::instrument(skip(self))]
    pub async fn remove_like(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        require_film(self.store.as_ref(), film_id).await?;
        require_user(self.store.as_ref(), user_id).await?;

        if self.store.remove_like(film_id, user_id).await? {
            self.feed
                .record(NewEvent::now(
                    user_id,
                    film_id,
                    EventType::Like,
                    Operation::Remove,
                ))
                .await?;
            tracing::info!(film_id, user_id, "Like removed");
        }
        Ok(())
    }
}
