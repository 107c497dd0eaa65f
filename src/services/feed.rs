use std::sync::Arc;

use crate::{
    db::Store,
    error::AppResult,
    models::{Event, NewEvent},
};

use super::require_user;

/// Append-only activity log and per-user feed
#[derive(Clone)]
pub struct EventFeed {
    store: Arc<dyn Store>,
}

impl EventFeed {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Appends an event; storage failures propagate to the caller
    pub async fn record(&self, event: NewEvent) -> AppResult<Event> {
        let event = self.store.append_event(event).await?;
        tracing::debug!(
            event_id = event.id,
            user_id = event.user_id,
            entity_id = event.entity_id,
            event_type = %event.event_type,
            operation = %event.operation,
            "Recorded event"
        );
        Ok(event)
    }

    /// Events visible to a user: their own plus those of everyone they
    /// befriended. `None` returns the whole log and is reserved for
    /// administrative callers.
    #[tracing::instrument(skip(self))]
    pub async fn feed_for(&self, user_id: Option<i64>) -> AppResult<Vec<Event>> {
        let Some(user_id) = user_id else {
            return self.store.query_events(None).await;
        };

        require_user(self.store.as_ref(), user_id).await?;

        let mut actors = vec![user_id];
        actors.extend(
            self.store
                .friend_edges(user_id)
                .await?
                .into_iter()
                .map(|edge| edge.friend_id),
        );

        self.store.query_events(Some(actors)).await
    }
}
