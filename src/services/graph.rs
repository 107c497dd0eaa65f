use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::{
    db::Store,
    error::{AppError, AppResult},
    models::{EventType, Film, NewEvent, Operation, User},
};

use super::{require_user, EventFeed};

/// Friendship edges and the queries answered over them
#[derive(Clone)]
pub struct GraphQueries {
    store: Arc<dyn Store>,
    feed: EventFeed,
}

impl GraphQueries {
    pub fn new(store: Arc<dyn Store>, feed: EventFeed) -> Self {
        Self { store, feed }
    }

    /// Adds the directed edge `user_id -> friend_id`
    #[tracing::instrument(skip(self))]
    pub async fn add_friend(&self, user_id: i64, friend_id: i64) -> AppResult<()> {
        self.check_pair(user_id, friend_id).await?;

        if self.store.add_friend(user_id, friend_id).await? {
            self.feed
                .record(NewEvent::now(
                    user_id,
                    friend_id,
                    EventType::Friend,
                    Operation::Add,
                ))
                .await?;
            tracing::info!(user_id, friend_id, "Friend added");
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove_friend(&self, user_id: i64, friend_id: i64) -> AppResult<()> {
        self.check_pair(user_id, friend_id).await?;

        if self.store.remove_friend(user_id, friend_id).await? {
            self.feed
                .record(NewEvent::now(
                    user_id,
                    friend_id,
                    EventType::Friend,
                    Operation::Remove,
                ))
                .await?;
            tracing::info!(user_id, friend_id, "Friend removed");
        }
        Ok(())
    }

    /// Users the given user befriended, in the order the edges were added
    pub async fn friends_of(&self, user_id: i64) -> AppResult<Vec<User>> {
        require_user(self.store.as_ref(), user_id).await?;
        let ids = self.friend_ids(user_id).await?;
        self.users_in_order(&ids).await
    }

    /// Friends shared by both users, in `user_id`'s edge order
    pub async fn mutual_friends(&self, user_id: i64, other_id: i64) -> AppResult<Vec<User>> {
        require_user(self.store.as_ref(), user_id).await?;
        require_user(self.store.as_ref(), other_id).await?;

        let theirs: HashSet<i64> = self.friend_ids(other_id).await?.into_iter().collect();
        let shared: Vec<i64> = self
            .friend_ids(user_id)
            .await?
            .into_iter()
            .filter(|id| theirs.contains(id))
            .collect();

        self.users_in_order(&shared).await
    }

    /// Films liked by both users, most-liked overall first
    #[tracing::instrument(skip(self))]
    pub async fn common_films(&self, user_id: i64, friend_id: i64) -> AppResult<Vec<Film>> {
        if user_id == friend_id {
            return Err(AppError::Conflict(
                "Common films require two different users".to_string(),
            ));
        }
        require_user(self.store.as_ref(), user_id).await?;
        require_user(self.store.as_ref(), friend_id).await?;

        let mine = self.store.likes_for_user(user_id).await?;
        let theirs = self.store.likes_for_user(friend_id).await?;
        let shared: Vec<i64> = mine.intersection(&theirs).copied().collect();
        if shared.is_empty() {
            return Ok(Vec::new());
        }

        let counts = self.store.like_counts().await?;
        let mut films = self.store.films_by_ids(&shared).await?;
        films.sort_by_key(|film| {
            (
                Reverse(counts.get(&film.id).copied().unwrap_or(0)),
                film.id,
            )
        });
        Ok(films)
    }

    async fn check_pair(&self, user_id: i64, friend_id: i64) -> AppResult<()> {
        if user_id == friend_id {
            return Err(AppError::Conflict(format!(
                "User {} cannot befriend themselves",
                user_id
            )));
        }
        require_user(self.store.as_ref(), user_id).await?;
        require_user(self.store.as_ref(), friend_id).await?;
        Ok(())
    }

    async fn friend_ids(&self, user_id: i64) -> AppResult<Vec<i64>> {
        Ok(self
            .store
            .friend_edges(user_id)
            .await?
            .into_iter()
            .map(|edge| edge.friend_id)
            .collect())
    }

    async fn users_in_order(&self, ids: &[i64]) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut by_id: HashMap<i64, User> = self
            .store
            .users_by_ids(ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}
