//! Persistence contract consumed by the engines
//!
//! A store owns entities (users, films, directors, genres, reviews) and the
//! edges between them (likes, friendships, review votes) plus the append-only
//! event log. Engines never cache what they read: every call observes the
//! store's current snapshot, with no isolation across calls.

use std::collections::{HashMap, HashSet};

use crate::{
    error::AppResult,
    models::{
        Director, Event, Film, FriendEdge, Genre, NewEvent, NewFilm, NewReview, NewUser, Review,
        ReviewVote, User,
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ---------------------------------------------------------------- users

    /// Inserts a user; duplicate email or login is a Conflict
    async fn create_user(&self, user: NewUser) -> AppResult<User>;

    /// Replaces a user's fields, returning `None` when the id is unknown
    async fn update_user(&self, id: i64, user: NewUser) -> AppResult<Option<User>>;

    async fn get_user(&self, id: i64) -> AppResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn find_user_by_login(&self, login: &str) -> AppResult<Option<User>>;

    /// Bulk fetch; unknown ids are skipped, order is unspecified
    async fn users_by_ids(&self, ids: &[i64]) -> AppResult<Vec<User>>;

    async fn all_users(&self) -> AppResult<Vec<User>>;

    /// Deletes a user with their edges and reviews; events are kept
    async fn delete_user(&self, id: i64) -> AppResult<bool>;

    // ---------------------------------------------------------------- films

    async fn create_film(&self, film: NewFilm) -> AppResult<Film>;

    async fn update_film(&self, id: i64, film: NewFilm) -> AppResult<Option<Film>>;

    async fn get_film(&self, id: i64) -> AppResult<Option<Film>>;

    /// Bulk fetch with genres and directors populated; unknown ids are
    /// skipped, order is unspecified
    async fn films_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Film>>;

    async fn all_films(&self) -> AppResult<Vec<Film>>;

    async fn delete_film(&self, id: i64) -> AppResult<bool>;

    // --------------------------------------------------------------- lookups

    async fn all_genres(&self) -> AppResult<Vec<Genre>>;

    async fn get_genre(&self, id: i32) -> AppResult<Option<Genre>>;

    async fn create_director(&self, name: String) -> AppResult<Director>;

    async fn update_director(&self, director: Director) -> AppResult<Option<Director>>;

    async fn get_director(&self, id: i64) -> AppResult<Option<Director>>;

    async fn all_directors(&self) -> AppResult<Vec<Director>>;

    async fn delete_director(&self, id: i64) -> AppResult<bool>;

    async fn films_by_director(&self, director_id: i64) -> AppResult<Vec<Film>>;

    // ---------------------------------------------------------------- likes

    /// Returns `true` when the edge was newly created
    async fn add_like(&self, film_id: i64, user_id: i64) -> AppResult<bool>;

    /// Returns `true` when an edge was removed
    async fn remove_like(&self, film_id: i64, user_id: i64) -> AppResult<bool>;

    async fn likes_for_film(&self, film_id: i64) -> AppResult<HashSet<i64>>;

    async fn likes_for_user(&self, user_id: i64) -> AppResult<HashSet<i64>>;

    /// Like count per film; films without likes are absent
    async fn like_counts(&self) -> AppResult<HashMap<i64, usize>>;

    /// Liked film ids per user; users without likes are absent
    async fn likes_by_user(&self) -> AppResult<HashMap<i64, HashSet<i64>>>;

    // -------------------------------------------------------------- friends

    /// Creates the directed edge; confirms both directions when the reverse
    /// edge already exists. Returns `true` when the edge was newly created.
    async fn add_friend(&self, user_id: i64, friend_id: i64) -> AppResult<bool>;

    /// Removes the directed edge and unconfirms the reverse one
    async fn remove_friend(&self, user_id: i64, friend_id: i64) -> AppResult<bool>;

    /// Outgoing edges in insertion order
    async fn friend_edges(&self, user_id: i64) -> AppResult<Vec<FriendEdge>>;

    // -------------------------------------------------------------- reviews

    async fn create_review(&self, review: NewReview) -> AppResult<Review>;

    /// Updates content and polarity only
    async fn update_review(
        &self,
        id: i64,
        content: String,
        is_positive: bool,
    ) -> AppResult<Option<Review>>;

    async fn get_review(&self, id: i64) -> AppResult<Option<Review>>;

    async fn delete_review(&self, id: i64) -> AppResult<bool>;

    /// Reviews ordered by usefulness descending, then id
    async fn reviews(&self, film_id: Option<i64>, limit: usize) -> AppResult<Vec<Review>>;

    async fn review_votes(&self, review_id: i64) -> AppResult<Vec<ReviewVote>>;

    async fn get_vote(&self, review_id: i64, user_id: i64) -> AppResult<Option<ReviewVote>>;

    async fn upsert_vote(&self, vote: ReviewVote) -> AppResult<()>;

    async fn delete_vote(&self, review_id: i64, user_id: i64) -> AppResult<bool>;

    /// Adds `delta` to the stored usefulness and returns the new value
    async fn adjust_usefulness(&self, review_id: i64, delta: i64) -> AppResult<i64>;

    // --------------------------------------------------------------- events

    async fn append_event(&self, event: NewEvent) -> AppResult<Event>;

    /// Events by the given actors (all events for `None`), oldest first
    async fn query_events(&self, actors: Option<Vec<i64>>) -> AppResult<Vec<Event>>;
}
