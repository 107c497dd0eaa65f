use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    db::Store,
    error::{AppError, AppResult},
    models::{
        genre_catalog, vote_weight, Director, Event, Film, FriendEdge, Genre, NewEvent, NewFilm,
        NewReview, NewUser, Review, ReviewVote, User,
    },
};

/// In-memory store
///
/// Every operation takes the lock once, so each call is atomic on its own.
/// Id counters live on the instance, so independent stores never share ids.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

struct Inner {
    next_user_id: i64,
    next_film_id: i64,
    next_director_id: i64,
    next_review_id: i64,
    next_event_id: i64,
    users: BTreeMap<i64, User>,
    films: BTreeMap<i64, NewFilm>,
    genres: BTreeMap<i32, Genre>,
    directors: BTreeMap<i64, Director>,
    /// (film_id, user_id)
    likes: BTreeSet<(i64, i64)>,
    /// Insertion order is the order `friend_edges` reports
    friends: Vec<FriendEdge>,
    reviews: BTreeMap<i64, Review>,
    /// (review_id, user_id) -> is_like
    votes: BTreeMap<(i64, i64), bool>,
    events: Vec<Event>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            next_user_id: 1,
            next_film_id: 1,
            next_director_id: 1,
            next_review_id: 1,
            next_event_id: 1,
            users: BTreeMap::new(),
            films: BTreeMap::new(),
            genres: genre_catalog()
                .into_iter()
                .map(|genre| (genre.id, genre))
                .collect(),
            directors: BTreeMap::new(),
            likes: BTreeSet::new(),
            friends: Vec::new(),
            reviews: BTreeMap::new(),
            votes: BTreeMap::new(),
            events: Vec::new(),
        }
    }
}

impl Inner {
    fn materialize(&self, id: i64, film: &NewFilm) -> Film {
        let genres = film
            .genre_ids
            .iter()
            .filter_map(|genre_id| self.genres.get(genre_id).cloned())
            .collect();
        let directors = film
            .director_ids
            .iter()
            .filter_map(|director_id| self.directors.get(director_id).cloned())
            .collect();
        film.clone().into_film(id, genres, directors)
    }

    fn check_unique(&self, user: &NewUser, except: Option<i64>) -> AppResult<()> {
        let clash = self.users.values().find(|existing| {
            Some(existing.id) != except
                && (existing.email == user.email || existing.login == user.login)
        });

        match clash {
            Some(existing) if existing.email == user.email => Err(AppError::Conflict(format!(
                "Email {} is already in use",
                user.email
            ))),
            Some(_) => Err(AppError::Conflict(format!(
                "Login {} is already in use",
                user.login
            ))),
            None => Ok(()),
        }
    }

    /// Drops votes matching the predicate and rolls their weight back out of
    /// the affected reviews
    fn drop_votes(&mut self, mut predicate: impl FnMut(i64, i64) -> bool) {
        let doomed: Vec<((i64, i64), bool)> = self
            .votes
            .iter()
            .filter(|((review_id, user_id), _)| predicate(*review_id, *user_id))
            .map(|(key, is_like)| (*key, *is_like))
            .collect();

        for ((review_id, user_id), is_like) in doomed {
            self.votes.remove(&(review_id, user_id));
            if let Some(review) = self.reviews.get_mut(&review_id) {
                review.useful -= vote_weight(is_like);
            }
        }
    }

    fn drop_reviews(&mut self, mut predicate: impl FnMut(&Review) -> bool) {
        let doomed: HashSet<i64> = self
            .reviews
            .values()
            .filter(|review| predicate(review))
            .map(|review| review.id)
            .collect();

        self.reviews.retain(|id, _| !doomed.contains(id));
        self.votes
            .retain(|(review_id, _), _| !doomed.contains(review_id));
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        inner.check_unique(&user, None)?;

        let id = inner.next_user_id;
        inner.next_user_id += 1;

        let user = user.into_user(id);
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: i64, user: NewUser) -> AppResult<Option<User>> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&id) {
            return Ok(None);
        }
        inner.check_unique(&user, Some(id))?;

        let user = user.into_user(id);
        inner.users.insert(id, user.clone());
        Ok(Some(user))
    }

    async fn get_user(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.login == login).cloned())
    }

    async fn users_by_ids(&self, ids: &[i64]) -> AppResult<Vec<User>> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.users.get(id).cloned())
            .collect())
    }

    async fn all_users(&self) -> AppResult<Vec<User>> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }

    async fn delete_user(&self, id: i64) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.users.remove(&id).is_none() {
            return Ok(false);
        }

        inner.likes.retain(|(_, user_id)| *user_id != id);
        inner
            .friends
            .retain(|edge| edge.user_id != id && edge.friend_id != id);
        inner.drop_votes(|_, user_id| user_id == id);
        inner.drop_reviews(|review| review.user_id == id);
        Ok(true)
    }

    async fn create_film(&self, film: NewFilm) -> AppResult<Film> {
        let mut inner = self.inner.write().await;
        let id = inner.next_film_id;
        inner.next_film_id += 1;

        let created = inner.materialize(id, &film);
        inner.films.insert(id, film);
        Ok(created)
    }

    async fn update_film(&self, id: i64, film: NewFilm) -> AppResult<Option<Film>> {
        let mut inner = self.inner.write().await;
        if !inner.films.contains_key(&id) {
            return Ok(None);
        }

        let updated = inner.materialize(id, &film);
        inner.films.insert(id, film);
        Ok(Some(updated))
    }

    async fn get_film(&self, id: i64) -> AppResult<Option<Film>> {
        let inner = self.inner.read().await;
        Ok(inner.films.get(&id).map(|film| inner.materialize(id, film)))
    }

    async fn films_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Film>> {
        let inner = self.inner.read().await;
        let unique: BTreeSet<i64> = ids.iter().copied().collect();
        Ok(unique
            .into_iter()
            .filter_map(|id| inner.films.get(&id).map(|film| inner.materialize(id, film)))
            .collect())
    }

    async fn all_films(&self) -> AppResult<Vec<Film>> {
        let inner = self.inner.read().await;
        Ok(inner
            .films
            .iter()
            .map(|(id, film)| inner.materialize(*id, film))
            .collect())
    }

    async fn delete_film(&self, id: i64) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.films.remove(&id).is_none() {
            return Ok(false);
        }

        inner.likes.retain(|(film_id, _)| *film_id != id);
        inner.drop_reviews(|review| review.film_id == id);
        Ok(true)
    }

    async fn all_genres(&self) -> AppResult<Vec<Genre>> {
        Ok(self.inner.read().await.genres.values().cloned().collect())
    }

    async fn get_genre(&self, id: i32) -> AppResult<Option<Genre>> {
        Ok(self.inner.read().await.genres.get(&id).cloned())
    }

    async fn create_director(&self, name: String) -> AppResult<Director> {
        let mut inner = self.inner.write().await;
        let id = inner.next_director_id;
        inner.next_director_id += 1;

        let director = Director { id, name };
        inner.directors.insert(id, director.clone());
        Ok(director)
    }

    async fn update_director(&self, director: Director) -> AppResult<Option<Director>> {
        let mut inner = self.inner.write().await;
        match inner.directors.get_mut(&director.id) {
            Some(existing) => {
                existing.name = director.name;
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn get_director(&self, id: i64) -> AppResult<Option<Director>> {
        Ok(self.inner.read().await.directors.get(&id).cloned())
    }

    async fn all_directors(&self) -> AppResult<Vec<Director>> {
        Ok(self.inner.read().await.directors.values().cloned().collect())
    }

    async fn delete_director(&self, id: i64) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.directors.remove(&id).is_none() {
            return Ok(false);
        }
        for film in inner.films.values_mut() {
            film.director_ids.remove(&id);
        }
        Ok(true)
    }

    async fn films_by_director(&self, director_id: i64) -> AppResult<Vec<Film>> {
        let inner = self.inner.read().await;
        Ok(inner
            .films
            .iter()
            .filter(|(_, film)| film.director_ids.contains(&director_id))
            .map(|(id, film)| inner.materialize(*id, film))
            .collect())
    }

    async fn add_like(&self, film_id: i64, user_id: i64) -> AppResult<bool> {
        Ok(self.inner.write().await.likes.insert((film_id, user_id)))
    }

    async fn remove_like(&self, film_id: i64, user_id: i64) -> AppResult<bool> {
        Ok(self.inner.write().await.likes.remove(&(film_id, user_id)))
    }

    async fn likes_for_film(&self, film_id: i64) -> AppResult<HashSet<i64>> {
        let inner = self.inner.read().await;
        Ok(inner
            .likes
            .range((film_id, i64::MIN)..=(film_id, i64::MAX))
            .map(|(_, user_id)| *user_id)
            .collect())
    }

    async fn likes_for_user(&self, user_id: i64) -> AppResult<HashSet<i64>> {
        let inner = self.inner.read().await;
        Ok(inner
            .likes
            .iter()
            .filter(|(_, liker)| *liker == user_id)
            .map(|(film_id, _)| *film_id)
            .collect())
    }

    async fn like_counts(&self) -> AppResult<HashMap<i64, usize>> {
        let inner = self.inner.read().await;
        let mut counts = HashMap::new();
        for (film_id, _) in inner.likes.iter() {
            *counts.entry(*film_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn likes_by_user(&self) -> AppResult<HashMap<i64, HashSet<i64>>> {
        let inner = self.inner.read().await;
        let mut by_user: HashMap<i64, HashSet<i64>> = HashMap::new();
        for (film_id, user_id) in inner.likes.iter() {
            by_user.entry(*user_id).or_default().insert(*film_id);
        }
        Ok(by_user)
    }

    async fn add_friend(&self, user_id: i64, friend_id: i64) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        if inner
            .friends
            .iter()
            .any(|edge| edge.user_id == user_id && edge.friend_id == friend_id)
        {
            return Ok(false);
        }

        let mut confirmed = false;
        if let Some(reverse) = inner
            .friends
            .iter_mut()
            .find(|edge| edge.user_id == friend_id && edge.friend_id == user_id)
        {
            reverse.confirmed = true;
            confirmed = true;
        }

        inner.friends.push(FriendEdge {
            user_id,
            friend_id,
            confirmed,
        });
        Ok(true)
    }

    async fn remove_friend(&self, user_id: i64, friend_id: i64) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.friends.len();
        inner
            .friends
            .retain(|edge| !(edge.user_id == user_id && edge.friend_id == friend_id));
        if inner.friends.len() == before {
            return Ok(false);
        }

        if let Some(reverse) = inner
            .friends
            .iter_mut()
            .find(|edge| edge.user_id == friend_id && edge.friend_id == user_id)
        {
            reverse.confirmed = false;
        }
        Ok(true)
    }

    async fn friend_edges(&self, user_id: i64) -> AppResult<Vec<FriendEdge>> {
        let inner = self.inner.read().await;
        Ok(inner
            .friends
            .iter()
            .filter(|edge| edge.user_id == user_id)
            .copied()
            .collect())
    }

    async fn create_review(&self, review: NewReview) -> AppResult<Review> {
        let mut inner = self.inner.write().await;
        let id = inner.next_review_id;
        inner.next_review_id += 1;

        let review = review.into_review(id);
        inner.reviews.insert(id, review.clone());
        Ok(review)
    }

    async fn update_review(
        &self,
        id: i64,
        content: String,
        is_positive: bool,
    ) -> AppResult<Option<Review>> {
        let mut inner = self.inner.write().await;
        match inner.reviews.get_mut(&id) {
            Some(review) => {
                review.content = content;
                review.is_positive = is_positive;
                Ok(Some(review.clone()))
            }
            None => Ok(None),
        }
    }

    async fn get_review(&self, id: i64) -> AppResult<Option<Review>> {
        Ok(self.inner.read().await.reviews.get(&id).cloned())
    }

    async fn delete_review(&self, id: i64) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.reviews.remove(&id).is_none() {
            return Ok(false);
        }
        inner.votes.retain(|(review_id, _), _| *review_id != id);
        Ok(true)
    }

    async fn reviews(&self, film_id: Option<i64>, limit: usize) -> AppResult<Vec<Review>> {
        let inner = self.inner.read().await;
        let mut reviews: Vec<Review> = inner
            .reviews
            .values()
            .filter(|review| film_id.map_or(true, |id| review.film_id == id))
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.useful.cmp(&a.useful).then(a.id.cmp(&b.id)));
        reviews.truncate(limit);
        Ok(reviews)
    }

    async fn review_votes(&self, review_id: i64) -> AppResult<Vec<ReviewVote>> {
        let inner = self.inner.read().await;
        Ok(inner
            .votes
            .range((review_id, i64::MIN)..=(review_id, i64::MAX))
            .map(|((review_id, user_id), is_like)| ReviewVote {
                review_id: *review_id,
                user_id: *user_id,
                is_like: *is_like,
            })
            .collect())
    }

    async fn get_vote(&self, review_id: i64, user_id: i64) -> AppResult<Option<ReviewVote>> {
        let inner = self.inner.read().await;
        Ok(inner
            .votes
            .get(&(review_id, user_id))
            .map(|is_like| ReviewVote {
                review_id,
                user_id,
                is_like: *is_like,
            }))
    }

    async fn upsert_vote(&self, vote: ReviewVote) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .votes
            .insert((vote.review_id, vote.user_id), vote.is_like);
        Ok(())
    }

    async fn delete_vote(&self, review_id: i64, user_id: i64) -> AppResult<bool> {
        Ok(self
            .inner
            .write()
            .await
            .votes
            .remove(&(review_id, user_id))
            .is_some())
    }

    async fn adjust_usefulness(&self, review_id: i64, delta: i64) -> AppResult<i64> {
        let mut inner = self.inner.write().await;
        let review = inner
            .reviews
            .get_mut(&review_id)
            .ok_or_else(|| AppError::not_found("Review", review_id))?;
        review.useful += delta;
        Ok(review.useful)
    }

    async fn append_event(&self, event: NewEvent) -> AppResult<Event> {
        let mut inner = self.inner.write().await;
        let id = inner.next_event_id;
        inner.next_event_id += 1;

        let event = event.into_event(id);
        inner.events.push(event.clone());
        Ok(event)
    }

    async fn query_events(&self, actors: Option<Vec<i64>>) -> AppResult<Vec<Event>> {
        let inner = self.inner.read().await;
        let actors: Option<HashSet<i64>> = actors.map(|ids| ids.into_iter().collect());

        let mut events: Vec<Event> = inner
            .events
            .iter()
            .filter(|event| {
                actors
                    .as_ref()
                    .map_or(true, |ids| ids.contains(&event.user_id))
            })
            .cloned()
            .collect();
        events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventType, MpaRating, Operation};
    use chrono::NaiveDate;

    fn new_user(login: &str) -> NewUser {
        NewUser::new(format!("{}@example.com", login), login.to_string(), None, None).unwrap()
    }

    fn new_film(name: &str, genres: &[i32]) -> NewFilm {
        NewFilm::new(
            name.to_string(),
            None,
            NaiveDate::from_ymd_opt(2001, 1, 1).unwrap(),
            100,
            MpaRating::G,
            genres.iter().copied(),
            [],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_ids_are_per_instance() {
        let first = InMemoryStore::new();
        let second = InMemoryStore::new();

        let a = first.create_user(new_user("ann")).await.unwrap();
        let b = second.create_user(new_user("bob")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_or_login_conflicts() {
        let store = InMemoryStore::new();
        store.create_user(new_user("ann")).await.unwrap();

        let same_login = NewUser::new("other@example.com".into(), "ann".into(), None, None).unwrap();
        assert!(matches!(
            store.create_user(same_login).await,
            Err(AppError::Conflict(_))
        ));

        let same_email = NewUser::new("ann@example.com".into(), "annie".into(), None, None).unwrap();
        assert!(matches!(
            store.create_user(same_email).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_like_edges_are_idempotent() {
        let store = InMemoryStore::new();
        assert!(store.add_like(1, 2).await.unwrap());
        assert!(!store.add_like(1, 2).await.unwrap());
        assert_eq!(store.likes_for_film(1).await.unwrap().len(), 1);

        assert!(store.remove_like(1, 2).await.unwrap());
        assert!(!store.remove_like(1, 2).await.unwrap());
        assert!(store.likes_for_film(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_friend_confirmation_follows_reverse_edge() {
        let store = InMemoryStore::new();
        store.add_friend(1, 2).await.unwrap();
        assert!(!store.friend_edges(1).await.unwrap()[0].confirmed);

        store.add_friend(2, 1).await.unwrap();
        assert!(store.friend_edges(1).await.unwrap()[0].confirmed);
        assert!(store.friend_edges(2).await.unwrap()[0].confirmed);

        store.remove_friend(2, 1).await.unwrap();
        assert!(!store.friend_edges(1).await.unwrap()[0].confirmed);
        assert!(store.friend_edges(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_films_materialize_genres() {
        let store = InMemoryStore::new();
        let film = store.create_film(new_film("Heat", &[6, 4])).await.unwrap();
        let names: Vec<&str> = film.genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Thriller", "Action"]);
    }

    #[tokio::test]
    async fn test_delete_user_rolls_back_vote_weight() {
        let store = InMemoryStore::new();
        let author = store.create_user(new_user("ann")).await.unwrap();
        let voter = store.create_user(new_user("bob")).await.unwrap();
        let film = store.create_film(new_film("Heat", &[])).await.unwrap();
        let review = store
            .create_review(NewReview::new("Tense".into(), true, author.id, film.id).unwrap())
            .await
            .unwrap();

        store
            .upsert_vote(ReviewVote {
                review_id: review.id,
                user_id: voter.id,
                is_like: true,
            })
            .await
            .unwrap();
        store.adjust_usefulness(review.id, 1).await.unwrap();

        assert!(store.delete_user(voter.id).await.unwrap());
        let review = store.get_review(review.id).await.unwrap().unwrap();
        assert_eq!(review.useful, 0);
        assert!(store.review_votes(review.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_events_filters_by_actor() {
        let store = InMemoryStore::new();
        for user_id in [1, 2, 3] {
            store
                .append_event(NewEvent::now(user_id, 10, EventType::Like, Operation::Add))
                .await
                .unwrap();
        }

        let filtered = store.query_events(Some(vec![1, 3])).await.unwrap();
        let actors: Vec<i64> = filtered.iter().map(|e| e.user_id).collect();
        assert_eq!(actors, vec![1, 3]);

        assert_eq!(store.query_events(None).await.unwrap().len(), 3);
    }
}
