use std::collections::HashSet;
use std::sync::Arc;

use crate::{db::Store, error::AppResult, models::Film};

use super::require_user;

/// Nearest-neighbour film recommendations
///
/// The neighbour is the single other user sharing the most liked films with
/// the target; ties go to the lowest user id. The recommendation is whatever
/// that neighbour liked and the target has not, ordered by film id.
#[derive(Clone)]
pub struct RecommendationEngine {
    store: Arc<dyn Store>,
}

impl RecommendationEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn recommend(&self, user_id: i64) -> AppResult<Vec<Film>> {
        require_user(self.store.as_ref(), user_id).await?;

        let mut likes = self.store.likes_by_user().await?;
        let Some(mine) = likes.remove(&user_id) else {
            return Ok(Vec::new());
        };

        let Some((neighbour_id, overlap, theirs)) = best_neighbour(&mine, likes) else {
            tracing::debug!(user_id, "No neighbour shares a liked film");
            return Ok(Vec::new());
        };

        let fresh: Vec<i64> = theirs.difference(&mine).copied().collect();
        tracing::debug!(
            user_id,
            neighbour_id,
            overlap,
            candidates = fresh.len(),
            "Selected neighbour"
        );
        if fresh.is_empty() {
            return Ok(Vec::new());
        }

        let mut films = self.store.films_by_ids(&fresh).await?;
        films.sort_by_key(|film| film.id);
        films.dedup_by_key(|film| film.id);
        Ok(films)
    }
}

/// Highest-overlap user with at least one shared like
fn best_neighbour(
    mine: &HashSet<i64>,
    others: impl IntoIterator<Item = (i64, HashSet<i64>)>,
) -> Option<(i64, usize, HashSet<i64>)> {
    let mut best: Option<(i64, usize, HashSet<i64>)> = None;

    for (user_id, theirs) in others {
        let overlap = theirs.intersection(mine).count();
        if overlap == 0 {
            continue;
        }
        let better = match &best {
            None => true,
            Some((best_id, best_overlap, _)) => {
                overlap > *best_overlap || (overlap == *best_overlap && user_id < *best_id)
            }
        };
        if better {
            best = Some((user_id, overlap, theirs));
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{InMemoryStore, MockStore},
        error::AppError,
        models::{MpaRating, NewFilm, NewUser, User},
    };
    use chrono::NaiveDate;
    use std::collections::HashMap;

    async fn seed(store: &InMemoryStore, users: usize, films: usize) -> (Vec<i64>, Vec<i64>) {
        let mut user_ids = Vec::new();
        for n in 0..users {
            let login = format!("viewer{}", n);
            let user = NewUser::new(format!("{}@mail.test", login), login, None, None).unwrap();
            user_ids.push(store.create_user(user).await.unwrap().id);
        }

        let mut film_ids = Vec::new();
        for n in 0..films {
            let film = NewFilm::new(
                format!("Film {}", n),
                None,
                NaiveDate::from_ymd_opt(2000 + n as i32, 1, 1).unwrap(),
                100,
                MpaRating::Pg,
                [],
                [],
            )
            .unwrap();
            film_ids.push(store.create_film(film).await.unwrap().id);
        }
        (user_ids, film_ids)
    }

    fn set(ids: &[i64]) -> HashSet<i64> {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_best_neighbour_prefers_overlap_then_lowest_id() {
        let mine = set(&[1, 2, 3]);
        let others = vec![(9, set(&[1, 2])), (4, set(&[2, 3, 7])), (5, set(&[8]))];
        let (id, overlap, _) = best_neighbour(&mine, others).unwrap();
        assert_eq!((id, overlap), (4, 2));

        let others = vec![(9, set(&[1, 2])), (4, set(&[1, 2]))];
        assert_eq!(best_neighbour(&mine, others).unwrap().0, 4);

        assert!(best_neighbour(&mine, vec![(2, set(&[10]))]).is_none());
    }

    #[tokio::test]
    async fn test_recommends_from_closest_neighbour() {
        let store = Arc::new(InMemoryStore::new());
        let (users, films) = seed(&store, 3, 4).await;
        let (a, b, c) = (users[0], users[1], users[2]);

        // A likes {1,2,3}; B likes {1,2,3,4}; C likes {1}
        for film in &films[..3] {
            store.add_like(*film, a).await.unwrap();
        }
        for film in &films {
            store.add_like(*film, b).await.unwrap();
        }
        store.add_like(films[0], c).await.unwrap();

        let engine = RecommendationEngine::new(store);
        let recommended = engine.recommend(a).await.unwrap();
        let ids: Vec<i64> = recommended.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![films[3]]);
    }

    #[tokio::test]
    async fn test_runner_up_neighbour_contributes_nothing() {
        let store = Arc::new(InMemoryStore::new());
        let (users, films) = seed(&store, 3, 9).await;
        let (a, b, c) = (users[0], users[1], users[2]);

        // B shares 5 films with A, C shares 4; both have extras of their own
        for film in &films[..5] {
            store.add_like(*film, a).await.unwrap();
        }
        for film in films[..5].iter().chain(&films[5..7]) {
            store.add_like(*film, b).await.unwrap();
        }
        for film in films[..4].iter().chain(&films[7..9]) {
            store.add_like(*film, c).await.unwrap();
        }

        let engine = RecommendationEngine::new(store);
        let ids: Vec<i64> = engine
            .recommend(a)
            .await
            .unwrap()
            .iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec![films[5], films[6]]);
        assert!(!ids.contains(&films[7]) && !ids.contains(&films[8]));
    }

    #[tokio::test]
    async fn test_recommendation_excludes_own_likes() {
        let store = Arc::new(InMemoryStore::new());
        let (users, films) = seed(&store, 2, 3).await;
        for film in &films {
            store.add_like(*film, users[1]).await.unwrap();
        }
        store.add_like(films[1], users[0]).await.unwrap();

        let engine = RecommendationEngine::new(store.clone());
        let recommended = engine.recommend(users[0]).await.unwrap();
        let mine = store.likes_for_user(users[0]).await.unwrap();
        assert!(recommended.iter().all(|film| !mine.contains(&film.id)));
        assert_eq!(recommended.len(), 2);
    }

    #[tokio::test]
    async fn test_tied_neighbours_resolve_to_lowest_id() {
        let store = Arc::new(InMemoryStore::new());
        let (users, films) = seed(&store, 3, 3).await;
        store.add_like(films[0], users[0]).await.unwrap();

        // Both neighbours share one film; the later user would add film 2
        store.add_like(films[0], users[2]).await.unwrap();
        store.add_like(films[2], users[2]).await.unwrap();
        store.add_like(films[0], users[1]).await.unwrap();
        store.add_like(films[1], users[1]).await.unwrap();

        let engine = RecommendationEngine::new(store);
        let recommended = engine.recommend(users[0]).await.unwrap();
        let ids: Vec<i64> = recommended.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![films[1]]);
    }

    #[tokio::test]
    async fn test_no_likes_or_no_overlap_yields_nothing() {
        let store = Arc::new(InMemoryStore::new());
        let (users, films) = seed(&store, 2, 2).await;
        let engine = RecommendationEngine::new(store.clone());
        assert!(engine.recommend(users[0]).await.unwrap().is_empty());

        store.add_like(films[0], users[0]).await.unwrap();
        store.add_like(films[1], users[1]).await.unwrap();
        assert!(engine.recommend(users[0]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let engine = RecommendationEngine::new(Arc::new(InMemoryStore::new()));
        assert!(matches!(
            engine.recommend(3).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reads_likes_once_and_skips_film_fetch_without_neighbour() {
        let mut store = MockStore::new();
        store.expect_get_user().returning(|id| {
            Ok(Some(User {
                id,
                email: "x@y.z".into(),
                login: "x".into(),
                name: "x".into(),
                birthday: None,
            }))
        });
        store.expect_likes_by_user().times(1).returning(|| {
            let mut likes = HashMap::new();
            likes.insert(1, set(&[10]));
            likes.insert(2, set(&[11]));
            Ok(likes)
        });
        store.expect_films_by_ids().never();

        let engine = RecommendationEngine::new(Arc::new(store));
        assert!(engine.recommend(1).await.unwrap().is_empty());
    }
}
