use std::sync::Arc;

use chrono::NaiveDate;

use cinegraph::{
    db::{InMemoryStore, Store},
    error::AppError,
    models::{Film, MpaRating, NewFilm, NewReview, NewUser},
    services::{
        DirectorSort, EventFeed, GraphQueries, LikeService, RankingEngine, RecommendationEngine,
    },
};

struct World {
    store: Arc<InMemoryStore>,
    ranking: RankingEngine,
    graph: GraphQueries,
    likes: LikeService,
    recommendations: RecommendationEngine,
}

impl World {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let feed = EventFeed::new(store.clone());
        Self {
            ranking: RankingEngine::new(store.clone()),
            graph: GraphQueries::new(store.clone(), feed.clone()),
            likes: LikeService::new(store.clone(), feed),
            recommendations: RecommendationEngine::new(store.clone()),
            store,
        }
    }

    async fn user(&self, login: &str) -> i64 {
        let user = NewUser::new(format!("{}@cinema.test", login), login.into(), None, None)
            .unwrap();
        self.store.create_user(user).await.unwrap().id
    }

    async fn film(&self, name: &str, date: (i32, u32, u32), genres: &[i32], directors: &[i64]) -> i64 {
        let film = NewFilm::new(
            name.into(),
            None,
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            95,
            MpaRating::Pg,
            genres.iter().copied(),
            directors.iter().copied(),
        )
        .unwrap();
        self.store.create_film(film).await.unwrap().id
    }

    async fn like(&self, user: i64, films: &[i64]) {
        for film in films {
            self.likes.add_like(*film, user).await.unwrap();
        }
    }
}

fn ids(films: &[Film]) -> Vec<i64> {
    films.iter().map(|film| film.id).collect()
}

fn position(films: &[Film], id: i64) -> usize {
    films.iter().position(|film| film.id == id).unwrap()
}

#[tokio::test]
async fn test_recommendation_picks_largest_overlap() {
    let world = World::new();
    let a = world.user("a").await;
    let b = world.user("b").await;
    let c = world.user("c").await;
    let mut films = Vec::new();
    for n in 1..=4 {
        films.push(world.film(&format!("Film {}", n), (2000, 1, n), &[], &[]).await);
    }

    world.like(a, &[films[0], films[1], films[2]]).await;
    world.like(b, &[films[0], films[1], films[3]]).await;
    world.like(c, &[films[0]]).await;

    let recommended = world.recommendations.recommend(a).await.unwrap();
    assert_eq!(ids(&recommended), vec![films[3]]);

    let mine = world.store.likes_for_user(a).await.unwrap();
    assert!(recommended.iter().all(|film| !mine.contains(&film.id)));
}

#[tokio::test]
async fn test_popular_counts_match_likes() {
    let world = World::new();
    let users = [
        world.user("u1").await,
        world.user("u2").await,
        world.user("u3").await,
    ];
    let x = world.film("X", (2000, 1, 1), &[], &[]).await;
    let y = world.film("Y", (2000, 1, 1), &[], &[]).await;
    world.like(users[0], &[x, y]).await;
    world.like(users[1], &[y]).await;

    let ranked = world.ranking.popular_films(10, None, None).await.unwrap();
    let counts = world.store.like_counts().await.unwrap();
    for film in &ranked {
        let likes = world.store.likes_for_film(film.id).await.unwrap();
        assert_eq!(counts.get(&film.id).copied().unwrap_or(0), likes.len());
    }
    assert_eq!(ids(&ranked), vec![y, x]);
}

#[tokio::test]
async fn test_adding_a_like_never_lowers_rank() {
    let world = World::new();
    let u1 = world.user("u1").await;
    let u2 = world.user("u2").await;
    let u3 = world.user("u3").await;
    let a = world.film("A", (2000, 1, 1), &[], &[]).await;
    let b = world.film("B", (2000, 1, 1), &[], &[]).await;
    let c = world.film("C", (2000, 1, 1), &[], &[]).await;
    world.like(u1, &[a, b]).await;
    world.like(u2, &[a]).await;

    let before = world.ranking.popular_films(10, None, None).await.unwrap();
    world.like(u3, &[c]).await;
    let after = world.ranking.popular_films(10, None, None).await.unwrap();

    assert!(position(&after, c) <= position(&before, c));
}

#[tokio::test]
async fn test_like_is_idempotent() {
    let world = World::new();
    let user = world.user("fan").await;
    let film = world.film("Again", (2000, 1, 1), &[], &[]).await;

    world.like(user, &[film]).await;
    let once = world.store.likes_for_film(film).await.unwrap().len();
    world.like(user, &[film]).await;
    let twice = world.store.likes_for_film(film).await.unwrap().len();
    assert_eq!(once, twice);
}

#[tokio::test]
async fn test_mutual_friends_with_self_equals_friends() {
    let world = World::new();
    let u = world.user("u").await;
    let f1 = world.user("f1").await;
    let f2 = world.user("f2").await;
    world.graph.add_friend(u, f2).await.unwrap();
    world.graph.add_friend(u, f1).await.unwrap();

    assert_eq!(
        world.graph.mutual_friends(u, u).await.unwrap(),
        world.graph.friends_of(u).await.unwrap()
    );
}

#[tokio::test]
async fn test_common_films_with_self_conflicts() {
    let world = World::new();
    let u = world.user("u").await;
    assert!(matches!(
        world.graph.common_films(u, u).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_vote_flip_deltas() {
    let world = World::new();
    let author = world.user("author").await;
    let voter = world.user("voter").await;
    let other = world.user("other").await;
    let film = world.film("Voted", (2000, 1, 1), &[], &[]).await;
    let review = world
        .store
        .create_review(NewReview::new("Fine".into(), true, author, film).unwrap())
        .await
        .unwrap()
        .id;

    let start = world.ranking.usefulness(review).await.unwrap();
    let after_dislike = world.ranking.cast_vote(review, voter, false).await.unwrap();
    let after_flip = world.ranking.cast_vote(review, voter, true).await.unwrap();
    assert_eq!(after_dislike, start - 1);
    assert_eq!(after_flip - after_dislike, 2);

    let fresh = world.ranking.cast_vote(review, other, true).await.unwrap();
    assert_eq!(fresh - after_flip, 1);

    let removed = world.ranking.remove_vote(review, other, true).await.unwrap();
    assert_eq!(removed - fresh, -1);

    assert_eq!(
        world.ranking.usefulness(review).await.unwrap(),
        world.ranking.recompute_usefulness(review).await.unwrap()
    );
}

#[tokio::test]
async fn test_genre_filter_scenario() {
    let world = World::new();
    let u1 = world.user("u1").await;
    let u2 = world.user("u2").await;
    let x = world.film("X", (2000, 1, 1), &[1], &[]).await;
    let y = world.film("Y", (2000, 1, 1), &[2], &[]).await;
    world.like(u1, &[x]).await;
    world.like(u2, &[y]).await;

    let comedies = world.ranking.popular_films(10, Some(1), None).await.unwrap();
    assert_eq!(ids(&comedies), vec![x]);
}

#[tokio::test]
async fn test_director_by_year_scenario() {
    let world = World::new();
    let director = world.store.create_director("Director".into()).await.unwrap().id;
    let late = world.film("Late", (2020, 3, 1), &[], &[director]).await;
    let early = world.film("Early", (2018, 3, 1), &[], &[director]).await;

    let films = world
        .ranking
        .films_by_director(director, DirectorSort::Year)
        .await
        .unwrap();
    assert_eq!(ids(&films), vec![early, late]);
}

#[tokio::test]
async fn test_popular_ties_break_on_film_id() {
    let world = World::new();
    let u = world.user("u").await;
    let first = world.film("Zeta", (2000, 1, 1), &[], &[]).await;
    let second = world.film("Alpha", (2000, 1, 1), &[], &[]).await;
    world.like(u, &[second, first]).await;

    let films = world.ranking.popular_films(10, None, None).await.unwrap();
    assert_eq!(ids(&films), vec![first, second]);
}
