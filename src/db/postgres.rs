use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::Store,
    error::{AppError, AppResult},
    models::{
        Director, Event, Film, FriendEdge, Genre, MpaRating, NewEvent, NewFilm, NewReview,
        NewUser, Review, ReviewVote, User,
    },
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the bundled migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// PostgreSQL-backed store
///
/// Multi-statement writes run inside a transaction; usefulness adjustments
/// are single `UPDATE ... RETURNING` statements.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn hydrate(&self, rows: Vec<FilmRow>) -> AppResult<Vec<Film>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

        let genre_rows = sqlx::query_as::<_, (i64, i32, String)>(
            r#"
            SELECT fg.film_id, g.id, g.name
            FROM film_genres fg
            JOIN genres g ON g.id = fg.genre_id
            WHERE fg.film_id = ANY($1)
            ORDER BY fg.film_id, g.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let director_rows = sqlx::query_as::<_, (i64, i64, String)>(
            r#"
            SELECT fd.film_id, d.id, d.name
            FROM film_directors fd
            JOIN directors d ON d.id = fd.director_id
            WHERE fd.film_id = ANY($1)
            ORDER BY fd.film_id, d.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut genres: HashMap<i64, Vec<Genre>> = HashMap::new();
        for (film_id, id, name) in genre_rows {
            genres.entry(film_id).or_default().push(Genre { id, name });
        }

        let mut directors: HashMap<i64, Vec<Director>> = HashMap::new();
        for (film_id, id, name) in director_rows {
            directors
                .entry(film_id)
                .or_default()
                .push(Director { id, name });
        }

        rows.into_iter()
            .map(|row| {
                let film_genres = genres.remove(&row.id).unwrap_or_default();
                let film_directors = directors.remove(&row.id).unwrap_or_default();
                row.into_film(film_genres, film_directors)
            })
            .collect()
    }

    async fn fetch_film(&self, id: i64) -> AppResult<Option<Film>> {
        let row = sqlx::query_as::<_, FilmRow>(
            "SELECT id, name, description, release_date, duration, mpa_id FROM films WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    async fn write_film_links(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        film_id: i64,
        film: &NewFilm,
    ) -> AppResult<()> {
        let genre_ids: Vec<i32> = film.genre_ids.iter().copied().collect();
        let director_ids: Vec<i64> = film.director_ids.iter().copied().collect();

        sqlx::query("DELETE FROM film_genres WHERE film_id = $1")
            .bind(film_id)
            .execute(&mut **tx)
            .await?;
        sqlx::query("DELETE FROM film_directors WHERE film_id = $1")
            .bind(film_id)
            .execute(&mut **tx)
            .await?;

        sqlx::query(
            "INSERT INTO film_genres (film_id, genre_id) SELECT $1, UNNEST($2::INTEGER[])",
        )
        .bind(film_id)
        .bind(&genre_ids)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            "INSERT INTO film_directors (film_id, director_id) SELECT $1, UNNEST($2::BIGINT[])",
        )
        .bind(film_id)
        .bind(&director_ids)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, login, name, birthday)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, login, name, birthday
            "#,
        )
        .bind(&user.email)
        .bind(&user.login)
        .bind(&user.name)
        .bind(user.birthday)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update_user(&self, id: i64, user: NewUser) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users SET email = $2, login = $3, name = $4, birthday = $5
            WHERE id = $1
            RETURNING id, email, login, name, birthday
            "#,
        )
        .bind(id)
        .bind(&user.email)
        .bind(&user.login)
        .bind(&user.name)
        .bind(user.birthday)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn get_user(&self, id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, login, name, birthday FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, login, name, birthday FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_user_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, login, name, birthday FROM users WHERE login = $1",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn users_by_ids(&self, ids: &[i64]) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, login, name, birthday FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn all_users(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, login, name, birthday FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_user(&self, id: i64) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        // Votes disappear with the user, so their weight leaves first
        sqlx::query(
            r#"
            UPDATE reviews r SET useful = r.useful - v.total
            FROM (
                SELECT review_id, SUM(CASE WHEN is_like THEN 1 ELSE -1 END) AS total
                FROM review_votes
                WHERE user_id = $1
                GROUP BY review_id
            ) v
            WHERE r.id = v.review_id
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn create_film(&self, film: NewFilm) -> AppResult<Film> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO films (name, description, release_date, duration, mpa_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.release_date)
        .bind(film.duration)
        .bind(film.mpa.id())
        .fetch_one(&mut *tx)
        .await?;

        Self::write_film_links(&mut tx, id, &film).await?;
        tx.commit().await?;

        self.fetch_film(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Film {} vanished after insert", id)))
    }

    async fn update_film(&self, id: i64, film: NewFilm) -> AppResult<Option<Film>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE films
            SET name = $2, description = $3, release_date = $4, duration = $5, mpa_id = $6
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.release_date)
        .bind(film.duration)
        .bind(film.mpa.id())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Ok(None);
        }

        Self::write_film_links(&mut tx, id, &film).await?;
        tx.commit().await?;

        self.fetch_film(id).await
    }

    async fn get_film(&self, id: i64) -> AppResult<Option<Film>> {
        self.fetch_film(id).await
    }

    async fn films_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Film>> {
        let rows = sqlx::query_as::<_, FilmRow>(
            r#"
            SELECT id, name, description, release_date, duration, mpa_id
            FROM films
            WHERE id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    async fn all_films(&self) -> AppResult<Vec<Film>> {
        let rows = sqlx::query_as::<_, FilmRow>(
            "SELECT id, name, description, release_date, duration, mpa_id FROM films ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    async fn delete_film(&self, id: i64) -> AppResult<bool> {
        let deleted = sqlx::query("DELETE FROM films WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn all_genres(&self) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, (i32, String)>("SELECT id, name FROM genres ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| Genre { id, name })
            .collect())
    }

    async fn get_genre(&self, id: i32) -> AppResult<Option<Genre>> {
        let row = sqlx::query_as::<_, (i32, String)>("SELECT id, name FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(id, name)| Genre { id, name }))
    }

    async fn create_director(&self, name: String) -> AppResult<Director> {
        let id: i64 = sqlx::query_scalar("INSERT INTO directors (name) VALUES ($1) RETURNING id")
            .bind(&name)
            .fetch_one(&self.pool)
            .await?;

        Ok(Director { id, name })
    }

    async fn update_director(&self, director: Director) -> AppResult<Option<Director>> {
        let updated = sqlx::query("UPDATE directors SET name = $2 WHERE id = $1")
            .bind(director.id)
            .bind(&director.name)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok((updated > 0).then_some(director))
    }

    async fn get_director(&self, id: i64) -> AppResult<Option<Director>> {
        let row = sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM directors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(id, name)| Director { id, name }))
    }

    async fn all_directors(&self) -> AppResult<Vec<Director>> {
        let rows = sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM directors ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| Director { id, name })
            .collect())
    }

    async fn delete_director(&self, id: i64) -> AppResult<bool> {
        let deleted = sqlx::query("DELETE FROM directors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn films_by_director(&self, director_id: i64) -> AppResult<Vec<Film>> {
        let rows = sqlx::query_as::<_, FilmRow>(
            r#"
            SELECT f.id, f.name, f.description, f.release_date, f.duration, f.mpa_id
            FROM films f
            JOIN film_directors fd ON fd.film_id = f.id
            WHERE fd.director_id = $1
            ORDER BY f.id
            "#,
        )
        .bind(director_id)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    async fn add_like(&self, film_id: i64, user_id: i64) -> AppResult<bool> {
        let inserted = sqlx::query(
            "INSERT INTO likes (film_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(film_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(inserted > 0)
    }

    async fn remove_like(&self, film_id: i64, user_id: i64) -> AppResult<bool> {
        let deleted = sqlx::query("DELETE FROM likes WHERE film_id = $1 AND user_id = $2")
            .bind(film_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn likes_for_film(&self, film_id: i64) -> AppResult<HashSet<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT user_id FROM likes WHERE film_id = $1")
            .bind(film_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().collect())
    }

    async fn likes_for_user(&self, user_id: i64) -> AppResult<HashSet<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT film_id FROM likes WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().collect())
    }

    async fn like_counts(&self) -> AppResult<HashMap<i64, usize>> {
        let rows = sqlx::query_as::<_, (i64, i64)>(
            "SELECT film_id, COUNT(*) FROM likes GROUP BY film_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(film_id, count)| (film_id, count.max(0) as usize))
            .collect())
    }

    async fn likes_by_user(&self) -> AppResult<HashMap<i64, HashSet<i64>>> {
        let rows = sqlx::query_as::<_, (i64, i64)>("SELECT user_id, film_id FROM likes")
            .fetch_all(&self.pool)
            .await?;

        let mut by_user: HashMap<i64, HashSet<i64>> = HashMap::new();
        for (user_id, film_id) in rows {
            by_user.entry(user_id).or_default().insert(film_id);
        }
        Ok(by_user)
    }

    async fn add_friend(&self, user_id: i64, friend_id: i64) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO friendships (user_id, friend_id, confirmed)
            VALUES (
                $1, $2,
                EXISTS (SELECT 1 FROM friendships WHERE user_id = $2 AND friend_id = $1)
            )
            ON CONFLICT (user_id, friend_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(friend_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted > 0 {
            sqlx::query(
                "UPDATE friendships SET confirmed = TRUE WHERE user_id = $1 AND friend_id = $2",
            )
            .bind(friend_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(inserted > 0)
    }

    async fn remove_friend(&self, user_id: i64, friend_id: i64) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM friendships WHERE user_id = $1 AND friend_id = $2")
            .bind(user_id)
            .bind(friend_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted > 0 {
            sqlx::query(
                "UPDATE friendships SET confirmed = FALSE WHERE user_id = $1 AND friend_id = $2",
            )
            .bind(friend_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn friend_edges(&self, user_id: i64) -> AppResult<Vec<FriendEdge>> {
        let rows = sqlx::query_as::<_, (i64, i64, bool)>(
            r#"
            SELECT user_id, friend_id, confirmed
            FROM friendships
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(user_id, friend_id, confirmed)| FriendEdge {
                user_id,
                friend_id,
                confirmed,
            })
            .collect())
    }

    async fn create_review(&self, review: NewReview) -> AppResult<Review> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            INSERT INTO reviews (content, is_positive, user_id, film_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, content, is_positive, user_id, film_id, created_at, useful
            "#,
        )
        .bind(&review.content)
        .bind(review.is_positive)
        .bind(review.user_id)
        .bind(review.film_id)
        .bind(review.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update_review(
        &self,
        id: i64,
        content: String,
        is_positive: bool,
    ) -> AppResult<Option<Review>> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            UPDATE reviews SET content = $2, is_positive = $3
            WHERE id = $1
            RETURNING id, content, is_positive, user_id, film_id, created_at, useful
            "#,
        )
        .bind(id)
        .bind(&content)
        .bind(is_positive)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn get_review(&self, id: i64) -> AppResult<Option<Review>> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, content, is_positive, user_id, film_id, created_at, useful
            FROM reviews
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete_review(&self, id: i64) -> AppResult<bool> {
        let deleted = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn reviews(&self, film_id: Option<i64>, limit: usize) -> AppResult<Vec<Review>> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, content, is_positive, user_id, film_id, created_at, useful
            FROM reviews
            WHERE ($1::BIGINT IS NULL OR film_id = $1)
            ORDER BY useful DESC, id ASC
            LIMIT $2
            "#,
        )
        .bind(film_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn review_votes(&self, review_id: i64) -> AppResult<Vec<ReviewVote>> {
        let rows = sqlx::query_as::<_, (i64, i64, bool)>(
            "SELECT review_id, user_id, is_like FROM review_votes WHERE review_id = $1 ORDER BY user_id",
        )
        .bind(review_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(review_id, user_id, is_like)| ReviewVote {
                review_id,
                user_id,
                is_like,
            })
            .collect())
    }

    async fn get_vote(&self, review_id: i64, user_id: i64) -> AppResult<Option<ReviewVote>> {
        let is_like: Option<bool> = sqlx::query_scalar(
            "SELECT is_like FROM review_votes WHERE review_id = $1 AND user_id = $2",
        )
        .bind(review_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(is_like.map(|is_like| ReviewVote {
            review_id,
            user_id,
            is_like,
        }))
    }

    async fn upsert_vote(&self, vote: ReviewVote) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO review_votes (review_id, user_id, is_like)
            VALUES ($1, $2, $3)
            ON CONFLICT (review_id, user_id) DO UPDATE SET is_like = EXCLUDED.is_like
            "#,
        )
        .bind(vote.review_id)
        .bind(vote.user_id)
        .bind(vote.is_like)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_vote(&self, review_id: i64, user_id: i64) -> AppResult<bool> {
        let deleted = sqlx::query("DELETE FROM review_votes WHERE review_id = $1 AND user_id = $2")
            .bind(review_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn adjust_usefulness(&self, review_id: i64, delta: i64) -> AppResult<i64> {
        let useful: Option<i64> =
            sqlx::query_scalar("UPDATE reviews SET useful = useful + $2 WHERE id = $1 RETURNING useful")
                .bind(review_id)
                .bind(delta)
                .fetch_optional(&self.pool)
                .await?;

        useful.ok_or_else(|| AppError::not_found("Review", review_id))
    }

    async fn append_event(&self, event: NewEvent) -> AppResult<Event> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO events (user_id, entity_id, event_type, operation, timestamp)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(event.user_id)
        .bind(event.entity_id)
        .bind(event.event_type.as_str())
        .bind(event.operation.as_str())
        .bind(event.timestamp)
        .fetch_one(&self.pool)
        .await?;

        Ok(event.into_event(id))
    }

    async fn query_events(&self, actors: Option<Vec<i64>>) -> AppResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, user_id, entity_id, event_type, operation, timestamp
            FROM events
            WHERE ($1::BIGINT[] IS NULL OR user_id = ANY($1))
            ORDER BY timestamp ASC, id ASC
            "#,
        )
        .bind(actors)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

// Database row representations
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    login: String,
    name: String,
    birthday: Option<NaiveDate>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            login: row.login,
            name: row.name,
            birthday: row.birthday,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FilmRow {
    id: i64,
    name: String,
    description: String,
    release_date: NaiveDate,
    duration: i32,
    mpa_id: i32,
}

impl FilmRow {
    fn into_film(self, genres: Vec<Genre>, directors: Vec<Director>) -> AppResult<Film> {
        let mpa = MpaRating::from_id(self.mpa_id).ok_or_else(|| {
            AppError::Internal(format!("Film {} has unknown MPA id {}", self.id, self.mpa_id))
        })?;

        Ok(Film {
            id: self.id,
            name: self.name,
            description: self.description,
            release_date: self.release_date,
            duration: self.duration,
            mpa,
            genres,
            directors,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    content: String,
    is_positive: bool,
    user_id: i64,
    film_id: i64,
    created_at: DateTime<Utc>,
    useful: i64,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            content: row.content,
            is_positive: row.is_positive,
            user_id: row.user_id,
            film_id: row.film_id,
            created_at: row.created_at,
            useful: row.useful,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: i64,
    user_id: i64,
    entity_id: i64,
    event_type: String,
    operation: String,
    timestamp: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = AppError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Event {
            id: row.id,
            user_id: row.user_id,
            entity_id: row.entity_id,
            event_type: row.event_type.parse().map_err(AppError::Internal)?,
            operation: row.operation.parse().map_err(AppError::Internal)?,
            timestamp: row.timestamp,
        })
    }
}

