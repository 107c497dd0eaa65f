//! Popularity ranking, director listings, search and review usefulness

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use std::sync::Arc;

use crate::{
    db::Store,
    error::{AppError, AppResult},
    models::{vote_weight, Film, ReviewVote, MIN_RELEASE_YEAR},
};

use super::{require_review, require_user};

/// Ordering for a director's filmography
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectorSort {
    /// Release date ascending
    Year,
    /// Like count descending, then release date ascending
    Likes,
    /// Same order as `Year`
    #[default]
    Default,
}

impl FromStr for DirectorSort {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "year" => Ok(DirectorSort::Year),
            "likes" => Ok(DirectorSort::Likes),
            other => Err(AppError::InvalidInput(format!(
                "Unknown sort mode '{}', expected 'year' or 'likes'",
                other
            ))),
        }
    }
}

/// Which fields a search query is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Title,
    Director,
    TitleAndDirector,
}

impl SearchScope {
    fn matches_title(&self) -> bool {
        matches!(self, SearchScope::Title | SearchScope::TitleAndDirector)
    }

    fn matches_director(&self) -> bool {
        matches!(self, SearchScope::Director | SearchScope::TitleAndDirector)
    }
}

impl FromStr for SearchScope {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: BTreeSet<String> = s
            .split(',')
            .map(|part| part.trim().to_ascii_lowercase())
            .collect();
        let parts: Vec<&str> = parts.iter().map(String::as_str).collect();

        match parts.as_slice() {
            ["title"] => Ok(SearchScope::Title),
            ["director"] => Ok(SearchScope::Director),
            ["director", "title"] => Ok(SearchScope::TitleAndDirector),
            _ => Err(AppError::InvalidInput(format!(
                "Unknown search scope '{}', expected 'title', 'director' or both",
                s
            ))),
        }
    }
}

#[derive(Clone)]
pub struct RankingEngine {
    store: Arc<dyn Store>,
}

impl RankingEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Most-liked films first, ties broken by film id
    ///
    /// Genre and year filters compose. A non-positive limit yields nothing.
    #[tracing::instrument(skip(self))]
    pub async fn popular_films(
        &self,
        limit: i64,
        genre_id: Option<i32>,
        year: Option<i32>,
    ) -> AppResult<Vec<Film>> {
        if let Some(year) = year {
            if year < MIN_RELEASE_YEAR {
                return Err(AppError::InvalidInput(format!(
                    "Year must not be earlier than {}",
                    MIN_RELEASE_YEAR
                )));
            }
        }
        if let Some(genre_id) = genre_id {
            if self.store.get_genre(genre_id).await?.is_none() {
                return Err(AppError::not_found("Genre", genre_id));
            }
        }
        if limit <= 0 {
            return Ok(Vec::new());
        }

        let counts = self.store.like_counts().await?;
        let mut films: Vec<Film> = self
            .store
            .all_films()
            .await?
            .into_iter()
            .filter(|film| genre_id.map_or(true, |id| film.has_genre(id)))
            .filter(|film| year.map_or(true, |year| film.release_year() == year))
            .collect();

        films.sort_by_key(|film| (Reverse(like_count(&counts, film.id)), film.id));
        films.truncate(usize::try_from(limit).unwrap_or(usize::MAX));

        tracing::debug!(returned = films.len(), "Ranked popular films");
        Ok(films)
    }

    #[tracing::instrument(skip(self))]
    pub async fn films_by_director(
        &self,
        director_id: i64,
        sort: DirectorSort,
    ) -> AppResult<Vec<Film>> {
        if self.store.get_director(director_id).await?.is_none() {
            return Err(AppError::not_found("Director", director_id));
        }

        let mut films = self.store.films_by_director(director_id).await?;
        match sort {
            DirectorSort::Year | DirectorSort::Default => {
                films.sort_by_key(|film| (film.release_date, film.id));
            }
            DirectorSort::Likes => {
                let counts = self.store.like_counts().await?;
                films.sort_by_key(|film| {
                    (
                        Reverse(like_count(&counts, film.id)),
                        film.release_date,
                        film.id,
                    )
                });
            }
        }
        Ok(films)
    }

    /// Case-insensitive substring search over titles and/or director names
    #[tracing::instrument(skip(self))]
    pub async fn search_films(&self, query: &str, scope: SearchScope) -> AppResult<Vec<Film>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let counts = self.store.like_counts().await?;
        let mut films: Vec<Film> = self
            .store
            .all_films()
            .await?
            .into_iter()
            .filter(|film| {
                (scope.matches_title() && film.name.to_lowercase().contains(&needle))
                    || (scope.matches_director()
                        && film
                            .directors
                            .iter()
                            .any(|director| director.name.to_lowercase().contains(&needle)))
            })
            .collect();

        films.sort_by_cached_key(|film| {
            (
                Reverse(like_count(&counts, film.id)),
                film.name.to_lowercase(),
                film.name.clone(),
                film.id,
            )
        });
        Ok(films)
    }

    /// Records a like or dislike of a review and returns its new usefulness
    ///
    /// Repeating a vote is a no-op; flipping it moves usefulness by two.
    #[tracing::instrument(skip(self))]
    pub async fn cast_vote(&self, review_id: i64, user_id: i64, is_like: bool) -> AppResult<i64> {
        let review = require_review(self.store.as_ref(), review_id).await?;
        require_user(self.store.as_ref(), user_id).await?;

        let delta = match self.store.get_vote(review_id, user_id).await? {
            Some(existing) if existing.is_like == is_like => return Ok(review.useful),
            Some(_) => 2 * vote_weight(is_like),
            None => vote_weight(is_like),
        };

        self.store
            .upsert_vote(ReviewVote {
                review_id,
                user_id,
                is_like,
            })
            .await?;
        let useful = self.store.adjust_usefulness(review_id, delta).await?;

        tracing::info!(review_id, user_id, is_like, useful, "Vote cast");
        Ok(useful)
    }

    /// Withdraws a vote of the given polarity and returns the new usefulness
    #[tracing::instrument(skip(self))]
    pub async fn remove_vote(
        &self,
        review_id: i64,
        user_id: i64,
        is_like: bool,
    ) -> AppResult<i64> {
        require_review(self.store.as_ref(), review_id).await?;
        require_user(self.store.as_ref(), user_id).await?;

        match self.store.get_vote(review_id, user_id).await? {
            Some(existing) if existing.is_like == is_like => {}
            _ => {
                return Err(AppError::NotFound(format!(
                    "{} by user {} on review {} not found",
                    if is_like { "Like" } else { "Dislike" },
                    user_id,
                    review_id
                )))
            }
        }

        self.store.delete_vote(review_id, user_id).await?;
        let useful = self
            .store
            .adjust_usefulness(review_id, -vote_weight(is_like))
            .await?;

        tracing::info!(review_id, user_id, is_like, useful, "Vote removed");
        Ok(useful)
    }

    /// Stored, incrementally maintained usefulness
    pub async fn usefulness(&self, review_id: i64) -> AppResult<i64> {
        Ok(require_review(self.store.as_ref(), review_id).await?.useful)
    }

    /// Usefulness recomputed from the votes themselves
    #[tracing::instrument(skip(self))]
    pub async fn recompute_usefulness(&self, review_id: i64) -> AppResult<i64> {
        let review = require_review(self.store.as_ref(), review_id).await?;
        let recomputed: i64 = self
            .store
            .review_votes(review_id)
            .await?
            .iter()
            .map(|vote| vote_weight(vote.is_like))
            .sum();

        if recomputed != review.useful {
            tracing::warn!(
                review_id,
                stored = review.useful,
                recomputed,
                "Stored usefulness drifted from votes"
            );
        }
        Ok(recomputed)
    }
}

fn like_count(counts: &HashMap<i64, usize>, film_id: i64) -> usize {
    counts.get(&film_id).copied().unwrap_or(0)
}
