use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    api::AppState,
    error::AppResult,
    models::{Film, Mpa, NewFilm},
    services::{DirectorSort, SearchScope},
};

use super::required_id;

const DEFAULT_POPULAR_COUNT: i64 = 10;

// Request types

/// Reference to a lookup row; any other fields sent alongside are ignored
#[derive(Debug, Deserialize)]
pub struct IdRef<T> {
    pub id: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmRequest {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub release_date: NaiveDate,
    pub duration: i32,
    pub mpa: Mpa,
    #[serde(default)]
    pub genres: Vec<IdRef<i32>>,
    #[serde(default)]
    pub directors: Vec<IdRef<i64>>,
}

impl FilmRequest {
    /// Validates the body; an unknown MPA id is reported as missing
    fn into_new_film(self, state: &AppState) -> AppResult<(Option<i64>, NewFilm)> {
        let mpa = state.catalog.get_mpa(self.mpa.id)?;
        let film = NewFilm::new(
            self.name,
            self.description,
            self.release_date,
            self.duration,
            mpa,
            self.genres.into_iter().map(|genre| genre.id),
            self.directors.into_iter().map(|director| director.id),
        )?;
        Ok((self.id, film))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularQuery {
    pub count: Option<i64>,
    pub genre_id: Option<i32>,
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonQuery {
    pub user_id: i64,
    pub friend_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorFilmsQuery {
    pub sort_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub by: String,
}

// Handlers

pub async fn list_films(State(state): State<AppState>) -> AppResult<Json<Vec<Film>>> {
    Ok(Json(state.catalog.list_films().await?))
}

pub async fn create_film(
    State(state): State<AppState>,
    Json(request): Json<FilmRequest>,
) -> AppResult<(StatusCode, Json<Film>)> {
    let (_, film) = request.into_new_film(&state)?;
    let film = state.catalog.create_film(film).await?;
    Ok((StatusCode::CREATED, Json(film)))
}

pub async fn update_film(
    State(state): State<AppState>,
    Json(request): Json<FilmRequest>,
) -> AppResult<Json<Film>> {
    let (id, film) = request.into_new_film(&state)?;
    let id = required_id(id, "Film")?;
    Ok(Json(state.catalog.update_film(id, film).await?))
}

pub async fn get_film(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Film>> {
    Ok(Json(state.catalog.get_film(id).await?))
}

pub async fn delete_film(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.catalog.delete_film(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_like(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state.likes.add_like(id, user_id).await?;
    Ok(StatusCode::OK)
}

pub async fn remove_like(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state.likes.remove_like(id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn popular(
    State(state): State<AppState>,
    Query(params): Query<PopularQuery>,
) -> AppResult<Json<Vec<Film>>> {
    let films = state
        .ranking
        .popular_films(
            params.count.unwrap_or(DEFAULT_POPULAR_COUNT),
            params.genre_id,
            params.year,
        )
        .await?;
    Ok(Json(films))
}

pub async fn common(
    State(state): State<AppState>,
    Query(params): Query<CommonQuery>,
) -> AppResult<Json<Vec<Film>>> {
    let films = state
        .graph
        .common_films(params.user_id, params.friend_id)
        .await?;
    Ok(Json(films))
}

pub async fn by_director(
    State(state): State<AppState>,
    Path(director_id): Path<i64>,
    Query(params): Query<DirectorFilmsQuery>,
) -> AppResult<Json<Vec<Film>>> {
    let sort = params
        .sort_by
        .as_deref()
        .map(str::parse::<DirectorSort>)
        .transpose()?
        .unwrap_or_default();

    Ok(Json(state.ranking.films_by_director(director_id, sort).await?))
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<Film>>> {
    let scope: SearchScope = params.by.parse()?;
    Ok(Json(state.ranking.search_films(&params.query, scope).await?))
}
