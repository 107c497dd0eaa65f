use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    api::AppState,
    error::AppResult,
    models::{Genre, MpaRating},
};

pub async fn list_genres(State(state): State<AppState>) -> AppResult<Json<Vec<Genre>>> {
    Ok(Json(state.catalog.list_genres().await?))
}

pub async fn get_genre(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Genre>> {
    Ok(Json(state.catalog.get_genre(id).await?))
}

pub async fn list_mpa(State(state): State<AppState>) -> Json<Vec<MpaRating>> {
    Json(state.catalog.list_mpa())
}

pub async fn get_mpa(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<MpaRating>> {
    Ok(Json(state.catalog.get_mpa(id)?))
}
