use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{api::AppState, error::AppResult, models::Director};

use super::required_id;

#[derive(Debug, Deserialize)]
pub struct DirectorRequest {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
}

pub async fn list_directors(State(state): State<AppState>) -> AppResult<Json<Vec<Director>>> {
    Ok(Json(state.catalog.list_directors().await?))
}

pub async fn create_director(
    State(state): State<AppState>,
    Json(request): Json<DirectorRequest>,
) -> AppResult<(StatusCode, Json<Director>)> {
    let director = state.catalog.create_director(request.name).await?;
    Ok((StatusCode::CREATED, Json(director)))
}

pub async fn update_director(
    State(state): State<AppState>,
    Json(request): Json<DirectorRequest>,
) -> AppResult<Json<Director>> {
    let id = required_id(request.id, "Director")?;
    let director = state
        .catalog
        .update_director(Director {
            id,
            name: request.name,
        })
        .await?;
    Ok(Json(director))
}

pub async fn get_director(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Director>> {
    Ok(Json(state.catalog.get_director(id).await?))
}

pub async fn delete_director(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.catalog.delete_director(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
