use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    api::AppState,
    error::AppResult,
    models::{Event, Film, NewUser, User},
};

use super::required_id;

// Request types

#[derive(Debug, Deserialize)]
pub struct UserRequest {
    #[serde(default)]
    pub id: Option<i64>,
    pub email: String,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
}

impl UserRequest {
    fn into_new_user(self) -> AppResult<(Option<i64>, NewUser)> {
        let user = NewUser::new(self.email, self.login, self.name, self.birthday)?;
        Ok((self.id, user))
    }
}

// Handlers

pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.catalog.list_users().await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<UserRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let (_, user) = request.into_new_user()?;
    let user = state.catalog.create_user(user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Json(request): Json<UserRequest>,
) -> AppResult<Json<User>> {
    let (id, user) = request.into_new_user()?;
    let id = required_id(id, "User")?;
    Ok(Json(state.catalog.update_user(id, user).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<User>> {
    Ok(Json(state.catalog.get_user(id).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.catalog.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_friend(
    State(state): State<AppState>,
    Path((id, friend_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state.graph.add_friend(id, friend_id).await?;
    Ok(StatusCode::OK)
}

pub async fn remove_friend(
    State(state): State<AppState>,
    Path((id, friend_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state.graph.remove_friend(id, friend_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn friends(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.graph.friends_of(id).await?))
}

pub async fn mutual_friends(
    State(state): State<AppState>,
    Path((id, other_id)): Path<(i64, i64)>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.graph.mutual_friends(id, other_id).await?))
}

pub async fn recommendations(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Film>>> {
    Ok(Json(state.recommendations.recommend(id).await?))
}

pub async fn feed(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Event>>> {
    Ok(Json(state.feed.feed_for(Some(id)).await?))
}
