use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::AppState,
    error::AppResult,
    models::{NewReview, Review},
    services::reviews::DEFAULT_REVIEW_COUNT,
};

// Request/Response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub content: String,
    pub is_positive: bool,
    pub user_id: i64,
    pub film_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    pub review_id: i64,
    pub content: String,
    pub is_positive: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListQuery {
    pub film_id: Option<i64>,
    pub count: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsefulnessResponse {
    pub review_id: i64,
    pub useful: i64,
}

// Handlers

pub async fn list_reviews(
    State(state): State<AppState>,
    Query(params): Query<ReviewListQuery>,
) -> AppResult<Json<Vec<Review>>> {
    let reviews = state
        .reviews
        .list(params.film_id, params.count.unwrap_or(DEFAULT_REVIEW_COUNT))
        .await?;
    Ok(Json(reviews))
}

pub async fn create_review(
    State(state): State<AppState>,
    Json(request): Json<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review = NewReview::new(
        request.content,
        request.is_positive,
        request.user_id,
        request.film_id,
    )?;
    let review = state.reviews.create(review).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn update_review(
    State(state): State<AppState>,
    Json(request): Json<UpdateReviewRequest>,
) -> AppResult<Json<Review>> {
    let review = state
        .reviews
        .update(request.review_id, request.content, request.is_positive)
        .await?;
    Ok(Json(review))
}

pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.reviews.get(id).await?))
}

pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.reviews.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_like(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> AppResult<Json<UsefulnessResponse>> {
    vote(&state, id, user_id, true).await
}

pub async fn add_dislike(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> AppResult<Json<UsefulnessResponse>> {
    vote(&state, id, user_id, false).await
}

pub async fn remove_like(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> AppResult<Json<UsefulnessResponse>> {
    unvote(&state, id, user_id, true).await
}

pub async fn remove_dislike(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> AppResult<Json<UsefulnessResponse>> {
    unvote(&state, id, user_id, false).await
}

pub async fn usefulness(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<UsefulnessResponse>> {
    let useful = state.ranking.usefulness(id).await?;
    Ok(Json(UsefulnessResponse {
        review_id: id,
        useful,
    }))
}

pub async fn recompute_usefulness(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<UsefulnessResponse>> {
    let useful = state.ranking.recompute_usefulness(id).await?;
    Ok(Json(UsefulnessResponse {
        review_id: id,
        useful,
    }))
}

async fn vote(
    state: &AppState,
    review_id: i64,
    user_id: i64,
    is_like: bool,
) -> AppResult<Json<UsefulnessResponse>> {
    let useful = state.ranking.cast_vote(review_id, user_id, is_like).await?;
    Ok(Json(UsefulnessResponse { review_id, useful }))
}

async fn unvote(
    state: &AppState,
    review_id: i64,
    user_id: i64,
    is_like: bool,
) -> AppResult<Json<UsefulnessResponse>> {
    let useful = state.ranking.remove_vote(review_id, user_id, is_like).await?;
    Ok(Json(UsefulnessResponse { review_id, useful }))
}
