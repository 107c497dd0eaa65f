use axum::{extract::State, Json};

use crate::{api::AppState, error::AppResult, models::Event};

/// Full, unfiltered activity log
pub async fn all_events(State(state): State<AppState>) -> AppResult<Json<Vec<Event>>> {
    Ok(Json(state.feed.feed_for(None).await?))
}
