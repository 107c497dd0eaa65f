use axum::http::StatusCode;

pub mod directors;
pub mod events;
pub mod films;
pub mod lookups;
pub mod reviews;
pub mod users;

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Fails with 400 when an update body lacks the id it targets
pub(crate) fn required_id<T>(id: Option<T>, entity: &str) -> crate::error::AppResult<T> {
    id.ok_or_else(|| crate::error::AppError::InvalidInput(format!("{} id must be provided", entity)))
}
