use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// A user's review of a film
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "reviewId")]
    pub id: i64,
    pub content: String,
    pub is_positive: bool,
    pub user_id: i64,
    pub film_id: i64,
    pub created_at: DateTime<Utc>,
    /// Net vote score, maintained incrementally
    pub useful: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub content: String,
    pub is_positive: bool,
    pub user_id: i64,
    pub film_id: i64,
    pub created_at: DateTime<Utc>,
}

impl NewReview {
    pub fn new(content: String, is_positive: bool, user_id: i64, film_id: i64) -> AppResult<Self> {
        Self::validate_content(&content)?;
        Ok(Self {
            content,
            is_positive,
            user_id,
            film_id,
            created_at: Utc::now(),
        })
    }

    pub fn validate_content(content: &str) -> AppResult<()> {
        if content.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Review content cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn into_review(self, id: i64) -> Review {
        Review {
            id,
            content: self.content,
            is_positive: self.is_positive,
            user_id: self.user_id,
            film_id: self.film_id,
            created_at: self.created_at,
            useful: 0,
        }
    }
}

/// One user's like or dislike of a review
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewVote {
    pub review_id: i64,
    pub user_id: i64,
    pub is_like: bool,
}

/// Contribution of a single vote to a review's usefulness
pub fn vote_weight(is_like: bool) -> i64 {
    if is_like {
        1
    } else {
        -1
    }
}
