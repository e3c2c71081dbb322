//! Review Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// What a review is about
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum ReviewTargetType {
    Menu,
    Area,
    Location,
}

/// Review entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub target_type: ReviewTargetType,
    pub target_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: i64,
}

/// Create review payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReviewCreate {
    pub target_type: ReviewTargetType,
    pub target_id: i64,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i64,
    #[validate(length(max = 1000, message = "comment must be at most 1000 characters"))]
    pub comment: Option<String>,
}

/// Listing filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewQuery {
    pub target_type: Option<ReviewTargetType>,
    pub target_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    /// Mean rating rounded to one decimal, 0 when there are no reviews
    pub average: f64,
    pub count: i64,
}

impl ReviewSummary {
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let count = reviews.len() as i64;
        if count == 0 {
            return Self {
                average: 0.0,
                count,
            };
        }
        let sum: i64 = reviews.iter().map(|r| r.rating).sum();
        let average = (sum as f64 / count as f64 * 10.0).round() / 10.0;
        Self { average, count }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewList {
    pub reviews: Vec<Review>,
    pub summary: ReviewSummary,
}
