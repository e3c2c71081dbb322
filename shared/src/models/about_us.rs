//! About Us singleton

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AboutUs {
    pub title: String,
    pub content: String,
    pub mission: Option<String>,
    pub vision: Option<String>,
    pub image_url: Option<String>,
    pub updated_at: i64,
}

/// Full replacement of the About Us page
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AboutUsUpdate {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 20000, message = "content is required"))]
    pub content: String,
    #[validate(length(max = 2000))]
    pub mission: Option<String>,
    #[validate(length(max = 2000))]
    pub vision: Option<String>,
    pub image_url: Option<String>,
}
