//! Category Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Menu category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryCreate {
    #[validate(length(min = 1, max = 50, message = "name must be 1-50 characters"))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Update category payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryUpdate {
    #[validate(length(min = 1, max = 50, message = "name must be 1-50 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub is_active: Option<bool>,
}
