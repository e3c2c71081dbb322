//! Product (menu item) Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Menu item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Price in cents
    pub price: i64,
    pub stock: i64,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub ingredients: Vec<String>,
    /// Category name
    pub category: String,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Product {
    /// True when any ingredient mentions any of the given allergens
    /// (case-insensitive substring match).
    pub fn contains_any_allergen(&self, allergies: &[String]) -> bool {
        let allergies: Vec<String> = allergies
            .iter()
            .map(|a| a.trim().to_lowercase())
            .filter(|a| !a.is_empty())
            .collect();
        self.ingredients.iter().any(|ingredient| {
            let ingredient = ingredient.to_lowercase();
            allergies.iter().any(|a| ingredient.contains(a.as_str()))
        })
    }
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 100_000_000_000i64, message = "price is out of range"))]
    pub price: i64,
    #[validate(range(min = 0, max = 1_000_000, message = "stock is out of range"))]
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
    pub image_url: Option<String>,
}

/// Update product payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductUpdate {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 100_000_000_000i64, message = "price is out of range"))]
    pub price: Option<i64>,
    #[validate(range(min = 0, max = 1_000_000, message = "stock is out of range"))]
    pub stock: Option<i64>,
    pub ingredients: Option<Vec<String>>,
    #[validate(length(min = 1))]
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

/// Relative stock change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjust {
    pub delta: i64,
}

/// Menu listing filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(ingredients: &[&str]) -> Product {
        Product {
            id: 1,
            name: "Pesto".to_string(),
            description: None,
            price: 1200,
            stock: 5,
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            category: "Pasta".to_string(),
            image_url: None,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn allergen_match_is_case_insensitive_substring() {
        let p = product(&["Basil", "Pine Nuts", "Parmesan"]);
        assert!(p.contains_any_allergen(&["nuts".to_string()]));
        assert!(p.contains_any_allergen(&["PARMESAN".to_string()]));
        assert!(!p.contains_any_allergen(&["shellfish".to_string()]));
    }

    #[test]
    fn blank_allergies_never_match() {
        let p = product(&["Basil"]);
        assert!(!p.contains_any_allergen(&[]));
        assert!(!p.contains_any_allergen(&["  ".to_string()]));
    }
}
