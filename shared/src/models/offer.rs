//! Offer Model (bundled promotion)

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A product and quantity inside an offer bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferItem {
    pub product_id: i64,
    pub quantity: i64,
}

/// Offer entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Offer {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub items: Vec<OfferItem>,
    /// Sum of product price × quantity at write time, cents
    pub original_price: i64,
    pub offer_price: i64,
    pub valid_from: i64,
    pub valid_until: i64,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Offer {
    pub fn savings(&self) -> i64 {
        self.original_price - self.offer_price
    }

    /// Whole-percent discount, rounded half-up
    pub fn discount_percent(&self) -> i64 {
        if self.original_price <= 0 {
            return 0;
        }
        let original = i128::from(self.original_price);
        let percent = (i128::from(self.savings()) * 100 + original / 2) / original;
        i64::try_from(percent).unwrap_or(0)
    }

    pub fn is_live_at(&self, now: i64) -> bool {
        self.is_active && self.valid_from <= now && now <= self.valid_until
    }
}

/// Offer with derived figures, as served by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferView {
    #[serde(flatten)]
    pub offer: Offer,
    pub savings: i64,
    pub discount_percent: i64,
}

impl From<Offer> for OfferView {
    fn from(offer: Offer) -> Self {
        Self {
            savings: offer.savings(),
            discount_percent: offer.discount_percent(),
            offer,
        }
    }
}

/// Create offer payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_offer_create"))]
pub struct OfferCreate {
    #[validate(length(min = 1, max = 100, message = "title must be 1-100 characters"))]
    pub title: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "an offer needs at least one item"))]
    pub items: Vec<OfferItem>,
    #[validate(range(min = 0, max = 100_000_000_000i64))]
    pub offer_price: i64,
    pub valid_from: i64,
    pub valid_until: i64,
    pub image_url: Option<String>,
}

fn validate_offer_create(payload: &OfferCreate) -> Result<(), ValidationError> {
    check_offer_window(payload.valid_from, payload.valid_until)?;
    check_offer_items(&payload.items)
}

pub fn check_offer_window(valid_from: i64, valid_until: i64) -> Result<(), ValidationError> {
    if valid_until <= valid_from {
        return Err(ValidationError::new("validity_window")
            .with_message("valid_until must be after valid_from".into()));
    }
    Ok(())
}

pub fn check_offer_items(items: &[OfferItem]) -> Result<(), ValidationError> {
    if items.iter().any(|i| !(1..=super::MAX_QUANTITY).contains(&i.quantity)) {
        return Err(ValidationError::new("item_quantity")
            .with_message("item quantity must be between 1 and 1000000".into()));
    }
    Ok(())
}

/// Update offer payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OfferUpdate {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(length(min = 1))]
    pub items: Option<Vec<OfferItem>>,
    #[validate(range(min = 0, max = 100_000_000_000i64))]
    pub offer_price: Option<i64>,
    pub valid_from: Option<i64>,
    pub valid_until: Option<i64>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}
