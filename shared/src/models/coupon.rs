//! Coupon Model

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum DiscountType {
    /// `discount_value` is a percentage (1..=100)
    Percentage,
    /// `discount_value` is an amount in cents
    Fixed,
}

/// Coupon entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Coupon {
    pub id: i64,
    /// Upper-cased, unique
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    /// Minimum subtotal in cents
    pub min_order_amount: i64,
    /// Cap for percentage discounts, cents
    pub max_discount: Option<i64>,
    pub valid_from: i64,
    pub valid_until: i64,
    /// Global limit, `None` = unlimited
    pub usage_limit: Option<i64>,
    pub per_user_limit: i64,
    pub used_count: i64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create coupon payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_coupon_create"))]
pub struct CouponCreate {
    #[validate(length(min = 3, max = 30, message = "code must be 3-30 characters"))]
    pub code: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub discount_type: DiscountType,
    #[validate(range(min = 1, max = 100_000_000_000i64, message = "discount_value is out of range"))]
    pub discount_value: i64,
    #[validate(range(min = 0, max = 100_000_000_000i64))]
    #[serde(default)]
    pub min_order_amount: i64,
    #[validate(range(min = 1, max = 100_000_000_000i64))]
    pub max_discount: Option<i64>,
    pub valid_from: i64,
    pub valid_until: i64,
    #[validate(range(min = 1))]
    pub usage_limit: Option<i64>,
    #[validate(range(min = 1, message = "per_user_limit must be at least 1"))]
    #[serde(default = "default_per_user_limit")]
    pub per_user_limit: i64,
}

fn default_per_user_limit() -> i64 {
    1
}

fn validate_coupon_create(payload: &CouponCreate) -> Result<(), ValidationError> {
    check_coupon_rules(
        payload.discount_type,
        payload.discount_value,
        payload.valid_from,
        payload.valid_until,
    )
}

/// Rules shared by create and merged updates
pub fn check_coupon_rules(
    discount_type: DiscountType,
    discount_value: i64,
    valid_from: i64,
    valid_until: i64,
) -> Result<(), ValidationError> {
    if valid_until <= valid_from {
        return Err(ValidationError::new("validity_window")
            .with_message("valid_until must be after valid_from".into()));
    }
    if discount_type == DiscountType::Percentage && !(1..=100).contains(&discount_value) {
        return Err(ValidationError::new("percentage_range")
            .with_message("percentage discount must be between 1 and 100".into()));
    }
    Ok(())
}

/// Update coupon payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CouponUpdate {
    #[validate(length(min = 3, max = 30, message = "code must be 3-30 characters"))]
    pub code: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    #[validate(range(min = 1, max = 100_000_000_000i64))]
    pub discount_value: Option<i64>,
    #[validate(range(min = 0, max = 100_000_000_000i64))]
    pub min_order_amount: Option<i64>,
    #[validate(range(min = 1, max = 100_000_000_000i64))]
    pub max_discount: Option<i64>,
    pub valid_from: Option<i64>,
    pub valid_until: Option<i64>,
    #[validate(range(min = 1))]
    pub usage_limit: Option<i64>,
    #[validate(range(min = 1))]
    pub per_user_limit: Option<i64>,
    pub is_active: Option<bool>,
}

/// One redemption of a coupon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CouponUsage {
    pub id: i64,
    pub coupon_id: i64,
    pub user_id: i64,
    pub order_id: i64,
    pub discount: i64,
    pub used_at: i64,
}

/// Coupon check before checkout
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CouponValidateRequest {
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
    #[validate(range(min = 0, max = 100_000_000_000i64, message = "subtotal is out of range"))]
    pub subtotal: i64,
}

/// Outcome of a successful coupon check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponQuote {
    pub code: String,
    pub subtotal: i64,
    pub discount: i64,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_must_be_forward() {
        assert!(check_coupon_rules(DiscountType::Fixed, 500, 10, 20).is_ok());
        assert!(check_coupon_rules(DiscountType::Fixed, 500, 20, 20).is_err());
    }

    #[test]
    fn percentage_is_bounded() {
        assert!(check_coupon_rules(DiscountType::Percentage, 100, 0, 1).is_ok());
        assert!(check_coupon_rules(DiscountType::Percentage, 101, 0, 1).is_err());
        assert!(check_coupon_rules(DiscountType::Fixed, 10_000, 0, 1).is_ok());
    }

    #[test]
    fn validate_request_bounds_subtotal() {
        let request = |subtotal| CouponValidateRequest {
            code: "SAVE10".into(),
            subtotal,
        };
        assert!(request(crate::models::MAX_AMOUNT).validate().is_ok());
        assert!(request(crate::models::MAX_AMOUNT + 1).validate().is_err());
        assert!(request(-1).validate().is_err());
    }
}
