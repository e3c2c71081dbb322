//! Coupon eligibility and discount

use shared::models::{Coupon, CouponQuote, DiscountType};
use shared::{AppError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CouponRejection {
    #[error("Coupon not found")]
    Inactive,
    #[error("Coupon is not valid yet")]
    NotYetValid,
    #[error("Coupon has expired")]
    Expired,
    #[error("Coupon usage limit reached")]
    UsageLimitReached,
    #[error("You have already used this coupon")]
    UserLimitReached,
    #[error("Order subtotal must be at least {minimum}")]
    MinimumNotMet { minimum: i64 },
}

impl From<CouponRejection> for AppError {
    fn from(err: CouponRejection) -> Self {
        let code = match err {
            CouponRejection::Inactive => ErrorCode::CouponNotFound,
            CouponRejection::NotYetValid => ErrorCode::CouponNotYetValid,
            CouponRejection::Expired => ErrorCode::CouponExpired,
            CouponRejection::UsageLimitReached => ErrorCode::CouponUsageLimitReached,
            CouponRejection::UserLimitReached => ErrorCode::CouponUserLimitReached,
            CouponRejection::MinimumNotMet { .. } => ErrorCode::CouponMinimumNotMet,
        };
        AppError::with_message(code, err.to_string())
    }
}

/// Discount in cents. Percentages round half-up and honour `max_discount`;
/// the result never exceeds the subtotal.
pub fn discount_for(coupon: &Coupon, subtotal: i64) -> i64 {
    let subtotal = subtotal.max(0);
    let discount = match coupon.discount_type {
        DiscountType::Percentage => {
            let raw = (i128::from(subtotal) * i128::from(coupon.discount_value) + 50) / 100;
            let raw = i64::try_from(raw).unwrap_or(i64::MAX);
            match coupon.max_discount {
                Some(cap) => raw.min(cap),
                None => raw,
            }
        }
        DiscountType::Fixed => coupon.discount_value,
    };
    discount.clamp(0, subtotal)
}

/// Check every rule, then price the coupon against `subtotal`
pub fn quote(
    coupon: &Coupon,
    subtotal: i64,
    user_usages: i64,
    now: i64,
) -> Result<CouponQuote, CouponRejection> {
    if !coupon.is_active {
        return Err(CouponRejection::Inactive);
    }
    if now < coupon.valid_from {
        return Err(CouponRejection::NotYetValid);
    }
    if now > coupon.valid_until {
        return Err(CouponRejection::Expired);
    }
    if let Some(limit) = coupon.usage_limit
        && coupon.used_count >= limit
    {
        return Err(CouponRejection::UsageLimitReached);
    }
    if user_usages >= coupon.per_user_limit {
        return Err(CouponRejection::UserLimitReached);
    }
    if subtotal < coupon.min_order_amount {
        return Err(CouponRejection::MinimumNotMet {
            minimum: coupon.min_order_amount,
        });
    }

    let discount = discount_for(coupon, subtotal);
    Ok(CouponQuote {
        code: coupon.code.clone(),
        subtotal,
        discount,
        total: subtotal - discount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coupon(discount_type: DiscountType, value: i64) -> Coupon {
        Coupon {
            id: 1,
            code: "SAVE".into(),
            description: None,
            discount_type,
            discount_value: value,
            min_order_amount: 0,
            max_discount: None,
            valid_from: 100,
            valid_until: 200,
            usage_limit: None,
            per_user_limit: 1,
            used_count: 0,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn percentage_is_capped() {
        let mut c = coupon(DiscountType::Percentage, 20);
        assert_eq!(discount_for(&c, 10_000), 2000);
        c.max_discount = Some(1500);
        assert_eq!(discount_for(&c, 10_000), 1500);
    }

    #[test]
    fn percentage_rounds_half_up() {
        let c = coupon(DiscountType::Percentage, 15);
        // 15% of 1010 = 151.5
        assert_eq!(discount_for(&c, 1010), 152);
        // 15% of 1003 = 150.45
        assert_eq!(discount_for(&c, 1003), 150);
    }

    #[test]
    fn fixed_never_exceeds_subtotal() {
        let c = coupon(DiscountType::Fixed, 500);
        assert_eq!(discount_for(&c, 2000), 500);
        assert_eq!(discount_for(&c, 300), 300);
    }

    #[test]
    fn percentage_of_huge_subtotal() {
        let c = coupon(DiscountType::Percentage, 20);
        assert_eq!(discount_for(&c, 1_000_000_000_000_000_000), 200_000_000_000_000_000);
        assert_eq!(discount_for(&c, i64::MAX), i64::MAX / 5);
        let full = coupon(DiscountType::Percentage, 100);
        assert_eq!(discount_for(&full, i64::MAX), i64::MAX);
    }

    #[test]
    fn date_window() {
        let c = coupon(DiscountType::Fixed, 100);
        assert_eq!(quote(&c, 1000, 0, 99), Err(CouponRejection::NotYetValid));
        assert_eq!(quote(&c, 1000, 0, 201), Err(CouponRejection::Expired));
        assert!(quote(&c, 1000, 0, 100).is_ok());
        assert!(quote(&c, 1000, 0, 200).is_ok());
    }

    #[test]
    fn limits_and_minimum() {
        let mut c = coupon(DiscountType::Fixed, 100);
        c.usage_limit = Some(5);
        c.used_count = 5;
        assert_eq!(quote(&c, 1000, 0, 150), Err(CouponRejection::UsageLimitReached));

        c.used_count = 0;
        assert_eq!(quote(&c, 1000, 1, 150), Err(CouponRejection::UserLimitReached));

        c.min_order_amount = 1500;
        assert_eq!(
            quote(&c, 1000, 0, 150),
            Err(CouponRejection::MinimumNotMet { minimum: 1500 })
        );

        c.is_active = false;
        assert_eq!(quote(&c, 2000, 0, 150), Err(CouponRejection::Inactive));
    }

    #[test]
    fn quote_totals() {
        let c = coupon(DiscountType::Percentage, 10);
        let q = quote(&c, 2500, 0, 150).unwrap();
        assert_eq!(q.discount, 250);
        assert_eq!(q.total, 2250);
        assert_eq!(q.code, "SAVE");
    }

    #[test]
    fn rejections_map_to_codes() {
        let err: AppError = CouponRejection::Inactive.into();
        assert_eq!(err.code, ErrorCode::CouponNotFound);
        assert_eq!(err.http_status().as_u16(), 404);
        let err: AppError = CouponRejection::Expired.into();
        assert_eq!(err.http_status().as_u16(), 400);
    }
}
