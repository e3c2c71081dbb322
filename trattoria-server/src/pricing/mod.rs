//! Pricing rules
//!
//! Pure functions over models. Handlers feed them rows and the current time.

pub mod coupon;
pub mod reservation;

pub use coupon::{CouponRejection, discount_for, quote};
pub use reservation::{BookingError, MAX_RESERVATION_MS, check_booking, reservation_price};
