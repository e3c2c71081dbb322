//! Reservation booking rules and price

use shared::models::Area;
use shared::{AppError, ErrorCode};
use thiserror::Error;

const MS_PER_HOUR: i64 = 3_600_000;

/// Longest bookable slot
pub const MAX_RESERVATION_MS: i64 = 12 * MS_PER_HOUR;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookingError {
    #[error("end_time must be after start_time")]
    InvalidRange,
    #[error("Reservations cannot start in the past")]
    InPast,
    #[error("Reservations are limited to 12 hours")]
    TooLong,
    #[error("Area is not available for reservations")]
    AreaInactive,
    #[error("This area accepts between {min} and {max} guests")]
    Capacity { min: i64, max: i64 },
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        let code = match err {
            BookingError::InvalidRange | BookingError::TooLong => {
                ErrorCode::ReservationInvalidRange
            }
            BookingError::InPast => ErrorCode::ReservationInPast,
            BookingError::AreaInactive => ErrorCode::AreaNotFound,
            BookingError::Capacity { .. } => ErrorCode::ReservationCapacityExceeded,
        };
        AppError::with_message(code, err.to_string())
    }
}

/// `price_per_hour × minutes / 60`, rounded half-up to the cent
pub fn reservation_price(price_per_hour: i64, start_time: i64, end_time: i64) -> i64 {
    let duration_ms = (end_time - start_time).max(0) as i128;
    let raw = price_per_hour as i128 * duration_ms;
    ((raw + (MS_PER_HOUR as i128) / 2) / MS_PER_HOUR as i128) as i64
}

/// Check range, time and capacity rules; returns the price on success.
/// Overlap with other bookings is checked at insert time.
pub fn check_booking(
    area: &Area,
    start_time: i64,
    end_time: i64,
    guests: i64,
    now: i64,
) -> Result<i64, BookingError> {
    if end_time <= start_time {
        return Err(BookingError::InvalidRange);
    }
    if start_time < now {
        return Err(BookingError::InPast);
    }
    if end_time - start_time > MAX_RESERVATION_MS {
        return Err(BookingError::TooLong);
    }
    if !area.is_active {
        return Err(BookingError::AreaInactive);
    }
    if !area.accepts_guests(guests) {
        return Err(BookingError::Capacity {
            min: area.min_capacity,
            max: area.max_capacity,
        });
    }
    Ok(reservation_price(area.price_per_hour, start_time, end_time))
}
