//! Reservation Model

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum ReservationStatus {
    Pending,
    Paid,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    /// Whether a reservation in this status occupies its time slot
    pub fn blocks_slot(self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Paid)
    }

    pub fn can_transition_to(self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, next),
            (Pending, Paid) | (Pending, Cancelled) | (Paid, Completed) | (Paid, Cancelled)
        )
    }

    pub fn is_cancellable(self) -> bool {
        self.can_transition_to(ReservationStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Paid => "paid",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Completed => "completed",
        }
    }
}

/// Reservation entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Reservation {
    pub id: i64,
    pub user_id: i64,
    pub area_id: i64,
    /// Unix millis
    pub start_time: i64,
    /// Unix millis, exclusive
    pub end_time: i64,
    pub guests: i64,
    /// Cents
    pub price: i64,
    pub status: ReservationStatus,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Reservation {
    /// Half-open interval overlap: touching ranges do not conflict
    pub fn overlaps(&self, start: i64, end: i64) -> bool {
        self.start_time < end && self.end_time > start
    }
}

/// Create reservation payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReservationCreate {
    pub area_id: i64,
    pub start_time: i64,
    pub end_time: i64,
    #[validate(range(min = 1, message = "guests must be at least 1"))]
    pub guests: i64,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Admin status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationStatusUpdate {
    pub status: ReservationStatus,
}

/// Admin listing filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReservationQuery {
    pub area_id: Option<i64>,
    pub status: Option<ReservationStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reservation(start: i64, end: i64) -> Reservation {
        Reservation {
            id: 1,
            user_id: 1,
            area_id: 1,
            start_time: start,
            end_time: end,
            guests: 2,
            price: 0,
            status: ReservationStatus::Pending,
            notes: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn overlap_is_half_open() {
        let r = reservation(100, 200);
        assert!(r.overlaps(150, 250));
        assert!(r.overlaps(50, 150));
        assert!(r.overlaps(120, 180));
        assert!(r.overlaps(0, 300));
        assert!(!r.overlaps(200, 300));
        assert!(!r.overlaps(0, 100));
    }

    #[test]
    fn only_live_statuses_block() {
        assert!(ReservationStatus::Pending.blocks_slot());
        assert!(ReservationStatus::Paid.blocks_slot());
        assert!(!ReservationStatus::Cancelled.blocks_slot());
        assert!(!ReservationStatus::Completed.blocks_slot());
    }

    #[test]
    fn transitions() {
        assert!(ReservationStatus::Pending.can_transition_to(ReservationStatus::Paid));
        assert!(ReservationStatus::Paid.can_transition_to(ReservationStatus::Completed));
        assert!(!ReservationStatus::Completed.is_cancellable());
        assert!(!ReservationStatus::Cancelled.can_transition_to(ReservationStatus::Paid));
        assert!(!ReservationStatus::Pending.can_transition_to(ReservationStatus::Completed));
    }
}
