//! Area Model (reservable dining space)

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Area entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Area {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub min_capacity: i64,
    pub max_capacity: i64,
    /// Cents per hour
    pub price_per_hour: i64,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Area {
    pub fn accepts_guests(&self, guests: i64) -> bool {
        (self.min_capacity..=self.max_capacity).contains(&guests)
    }
}

/// Create area payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_capacity_range"))]
pub struct AreaCreate {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 1, message = "min_capacity must be at least 1"))]
    pub min_capacity: i64,
    #[validate(range(min = 1, message = "max_capacity must be at least 1"))]
    pub max_capacity: i64,
    #[validate(range(min = 0, max = 100_000_000_000i64, message = "price_per_hour is out of range"))]
    pub price_per_hour: i64,
    pub image_url: Option<String>,
}

fn validate_capacity_range(payload: &AreaCreate) -> Result<(), ValidationError> {
    if payload.min_capacity > payload.max_capacity {
        return Err(ValidationError::new("capacity_range")
            .with_message("min_capacity must not exceed max_capacity".into()));
    }
    Ok(())
}

/// Update area payload
///
/// The merged capacity range is checked against the stored row.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AreaUpdate {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub min_capacity: Option<i64>,
    #[validate(range(min = 1))]
    pub max_capacity: Option<i64>,
    #[validate(range(min = 0, max = 100_000_000_000i64))]
    pub price_per_hour: Option<i64>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

/// Availability lookup window (Unix millis)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub start: i64,
    pub end: i64,
}

/// A booked interval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TimeRange {
    pub start_time: i64,
    pub end_time: i64,
}

/// Availability answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Availability {
    pub area_id: i64,
    pub available: bool,
    pub conflicts: Vec<TimeRange>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(min: i64, max: i64) -> AreaCreate {
        AreaCreate {
            name: "Terrace".to_string(),
            description: None,
            min_capacity: min,
            max_capacity: max,
            price_per_hour: 2000,
            image_url: None,
        }
    }

    #[test]
    fn capacity_range_is_checked() {
        assert!(create(2, 8).validate().is_ok());
        assert!(create(4, 4).validate().is_ok());
        assert!(create(9, 8).validate().is_err());
        assert!(create(0, 8).validate().is_err());
    }
}
