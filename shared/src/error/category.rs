//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Menu errors (3xxx)
    Menu,
    /// Cart and order errors (4xxx)
    Order,
    /// Coupon errors (5xxx)
    Coupon,
    /// Area and reservation errors (6xxx)
    Reservation,
    /// Content errors (7xxx)
    Content,
    /// Upload errors (8xxx)
    Upload,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Menu,
            4000..5000 => Self::Order,
            5000..6000 => Self::Coupon,
            6000..7000 => Self::Reservation,
            7000..8000 => Self::Content,
            8000..9000 => Self::Upload,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Menu => "menu",
            Self::Order => "order",
            Self::Coupon => "coupon",
            Self::Reservation => "reservation",
            Self::Content => "content",
            Self::Upload => "upload",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3001), ErrorCategory::Menu);
        assert_eq!(ErrorCategory::from_code(4101), ErrorCategory::Order);
        assert_eq!(ErrorCategory::from_code(5001), ErrorCategory::Coupon);
        assert_eq!(ErrorCategory::from_code(6102), ErrorCategory::Reservation);
        assert_eq!(ErrorCategory::from_code(7001), ErrorCategory::Content);
        assert_eq!(ErrorCategory::from_code(8001), ErrorCategory::Upload);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::TwoFactorRequired.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::CouponExpired.category(), ErrorCategory::Coupon);
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Reservation).unwrap();
        assert_eq!(json, "\"reservation\"");
        let category: ErrorCategory = serde_json::from_str("\"upload\"").unwrap();
        assert_eq!(category, ErrorCategory::Upload);
    }
}
