//! Unified error codes for Trattoria
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Menu errors
//! - 4xxx: Cart and order errors
//! - 5xxx: Coupon errors
//! - 6xxx: Area and reservation errors
//! - 7xxx: Content errors
//! - 8xxx: Upload errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 on the wire so the frontend can switch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format (malformed id, unknown enum literal)
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Too many requests from this client
    TooManyRequests = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Password too short
    PasswordTooShort = 1008,
    /// Email already registered
    EmailAlreadyRegistered = 1009,
    /// Second factor required to complete login
    TwoFactorRequired = 1101,
    /// One-time code or backup code rejected
    TwoFactorInvalidCode = 1102,
    /// Two-factor auth is not enabled for the account
    TwoFactorNotEnabled = 1103,
    /// Two-factor auth is already enabled
    TwoFactorAlreadyEnabled = 1104,
    /// No pending 2FA secret, setup must run first
    TwoFactorSetupMissing = 1105,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,
    /// Admins cannot demote or deactivate themselves
    CannotModifySelf = 2004,

    // ==================== 3xxx: Menu ====================
    /// Product not found
    ProductNotFound = 3001,
    /// Not enough stock
    ProductOutOfStock = 3002,
    /// Product is not available for sale
    ProductInactive = 3003,
    /// Category not found
    CategoryNotFound = 3101,
    /// Category name already exists
    CategoryNameExists = 3102,

    // ==================== 4xxx: Cart / Order ====================
    /// Cart is empty
    CartEmpty = 4001,
    /// Cart line not found
    CartItemNotFound = 4002,
    /// Quantity must be at least one
    InvalidQuantity = 4003,
    /// Order not found
    OrderNotFound = 4101,
    /// Order status transition not allowed
    OrderInvalidTransition = 4102,
    /// Order can no longer be cancelled
    OrderNotCancellable = 4103,
    /// Delivery orders need an address
    DeliveryAddressRequired = 4104,

    // ==================== 5xxx: Coupon ====================
    /// Coupon not found or inactive
    CouponNotFound = 5001,
    /// Coupon validity window has ended
    CouponExpired = 5002,
    /// Coupon validity window has not started
    CouponNotYetValid = 5003,
    /// Coupon global usage limit reached
    CouponUsageLimitReached = 5004,
    /// Coupon per-user limit reached
    CouponUserLimitReached = 5005,
    /// Order subtotal below coupon minimum
    CouponMinimumNotMet = 5006,
    /// Coupon code already exists
    CouponCodeExists = 5007,

    // ==================== 6xxx: Area / Reservation ====================
    /// Area not found
    AreaNotFound = 6001,
    /// Area name already exists
    AreaNameExists = 6002,
    /// Reservation not found
    ReservationNotFound = 6101,
    /// Requested slot overlaps an existing reservation
    ReservationOverlap = 6102,
    /// End must be after start and within the maximum duration
    ReservationInvalidRange = 6103,
    /// Guest count outside area capacity
    ReservationCapacityExceeded = 6104,
    /// Start time in the past
    ReservationInPast = 6105,
    /// Reservation can no longer be cancelled
    ReservationNotCancellable = 6106,
    /// Reservation status transition not allowed
    ReservationInvalidTransition = 6107,

    // ==================== 7xxx: Content ====================
    /// Review not found
    ReviewNotFound = 7001,
    /// User already reviewed this target
    ReviewAlreadyExists = 7002,
    /// Reviewed target does not exist
    ReviewTargetNotFound = 7003,
    /// Location not found
    LocationNotFound = 7101,
    /// Offer not found
    OfferNotFound = 7201,
    /// Offer price must be below the bundle's original price
    OfferInvalidPrice = 7202,
    /// Contact message not found
    ContactNotFound = 7301,

    // ==================== 8xxx: Upload ====================
    /// File too large
    FileTooLarge = 8001,
    /// Unsupported file format
    UnsupportedFileFormat = 8002,
    /// No file provided in request
    NoFileProvided = 8003,
    /// Empty file provided
    EmptyFile = 8004,
    /// Image host rejected the upload
    UploadFailed = 8005,
    /// Image host credentials are not configured
    UploadNotConfigured = 8006,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error talking to an upstream service
    NetworkError = 9003,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::TooManyRequests => "Too many requests, try again later",

            // Auth
            ErrorCode::NotAuthenticated => "Please log in first",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Session has expired",
            ErrorCode::TokenInvalid => "Session token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters",
            ErrorCode::EmailAlreadyRegistered => "Email is already registered",
            ErrorCode::TwoFactorRequired => "Two-factor verification required",
            ErrorCode::TwoFactorInvalidCode => "Invalid verification code",
            ErrorCode::TwoFactorNotEnabled => "Two-factor authentication is not enabled",
            ErrorCode::TwoFactorAlreadyEnabled => "Two-factor authentication is already enabled",
            ErrorCode::TwoFactorSetupMissing => "Start two-factor setup first",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::CannotModifySelf => "Administrators cannot change their own account this way",

            // Menu
            ErrorCode::ProductNotFound => "Menu item not found",
            ErrorCode::ProductOutOfStock => "Not enough stock available",
            ErrorCode::ProductInactive => "Menu item is not available",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryNameExists => "Category name already exists",

            // Cart / Order
            ErrorCode::CartEmpty => "Cart is empty",
            ErrorCode::CartItemNotFound => "Item is not in the cart",
            ErrorCode::InvalidQuantity => "Quantity must be at least 1",
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderInvalidTransition => "Order status change not allowed",
            ErrorCode::OrderNotCancellable => "Order can no longer be cancelled",
            ErrorCode::DeliveryAddressRequired => "Delivery address is required",

            // Coupon
            ErrorCode::CouponNotFound => "Coupon not found",
            ErrorCode::CouponExpired => "Coupon has expired",
            ErrorCode::CouponNotYetValid => "Coupon is not valid yet",
            ErrorCode::CouponUsageLimitReached => "Coupon usage limit reached",
            ErrorCode::CouponUserLimitReached => "You have already used this coupon",
            ErrorCode::CouponMinimumNotMet => "Order total is below the coupon minimum",
            ErrorCode::CouponCodeExists => "Coupon code already exists",

            // Area / Reservation
            ErrorCode::AreaNotFound => "Area not found",
            ErrorCode::AreaNameExists => "Area name already exists",
            ErrorCode::ReservationNotFound => "Reservation not found",
            ErrorCode::ReservationOverlap => "The area is already reserved for that time",
            ErrorCode::ReservationInvalidRange => "Invalid reservation time range",
            ErrorCode::ReservationCapacityExceeded => "Guest count is outside the area capacity",
            ErrorCode::ReservationInPast => "Reservation cannot start in the past",
            ErrorCode::ReservationNotCancellable => "Reservation can no longer be cancelled",
            ErrorCode::ReservationInvalidTransition => "Reservation status change not allowed",

            // Content
            ErrorCode::ReviewNotFound => "Review not found",
            ErrorCode::ReviewAlreadyExists => "You have already reviewed this",
            ErrorCode::ReviewTargetNotFound => "Reviewed item not found",
            ErrorCode::LocationNotFound => "Location not found",
            ErrorCode::OfferNotFound => "Offer not found",
            ErrorCode::OfferInvalidPrice => "Offer price must be below the original price",
            ErrorCode::ContactNotFound => "Contact message not found",

            // Upload
            ErrorCode::FileTooLarge => "File is too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "File is empty",
            ErrorCode::UploadFailed => "Image upload failed",
            ErrorCode::UploadNotConfigured => "Image upload is not configured",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Upstream service unavailable",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),
            9 => Ok(ErrorCode::TooManyRequests),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),
            1008 => Ok(ErrorCode::PasswordTooShort),
            1009 => Ok(ErrorCode::EmailAlreadyRegistered),
            1101 => Ok(ErrorCode::TwoFactorRequired),
            1102 => Ok(ErrorCode::TwoFactorInvalidCode),
            1103 => Ok(ErrorCode::TwoFactorNotEnabled),
            1104 => Ok(ErrorCode::TwoFactorAlreadyEnabled),
            1105 => Ok(ErrorCode::TwoFactorSetupMissing),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),
            2004 => Ok(ErrorCode::CannotModifySelf),

            // Menu
            3001 => Ok(ErrorCode::ProductNotFound),
            3002 => Ok(ErrorCode::ProductOutOfStock),
            3003 => Ok(ErrorCode::ProductInactive),
            3101 => Ok(ErrorCode::CategoryNotFound),
            3102 => Ok(ErrorCode::CategoryNameExists),

            // Cart / Order
            4001 => Ok(ErrorCode::CartEmpty),
            4002 => Ok(ErrorCode::CartItemNotFound),
            4003 => Ok(ErrorCode::InvalidQuantity),
            4101 => Ok(ErrorCode::OrderNotFound),
            4102 => Ok(ErrorCode::OrderInvalidTransition),
            4103 => Ok(ErrorCode::OrderNotCancellable),
            4104 => Ok(ErrorCode::DeliveryAddressRequired),

            // Coupon
            5001 => Ok(ErrorCode::CouponNotFound),
            5002 => Ok(ErrorCode::CouponExpired),
            5003 => Ok(ErrorCode::CouponNotYetValid),
            5004 => Ok(ErrorCode::CouponUsageLimitReached),
            5005 => Ok(ErrorCode::CouponUserLimitReached),
            5006 => Ok(ErrorCode::CouponMinimumNotMet),
            5007 => Ok(ErrorCode::CouponCodeExists),

            // Area / Reservation
            6001 => Ok(ErrorCode::AreaNotFound),
            6002 => Ok(ErrorCode::AreaNameExists),
            6101 => Ok(ErrorCode::ReservationNotFound),
            6102 => Ok(ErrorCode::ReservationOverlap),
            6103 => Ok(ErrorCode::ReservationInvalidRange),
            6104 => Ok(ErrorCode::ReservationCapacityExceeded),
            6105 => Ok(ErrorCode::ReservationInPast),
            6106 => Ok(ErrorCode::ReservationNotCancellable),
            6107 => Ok(ErrorCode::ReservationInvalidTransition),

            // Content
            7001 => Ok(ErrorCode::ReviewNotFound),
            7002 => Ok(ErrorCode::ReviewAlreadyExists),
            7003 => Ok(ErrorCode::ReviewTargetNotFound),
            7101 => Ok(ErrorCode::LocationNotFound),
            7201 => Ok(ErrorCode::OfferNotFound),
            7202 => Ok(ErrorCode::OfferInvalidPrice),
            7301 => Ok(ErrorCode::ContactNotFound),

            // Upload
            8001 => Ok(ErrorCode::FileTooLarge),
            8002 => Ok(ErrorCode::UnsupportedFileFormat),
            8003 => Ok(ErrorCode::NoFileProvided),
            8004 => Ok(ErrorCode::EmptyFile),
            8005 => Ok(ErrorCode::UploadFailed),
            8006 => Ok(ErrorCode::UploadNotConfigured),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
