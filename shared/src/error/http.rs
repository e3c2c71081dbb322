//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::ProductNotFound
            | Self::CategoryNotFound
            | Self::CartItemNotFound
            | Self::OrderNotFound
            | Self::CouponNotFound
            | Self::AreaNotFound
            | Self::ReservationNotFound
            | Self::ReviewNotFound
            | Self::ReviewTargetNotFound
            | Self::LocationNotFound
            | Self::OfferNotFound
            | Self::ContactNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::EmailAlreadyRegistered
            | Self::CategoryNameExists
            | Self::ProductOutOfStock
            | Self::OrderInvalidTransition
            | Self::OrderNotCancellable
            | Self::CouponCodeExists
            | Self::AreaNameExists
            | Self::ReservationOverlap
            | Self::ReservationNotCancellable
            | Self::ReservationInvalidTransition
            | Self::ReviewAlreadyExists
            | Self::TwoFactorAlreadyEnabled => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::TwoFactorInvalidCode => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::AdminRequired
            | Self::CannotModifySelf
            | Self::AccountDisabled => StatusCode::FORBIDDEN,

            // 413 Payload Too Large
            Self::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // 429 Too Many Requests
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,

            // 502 Bad Gateway (upstream rejected)
            Self::UploadFailed => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable (transient or unconfigured upstream)
            Self::NetworkError | Self::UploadNotConfigured => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown | Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
