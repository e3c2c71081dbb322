//! Data models
//!
//! Shared between trattoria-server and API consumers.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` allocated from the `counters` table. Money is in cents,
//! timestamps are Unix milliseconds.

/// Largest money amount accepted anywhere, in cents
pub const MAX_AMOUNT: i64 = 100_000_000_000;
/// Largest stock level or line quantity
pub const MAX_QUANTITY: i64 = 1_000_000;

pub mod about_us;
pub mod area;
pub mod cart;
pub mod category;
pub mod contact;
pub mod coupon;
pub mod location;
pub mod offer;
pub mod order;
pub mod product;
pub mod reservation;
pub mod review;
pub mod two_factor;
pub mod user;

// Re-exports
pub use about_us::*;
pub use area::*;
pub use cart::*;
pub use category::*;
pub use contact::*;
pub use coupon::*;
pub use location::*;
pub use offer::*;
pub use order::*;
pub use product::*;
pub use reservation::*;
pub use review::*;
pub use two_factor::*;
pub use user::*;
