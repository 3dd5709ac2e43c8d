//! Data models
//!
//! Shared between fulfillment-server and dashboard clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod customer;
pub mod estimation;
pub mod invoice;
pub mod order;
pub mod product;
pub mod stage;

// Re-exports
pub use customer::*;
pub use estimation::*;
pub use invoice::*;
pub use order::*;
pub use product::*;
pub use stage::*;
