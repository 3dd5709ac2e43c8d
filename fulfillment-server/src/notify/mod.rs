//! Notification Module
//!
//! Fire-and-forget outbound chat notifications correlated to order
//! transitions. Callers never await delivery; failures are logged only.

pub mod dispatcher;

pub use dispatcher::{NotificationDispatcher, NotificationKind};
