//! Fulfillment Module
//!
//! Order lifecycle along the fixed production pipeline:
//!
//! - **machine**: status transitions with per-stage tracking records
//! - **estimation**: pure completion-time projection
//! - **intake**: order creation (standard + quick paths)
//! - **money**: decimal money arithmetic and boundary validation
//!
//! # Flow
//!
//! ```text
//! intake ─► orders row (pending | paid)
//! applyTransition ─► one transactional step:
//!     status change + stage records opened/closed
//!     └─► updated order + fresh estimation for display
//! ```

pub mod error;
pub mod estimation;
pub mod intake;
pub mod machine;
pub mod money;

pub use error::{FulfillmentError, FulfillmentResult};
pub use intake::OrderIntake;
pub use machine::{FulfillmentMachine, TransitionOptions, TransitionOutcome};

#[cfg(test)]
mod tests;
