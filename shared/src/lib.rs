//! Shared types for the fulfillment server
//!
//! Common types used across the workspace: domain models, unified error
//! types, response structures, and small utilities.

pub mod error;
pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiError, ApiErrorCode, ApiResult};
pub use response::ApiResponse;
