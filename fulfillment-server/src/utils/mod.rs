//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型 (from shared::error)
//! - [`ApiResponse`] - API 响应结构 (from shared::response)
//! - 日志等工具

pub mod logger;

// Re-export unified error/response types from shared
pub use shared::error::{ApiError as AppError, ApiResult as AppResult};
pub use shared::response::ApiResponse;
