//! Fulfillment error types

use shared::models::OrderStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FulfillmentError {
    #[error("Order {0} not found")]
    OrderNotFound(i64),

    #[error("Customer {0} not found")]
    CustomerNotFound(i64),

    #[error("Illegal transition: {from} -> {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    #[error("Validation error: {0}")]
    Validation(String),

    /// Persistence failure inside a transactional step; the whole step
    /// was rolled back.
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),
}

impl From<sqlx::Error> for FulfillmentError {
    fn from(err: sqlx::Error) -> Self {
        FulfillmentError::DataIntegrity(err.to_string())
    }
}

impl From<crate::db::repository::RepoError> for FulfillmentError {
    fn from(err: crate::db::repository::RepoError) -> Self {
        FulfillmentError::DataIntegrity(err.to_string())
    }
}

impl From<FulfillmentError> for shared::error::ApiError {
    fn from(err: FulfillmentError) -> Self {
        use shared::error::ApiError;
        match &err {
            FulfillmentError::OrderNotFound(id) => ApiError::not_found(format!("Order {}", id)),
            FulfillmentError::CustomerNotFound(id) => {
                ApiError::not_found(format!("Customer {}", id))
            }
            FulfillmentError::IllegalTransition { .. } => ApiError::validation(err.to_string()),
            FulfillmentError::Validation(msg) => ApiError::validation(msg.clone()),
            FulfillmentError::DataIntegrity(msg) => ApiError::database(msg.clone()),
        }
    }
}

/// Result type for fulfillment operations
pub type FulfillmentResult<T> = Result<T, FulfillmentError>;
