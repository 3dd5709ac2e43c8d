//! Stage record models
//!
//! One row per pipeline phase an order has passed through. At most one
//! open record per (order, stage kind), enforced by insert-if-absent in
//! the transition transaction, not by a schema constraint.

use serde::{Deserialize, Serialize};

/// Production/packaging stage status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum StageStatus {
    Pending,
    InProgress,
    Completed,
}

/// Shipment stage status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum ShipmentStatus {
    Pending,
    InTransit,
    Delivered,
}

/// Production stage record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProductionRecord {
    pub id: i64,
    pub order_id: i64,
    pub started_at: i64,
    /// Null while the record is open
    pub completed_at: Option<i64>,
    pub status: StageStatus,
    pub notes: Option<String>,
}

/// Packaging stage record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PackagingRecord {
    pub id: i64,
    pub order_id: i64,
    pub occurred_at: i64,
    /// Null while the record is open
    pub completed_at: Option<i64>,
    pub status: StageStatus,
    pub notes: Option<String>,
}

/// Shipment stage record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ShipmentRecord {
    pub id: i64,
    pub order_id: i64,
    pub occurred_at: i64,
    /// Null until the courier confirms delivery
    pub delivered_at: Option<i64>,
    pub status: ShipmentStatus,
    pub courier: String,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
}
