//! Product Model
//!
//! Read collaborator: pricing and per-unit time baselines for estimation.

use serde::{Deserialize, Serialize};

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    /// Baseline minutes to produce one unit; engine falls back to 10 when unset
    pub production_minutes_per_unit: Option<i64>,
    /// Baseline minutes to pack one unit; engine falls back to 5 when unset
    pub packaging_minutes_per_unit: Option<i64>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}
