//! Estimation result types (transient, not persisted)

use serde::{Deserialize, Serialize};

/// Per-order time projection computed from item quantities and
/// per-product baseline durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimationResult {
    pub production_minutes: i64,
    pub packaging_minutes: i64,
    /// Fixed buffer between packing done and pickup/dispatch
    pub pickup_buffer_minutes: i64,
    /// production + packaging + pickup buffer
    pub total_minutes: i64,
}

/// Estimation plus the display fields derived from a concrete clock
/// (anchor = production start, or order creation if production has not
/// started yet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimationReport {
    #[serde(flatten)]
    pub result: EstimationResult,
    /// Timestamp the estimation counts from (ms)
    pub anchor_at: i64,
    /// anchor + total_minutes (ms)
    pub target_completion_at: i64,
    /// Whole minutes elapsed since the anchor
    pub elapsed_minutes: i64,
    pub is_overdue: bool,
    pub is_near_overdue: bool,
}
