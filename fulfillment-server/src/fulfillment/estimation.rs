//! Estimation engine
//!
//! Pure projection of per-order completion time from item quantities and
//! per-product baseline durations. No I/O; the natural unit-test surface.

use shared::models::{EstimationReport, EstimationResult};

/// Fallback when a product carries no production baseline
pub const DEFAULT_PRODUCTION_MINUTES_PER_UNIT: i64 = 10;
/// Fallback when a product carries no packaging baseline
pub const DEFAULT_PACKAGING_MINUTES_PER_UNIT: i64 = 5;
/// Fixed buffer between packing done and pickup/dispatch
pub const PICKUP_BUFFER_MINUTES: i64 = 15;

const MINUTE_MS: i64 = 60_000;

/// One line item's contribution to the projection
#[derive(Debug, Clone, Copy)]
pub struct EstimationInput {
    pub quantity: i64,
    pub production_minutes_per_unit: Option<i64>,
    pub packaging_minutes_per_unit: Option<i64>,
}

/// Compute the time projection for a set of line items.
pub fn estimate(items: &[EstimationInput]) -> EstimationResult {
    let production_minutes: i64 = items
        .iter()
        .map(|i| {
            i.quantity
                * i.production_minutes_per_unit
                    .unwrap_or(DEFAULT_PRODUCTION_MINUTES_PER_UNIT)
        })
        .sum();
    let packaging_minutes: i64 = items
        .iter()
        .map(|i| {
            i.quantity
                * i.packaging_minutes_per_unit
                    .unwrap_or(DEFAULT_PACKAGING_MINUTES_PER_UNIT)
        })
        .sum();

    EstimationResult {
        production_minutes,
        packaging_minutes,
        pickup_buffer_minutes: PICKUP_BUFFER_MINUTES,
        total_minutes: production_minutes + packaging_minutes + PICKUP_BUFFER_MINUTES,
    }
}

/// Derive the display fields from a projection and a concrete clock.
///
/// `anchor_at` is the production start timestamp, or the order creation
/// timestamp when production has not started yet. "Near overdue" only
/// makes sense for projections longer than one minute.
pub fn report(result: EstimationResult, anchor_at: i64, now: i64) -> EstimationReport {
    let elapsed_minutes = ((now - anchor_at) / MINUTE_MS).max(0);
    let target_completion_at = anchor_at + result.total_minutes * MINUTE_MS;

    EstimationReport {
        result,
        anchor_at,
        target_completion_at,
        elapsed_minutes,
        is_overdue: elapsed_minutes >= result.total_minutes,
        is_near_overdue: result.total_minutes > 1
            && elapsed_minutes == result.total_minutes - 1,
    }
}
