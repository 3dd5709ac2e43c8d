//! Fulfillment state machine
//!
//! Applies a requested status change to an order inside one SQLite
//! transaction, spawning and closing the per-stage tracking records the
//! target status implies. Either the status change and all its stage
//! side effects commit, or none do.
//!
//! # Transition table
//!
//! The legacy behavior accepted any status string; this implementation
//! deliberately hardens it into an explicit rule: forward moves along
//! the pipeline are legal (skipping stages is allowed, moving backwards
//! is not), re-applying the current status is legal and idempotent (the
//! stage side effects are insert-if-absent no-ops), `cancelled` is
//! reachable from any non-terminal status, and terminal orders accept
//! nothing.
//!
//! Entering `completed` or `cancelled` updates the order row only: an
//! open shipment record is NOT auto-closed and stock is NOT restored.
//! Whether that is intentional is an open product question; the observed
//! behavior is kept.
//!
//! Known limitation (kept as observed): no row locking, so two concurrent
//! transitions for the same order race last-write-wins on the order row.

use serde::{Deserialize, Serialize};
use shared::models::{EstimationReport, Order, OrderStatus};
use shared::util::now_millis;
use sqlx::SqlitePool;

use super::error::{FulfillmentError, FulfillmentResult};
use super::estimation::{self, EstimationInput};
use crate::db::repository::{order as order_repo, stage as stage_repo};

/// Courier placeholder until dispatch assigns a real one
pub const DEFAULT_COURIER: &str = "SIN ASIGNAR";

/// Caller-supplied extras for a transition
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransitionOptions {
    /// Courier name for the shipment record (shipping transitions)
    pub courier: Option<String>,
    /// Free-text note stored on the stage record created by this transition
    pub notes: Option<String>,
}

/// Result of a transition: the updated order plus a fresh projection
/// for display.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionOutcome {
    pub order: Order,
    pub estimation: EstimationReport,
}

/// Check a `(current, target)` pair against the transition table.
pub fn is_transition_allowed(from: OrderStatus, to: OrderStatus) -> bool {
    if from.is_terminal() {
        return false;
    }
    if to == OrderStatus::Cancelled {
        return true;
    }
    match (from.pipeline_index(), to.pipeline_index()) {
        (Some(f), Some(t)) => t >= f,
        _ => false,
    }
}

/// Fulfillment state machine over the shared SQLite pool
#[derive(Clone)]
pub struct FulfillmentMachine {
    pool: SqlitePool,
}

impl FulfillmentMachine {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply a status transition to an order.
    ///
    /// Runs one transactional step: validates the transition, performs
    /// the stage-record side effects keyed on the target status, updates
    /// the order row, commits. Returns the updated order plus a freshly
    /// computed estimation report.
    pub async fn apply_transition(
        &self,
        order_id: i64,
        target: OrderStatus,
        options: TransitionOptions,
    ) -> FulfillmentResult<TransitionOutcome> {
        let now = now_millis();
        let mut tx = self.pool.begin().await?;

        let order = order_repo::find_by_id(&mut *tx, order_id)
            .await?
            .ok_or(FulfillmentError::OrderNotFound(order_id))?;

        if !is_transition_allowed(order.status, target) {
            return Err(FulfillmentError::IllegalTransition {
                from: order.status,
                to: target,
            });
        }

        let notes = options.notes.as_deref();
        match target {
            OrderStatus::Production => {
                let inserted =
                    stage_repo::insert_production_if_absent(&mut tx, order_id, now, notes).await?;
                if !inserted {
                    tracing::debug!(order_id, "Production record already open, skipping insert");
                }
            }
            OrderStatus::Packaging => {
                stage_repo::close_open_production(&mut tx, order_id, now).await?;
                let inserted =
                    stage_repo::insert_packaging_if_absent(&mut tx, order_id, now, notes).await?;
                if !inserted {
                    tracing::debug!(order_id, "Packaging record already open, skipping insert");
                }
            }
            OrderStatus::Shipping => {
                stage_repo::close_open_packaging(&mut tx, order_id, now).await?;
                let courier = options.courier.as_deref().unwrap_or(DEFAULT_COURIER);
                let inserted =
                    stage_repo::insert_shipment_if_absent(&mut tx, order_id, now, courier, notes)
                        .await?;
                if !inserted {
                    tracing::debug!(order_id, "Shipment record already open, skipping insert");
                }
            }
            OrderStatus::Completed | OrderStatus::Cancelled => {
                // Status update only; terminal bookkeeping (closing an open
                // shipment, restoring stock) stays manual.
            }
            _ => {}
        }

        order_repo::update_status(&mut tx, order_id, target, now).await?;
        tx.commit().await?;

        tracing::info!(
            order_id,
            order_number = %order.order_number,
            from = %order.status,
            to = %target,
            "Order transitioned"
        );

        let order = order_repo::find_by_id(&self.pool, order_id)
            .await?
            .ok_or(FulfillmentError::OrderNotFound(order_id))?;
        let estimation = self.estimation_report(&order).await?;

        Ok(TransitionOutcome { order, estimation })
    }

    /// Compute the estimation report for an order.
    ///
    /// Anchor is the first production record's start, or the order
    /// creation time when production has not started.
    pub async fn estimation_report(&self, order: &Order) -> FulfillmentResult<EstimationReport> {
        let baselines = order_repo::find_estimation_baselines(&self.pool, order.id).await?;
        let inputs: Vec<EstimationInput> = baselines
            .into_iter()
            .map(|(quantity, production, packaging)| EstimationInput {
                quantity,
                production_minutes_per_unit: production,
                packaging_minutes_per_unit: packaging,
            })
            .collect();
        let result = estimation::estimate(&inputs);

        let anchor_at = stage_repo::find_production_for_order(&self.pool, order.id)
            .await?
            .first()
            .map(|r| r.started_at)
            .unwrap_or(order.created_at);

        Ok(estimation::report(result, anchor_at, now_millis()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_moves_allowed() {
        assert!(is_transition_allowed(OrderStatus::Pending, OrderStatus::Confirmed));
        assert!(is_transition_allowed(OrderStatus::Confirmed, OrderStatus::Production));
        assert!(is_transition_allowed(OrderStatus::Production, OrderStatus::Packaging));
        assert!(is_transition_allowed(OrderStatus::Packaging, OrderStatus::Shipping));
        assert!(is_transition_allowed(OrderStatus::Shipping, OrderStatus::Completed));
        // Skipping stages is legal
        assert!(is_transition_allowed(OrderStatus::Paid, OrderStatus::Shipping));
    }

    #[test]
    fn test_backward_moves_rejected() {
        assert!(!is_transition_allowed(OrderStatus::Packaging, OrderStatus::Production));
        assert!(!is_transition_allowed(OrderStatus::Shipping, OrderStatus::Pending));
    }

    #[test]
    fn test_reapplying_current_status_allowed() {
        assert!(is_transition_allowed(OrderStatus::Production, OrderStatus::Production));
        assert!(is_transition_allowed(OrderStatus::Confirmed, OrderStatus::Confirmed));
    }

    #[test]
    fn test_cancel_from_any_non_terminal() {
        assert!(is_transition_allowed(OrderStatus::Pending, OrderStatus::Cancelled));
        assert!(is_transition_allowed(OrderStatus::Shipping, OrderStatus::Cancelled));
    }

    #[test]
    fn test_terminal_accepts_nothing() {
        assert!(!is_transition_allowed(OrderStatus::Completed, OrderStatus::Shipping));
        assert!(!is_transition_allowed(OrderStatus::Cancelled, OrderStatus::Pending));
        assert!(!is_transition_allowed(OrderStatus::Completed, OrderStatus::Cancelled));
    }
}
