//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::{ServerState, TaskKind};
use crate::db::repository::{
    customer as customer_repo, invoice as invoice_repo, order as order_repo,
};
use crate::fulfillment::{TransitionOptions, TransitionOutcome};
use crate::invoicing::InvoiceJob;
use crate::notify::NotificationKind;
use crate::utils::{AppError, AppResult};
use shared::models::{
    EstimationReport, Invoice, Order, OrderCreate, OrderItem, OrderStatus, QuickOrderCreate,
};

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Intake response: the new order and its invoice
#[derive(Debug, Serialize)]
pub struct OrderCreated {
    pub order: Order,
    pub invoice: Invoice,
}

/// Order detail for dashboards
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub invoice: Option<Invoice>,
}

/// Transition request body
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: OrderStatus,
    #[serde(default)]
    pub courier: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Accepted response for background invoice delivery
#[derive(Debug, Serialize)]
pub struct InvoiceSendAccepted {
    pub invoice_number: String,
    pub accepted: bool,
}

/// Create order (standard intake)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<OrderCreated>> {
    let (order, invoice) = state.intake.create_order(payload).await.map_err(AppError::from)?;

    state.dispatch_notification(
        customer_phone(&state, order.customer_id).await,
        NotificationKind::OrderReceived {
            order_number: order.order_number.clone(),
        },
    );

    Ok(Json(OrderCreated { order, invoice }))
}

/// Create quick order (pre-verified direct intake)
pub async fn quick_create(
    State(state): State<ServerState>,
    Json(payload): Json<QuickOrderCreate>,
) -> AppResult<Json<OrderCreated>> {
    let (order, invoice) = state.intake.quick_order(payload).await.map_err(AppError::from)?;

    state.dispatch_notification(
        customer_phone(&state, order.customer_id).await,
        NotificationKind::OrderReceived {
            order_number: order.order_number.clone(),
        },
    );

    Ok(Json(OrderCreated { order, invoice }))
}

/// List orders (paginated)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = order_repo::find_all(&state.db.pool, query.limit, query.offset)
        .await
        .map_err(AppError::from)?;
    Ok(Json(orders))
}

/// Get order detail by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let order = order_repo::find_by_id(&state.db.pool, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Order {}", id)))?;
    let items = order_repo::find_items(&state.db.pool, id)
        .await
        .map_err(AppError::from)?;
    let invoice = invoice_repo::find_by_order(&state.db.pool, id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(OrderDetail { order, items, invoice }))
}

/// Apply a fulfillment transition
pub async fn transition(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TransitionRequest>,
) -> AppResult<Json<TransitionOutcome>> {
    let outcome = state
        .machine
        .apply_transition(
            id,
            payload.status,
            TransitionOptions {
                courier: payload.courier,
                notes: payload.notes,
            },
        )
        .await
        .map_err(AppError::from)?;

    state.dispatch_notification(
        customer_phone(&state, outcome.order.customer_id).await,
        NotificationKind::StatusChanged {
            order_number: outcome.order.order_number.clone(),
            status: outcome.order.status,
        },
    );

    Ok(Json(outcome))
}

/// Estimation report on demand
pub async fn estimation(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<EstimationReport>> {
    let order = order_repo::find_by_id(&state.db.pool, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Order {}", id)))?;
    let report = state
        .machine
        .estimation_report(&order)
        .await
        .map_err(AppError::from)?;
    Ok(Json(report))
}

/// Trigger invoice generation & delivery as a background task.
///
/// The request returns immediately; the pipeline outcome is observable
/// via logs only (best-effort contract, retriggerable).
pub async fn send_invoice(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<InvoiceSendAccepted>> {
    let job = InvoiceJob::load(&state.db.pool, id).await.map_err(AppError::from)?;
    let invoice_number = job.invoice.invoice_number.clone();

    let task_state = state.clone();
    state.tasks.spawn("invoice_pipeline", TaskKind::Oneshot, async move {
        let delivered = task_state.invoice_pipeline.generate_and_deliver(&job).await;
        if delivered && let Some(phone) = job.customer.phone.clone() {
            task_state
                .notifier
                .notify(
                    &phone,
                    NotificationKind::InvoiceDelivered {
                        invoice_number: job.invoice.invoice_number.clone(),
                    },
                )
                .await;
        }
    });

    Ok(Json(InvoiceSendAccepted {
        invoice_number,
        accepted: true,
    }))
}

/// Customer phone for notifications; lookup failures just mean no
/// notification goes out.
async fn customer_phone(state: &ServerState, customer_id: i64) -> Option<String> {
    customer_repo::find_by_id(&state.db.pool, customer_id)
        .await
        .ok()
        .flatten()
        .and_then(|c| c.phone)
}
