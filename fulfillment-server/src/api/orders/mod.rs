//! Order API Module
//!
//! Intake, status transitions, estimations and invoice delivery.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Intake
        .route("/", post(handler::create).get(handler::list))
        .route("/quick", post(handler::quick_create))
        // Detail
        .route("/{id}", get(handler::get_by_id))
        // Fulfillment
        .route("/{id}/status", post(handler::transition))
        .route("/{id}/estimation", get(handler::estimation))
        // Invoicing (background)
        .route("/{id}/invoice/send", post(handler::send_invoice))
}
