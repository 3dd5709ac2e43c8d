//! Invoice Model

use serde::{Deserialize, Serialize};

/// Invoice payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum InvoiceStatus {
    Unpaid,
    Partial,
    Paid,
}

/// Invoice entity, created once per order at creation time.
/// `total_amount` equals the order total at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: i64,
    pub order_id: i64,
    /// Unique invoice number (FAC + business date + sequence)
    pub invoice_number: String,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub status: InvoiceStatus,
    pub created_at: i64,
    pub updated_at: i64,
}
