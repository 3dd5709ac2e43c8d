//! Order Model

use serde::{Deserialize, Serialize};

/// Order status along the fulfillment pipeline.
///
/// Wire values are stable; dashboards match on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Invoiced,
    Paid,
    Production,
    Packaging,
    Shipping,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Wire string for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Invoiced => "invoiced",
            Self::Paid => "paid",
            Self::Production => "production",
            Self::Packaging => "packaging",
            Self::Shipping => "shipping",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Position along the pipeline, used for forward-only transition checks.
    /// `Cancelled` has no position; it is reachable from any non-terminal status.
    pub fn pipeline_index(&self) -> Option<usize> {
        match self {
            Self::Pending => Some(0),
            Self::Confirmed => Some(1),
            Self::Invoiced => Some(2),
            Self::Paid => Some(3),
            Self::Production => Some(4),
            Self::Packaging => Some(5),
            Self::Shipping => Some(6),
            Self::Completed => Some(7),
            Self::Cancelled => None,
        }
    }

    /// Terminal statuses accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "invoiced" => Ok(Self::Invoiced),
            "paid" => Ok(Self::Paid),
            "production" => Ok(Self::Production),
            "packaging" => Ok(Self::Packaging),
            "shipping" => Ok(Self::Shipping),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("Unknown order status: {}", other)),
        }
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// Unique order number (PED + business date + sequence)
    pub order_number: String,
    pub customer_id: i64,
    pub status: OrderStatus,
    /// Fixed at creation; never mutated afterwards
    pub total_amount: f64,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order line item, created once at order creation and never mutated
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    /// quantity × unit_price
    pub subtotal: f64,
}

/// Line item input for order creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub product_id: i64,
    pub quantity: i64,
}

/// Create order payload (standard intake, order born `pending`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub customer_id: i64,
    pub items: Vec<OrderItemInput>,
    pub notes: Option<String>,
}

/// Quick order payload (pre-verified direct intake, order born `paid`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickOrderCreate {
    pub customer_id: i64,
    pub items: Vec<OrderItemInput>,
    pub notes: Option<String>,
    /// Percentage discount (0–100) applied before the total is fixed
    pub discount_percent: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for s in [
            "pending",
            "confirmed",
            "invoiced",
            "paid",
            "production",
            "packaging",
            "shipping",
            "completed",
            "cancelled",
        ] {
            let status: OrderStatus = s.parse().unwrap();
            assert_eq!(status.as_str(), s);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!("delivering".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Shipping.is_terminal());
    }
}
