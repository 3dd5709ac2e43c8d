//! Order intake
//!
//! Creates orders with their line items and invoice in one transaction.
//! Two paths:
//!
//! - standard intake: order is born `pending` and walks the whole
//!   confirmation pipeline
//! - quick order: pre-verified direct intake, order is born `paid` with
//!   an optional percentage discount applied before the total is fixed
//!
//! Totals are immutable after creation; the invoice total always equals
//! the order total at creation.

use chrono::Utc;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use shared::models::{
    Invoice, InvoiceStatus, Order, OrderCreate, OrderItem, OrderItemInput, OrderStatus,
    QuickOrderCreate,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;
use std::collections::HashMap;

use super::error::{FulfillmentError, FulfillmentResult};
use super::money;
use crate::db::repository::{
    counter as counter_repo, customer as customer_repo, invoice as invoice_repo,
    order as order_repo, product as product_repo,
};

/// Document number prefixes (pedido / factura)
const ORDER_PREFIX: &str = "PED";
const INVOICE_PREFIX: &str = "FAC";

/// Order intake service
#[derive(Clone)]
pub struct OrderIntake {
    pool: SqlitePool,
    /// 业务时区，单据编号按此日期
    tz: Tz,
}

impl OrderIntake {
    pub fn new(pool: SqlitePool, tz: Tz) -> Self {
        Self { pool, tz }
    }

    /// Standard intake: order born `pending`, invoice `unpaid`.
    pub async fn create_order(&self, req: OrderCreate) -> FulfillmentResult<(Order, Invoice)> {
        self.create_internal(req.customer_id, &req.items, req.notes, OrderStatus::Pending, None)
            .await
    }

    /// Quick order: pre-verified direct intake. Order born `paid`,
    /// invoice settled at creation; the optional discount adjusts the
    /// total before it is fixed.
    pub async fn quick_order(&self, req: QuickOrderCreate) -> FulfillmentResult<(Order, Invoice)> {
        if let Some(discount) = req.discount_percent {
            money::validate_discount_percent(discount)?;
        }
        self.create_internal(
            req.customer_id,
            &req.items,
            req.notes,
            OrderStatus::Paid,
            req.discount_percent,
        )
        .await
    }

    async fn create_internal(
        &self,
        customer_id: i64,
        items: &[OrderItemInput],
        notes: Option<String>,
        status: OrderStatus,
        discount_percent: Option<f64>,
    ) -> FulfillmentResult<(Order, Invoice)> {
        if items.is_empty() {
            return Err(FulfillmentError::Validation(
                "Order must contain at least one item".to_string(),
            ));
        }
        for item in items {
            money::validate_quantity(item.quantity)?;
        }

        let now = now_millis();
        let mut tx = self.pool.begin().await?;

        customer_repo::find_by_id(&mut *tx, customer_id)
            .await?
            .ok_or(FulfillmentError::CustomerNotFound(customer_id))?;

        // Load active products for unit prices
        let product_ids: Vec<i64> = items.iter().map(|i| i.product_id).collect();
        let products: HashMap<i64, _> = product_repo::find_active_by_ids(&mut *tx, &product_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let order_id = snowflake_id();
        let mut order_items = Vec::with_capacity(items.len());
        let mut total = Decimal::ZERO;
        for input in items {
            let product = products.get(&input.product_id).ok_or_else(|| {
                FulfillmentError::Validation(format!(
                    "Product {} not found or inactive",
                    input.product_id
                ))
            })?;
            money::validate_unit_price(product.price)?;
            let subtotal = money::line_subtotal(input.quantity, product.price);
            total += money::to_decimal(subtotal);
            order_items.push(OrderItem {
                id: snowflake_id(),
                order_id,
                product_id: input.product_id,
                quantity: input.quantity,
                unit_price: product.price,
                subtotal,
            });
        }

        let mut total_amount = money::to_f64(total);
        if let Some(discount) = discount_percent {
            total_amount = money::apply_discount_percent(total_amount, discount);
        }

        // Allocate document numbers inside the transaction so a rollback
        // does not burn them
        let day = self.business_day();
        let order_seq = counter_repo::next_value(&mut tx, &day, "order").await?;
        let invoice_seq = counter_repo::next_value(&mut tx, &day, "invoice").await?;
        let order_number = format!("{}{}{}", ORDER_PREFIX, day, 10000 + order_seq);
        let invoice_number = format!("{}{}{}", INVOICE_PREFIX, day, 10000 + invoice_seq);

        let order = Order {
            id: order_id,
            order_number,
            customer_id,
            status,
            total_amount,
            notes,
            created_at: now,
            updated_at: now,
        };
        order_repo::insert(&mut tx, &order).await?;
        for item in &order_items {
            order_repo::insert_item(&mut tx, item).await?;
        }

        // Quick orders are settled at creation
        let (invoice_status, paid_amount) = if status == OrderStatus::Paid {
            (InvoiceStatus::Paid, total_amount)
        } else {
            (InvoiceStatus::Unpaid, 0.0)
        };
        let invoice = Invoice {
            id: snowflake_id(),
            order_id,
            invoice_number,
            total_amount,
            paid_amount,
            status: invoice_status,
            created_at: now,
            updated_at: now,
        };
        invoice_repo::insert(&mut tx, &invoice).await?;

        tx.commit().await?;

        tracing::info!(
            order_id,
            order_number = %order.order_number,
            invoice_number = %invoice.invoice_number,
            status = %order.status,
            total = order.total_amount,
            "Order created"
        );

        Ok((order, invoice))
    }

    /// Business date used for document numbering
    fn business_day(&self) -> String {
        Utc::now().with_timezone(&self.tz).format("%Y%m%d").to_string()
    }
}
