//! Invoice pipeline data types

use shared::models::{Customer, Invoice, Order};
use sqlx::SqlitePool;
use std::path::PathBuf;

use crate::db::repository::{
    RepoError, RepoResult, customer as customer_repo, invoice as invoice_repo,
    order as order_repo, product as product_repo,
};

/// One rendered invoice line
#[derive(Debug, Clone)]
pub struct InvoiceLine {
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub subtotal: f64,
}

/// Everything the pipeline needs to render and deliver one invoice.
/// Loaded up front so the background task owns its data.
#[derive(Debug, Clone)]
pub struct InvoiceJob {
    pub order: Order,
    pub invoice: Invoice,
    pub customer: Customer,
    pub lines: Vec<InvoiceLine>,
}

impl InvoiceJob {
    /// Load the job data for an order
    pub async fn load(pool: &SqlitePool, order_id: i64) -> RepoResult<Self> {
        let order = order_repo::find_by_id(pool, order_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {}", order_id)))?;
        let invoice = invoice_repo::find_by_order(pool, order_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Invoice for order {}", order_id)))?;
        let customer = customer_repo::find_by_id(pool, order.customer_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Customer {}", order.customer_id)))?;

        let items = order_repo::find_items(pool, order_id).await?;
        let mut lines = Vec::with_capacity(items.len());
        for item in &items {
            let product_name = product_repo::find_by_id(pool, item.product_id)
                .await?
                .map(|p| p.name)
                .unwrap_or_else(|| format!("Producto {}", item.product_id));
            lines.push(InvoiceLine {
                product_name,
                quantity: item.quantity,
                unit_price: item.unit_price,
                subtotal: item.subtotal,
            });
        }

        Ok(Self {
            order,
            invoice,
            customer,
            lines,
        })
    }
}

/// Store identity printed on the invoice header
#[derive(Debug, Clone)]
pub struct StoreIdentity {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    /// Logo embedded into the styled template when present
    pub logo_path: Option<PathBuf>,
}

impl StoreIdentity {
    pub fn from_config(config: &crate::core::Config) -> Self {
        let logo_path = PathBuf::from(&config.work_dir).join("assets/logo.png");
        Self {
            name: config.store_name.clone(),
            address: config.store_address.clone(),
            phone: config.store_phone.clone(),
            logo_path: logo_path.exists().then_some(logo_path),
        }
    }
}
