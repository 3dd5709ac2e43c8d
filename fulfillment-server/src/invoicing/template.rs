//! Invoice HTML templates
//!
//! Stage A of the pipeline. The styled template embeds the store logo
//! and a full line-item table; the minimal template is the fallback
//! when the styled one cannot be produced.

use base64::Engine;
use thiserror::Error;

use super::types::{InvoiceJob, StoreIdentity};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to read logo asset {path}: {source}")]
    Asset {
        path: String,
        source: std::io::Error,
    },
}

/// Render the styled invoice document.
pub fn render_invoice_html(
    job: &InvoiceJob,
    store: &StoreIdentity,
) -> Result<String, TemplateError> {
    let logo_block = match &store.logo_path {
        Some(path) => {
            let bytes = std::fs::read(path).map_err(|source| TemplateError::Asset {
                path: path.display().to_string(),
                source,
            })?;
            let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
            format!(
                r#"<img class="logo" src="data:image/png;base64,{}" alt="{}"/>"#,
                encoded,
                escape_html(&store.name)
            )
        }
        None => String::new(),
    };

    let rows: String = job
        .lines
        .iter()
        .map(|line| {
            format!(
                "<tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>",
                escape_html(&line.product_name),
                line.quantity,
                format_eur(line.unit_price),
                format_eur(line.subtotal),
            )
        })
        .collect();

    let store_contact = [
        store.address.as_deref().unwrap_or_default(),
        store.phone.as_deref().unwrap_or_default(),
    ]
    .iter()
    .filter(|s| !s.is_empty())
    .map(|s| escape_html(s))
    .collect::<Vec<_>>()
    .join(" · ");

    let customer_contact = [
        job.customer.phone.as_deref().unwrap_or_default(),
        job.customer.email.as_deref().unwrap_or_default(),
    ]
    .iter()
    .filter(|s| !s.is_empty())
    .map(|s| escape_html(s))
    .collect::<Vec<_>>()
    .join(" · ");

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8"/>
<style>
  body {{ font-family: 'Helvetica Neue', Arial, sans-serif; color: #222; margin: 40px; }}
  header {{ display: flex; justify-content: space-between; align-items: flex-start;
            border-bottom: 2px solid #b5443c; padding-bottom: 16px; }}
  .logo {{ max-height: 64px; }}
  h1 {{ font-size: 20px; margin: 0; color: #b5443c; }}
  .meta {{ text-align: right; font-size: 12px; color: #666; }}
  .customer {{ margin: 24px 0; font-size: 13px; }}
  table {{ width: 100%; border-collapse: collapse; font-size: 13px; }}
  th {{ text-align: left; border-bottom: 1px solid #999; padding: 6px 4px; }}
  td {{ border-bottom: 1px solid #eee; padding: 6px 4px; }}
  .num {{ text-align: right; }}
  .total-row td {{ border-top: 2px solid #b5443c; border-bottom: none;
                   font-weight: bold; font-size: 15px; }}
  footer {{ margin-top: 32px; font-size: 11px; color: #999; text-align: center; }}
</style>
</head>
<body>
<header>
  <div>
    {logo_block}
    <h1>{store_name}</h1>
    <div class="meta">{store_contact}</div>
  </div>
  <div class="meta">
    <div><strong>Factura {invoice_number}</strong></div>
    <div>Pedido {order_number}</div>
  </div>
</header>
<div class="customer">
  <strong>{customer_name}</strong><br/>
  {customer_contact}
</div>
<table>
  <thead>
    <tr><th>Producto</th><th class="num">Cantidad</th><th class="num">Precio</th><th class="num">Importe</th></tr>
  </thead>
  <tbody>
    {rows}
    <tr class="total-row"><td colspan="3">Total</td><td class="num">{total}</td></tr>
  </tbody>
</table>
<footer>Gracias por su pedido</footer>
</body>
</html>"#,
        logo_block = logo_block,
        store_name = escape_html(&store.name),
        store_contact = store_contact,
        invoice_number = escape_html(&job.invoice.invoice_number),
        order_number = escape_html(&job.order.order_number),
        customer_name = escape_html(&job.customer.name),
        customer_contact = customer_contact,
        rows = rows,
        total = format_eur(job.invoice.total_amount),
    ))
}

/// Minimal fallback document. Infallible by construction so a template
/// fault can never abort the pipeline.
pub fn render_minimal_html(job: &InvoiceJob) -> String {
    format!(
        "<html><body><h1>Factura {}</h1><p>Pedido {}</p><p>Cliente: {}</p><p>Total: {}</p></body></html>",
        escape_html(&job.invoice.invoice_number),
        escape_html(&job.order.order_number),
        escape_html(&job.customer.name),
        format_eur(job.invoice.total_amount),
    )
}

/// Escape the five HTML-special characters
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn format_eur(value: f64) -> String {
    format!("{:.2} EUR", value)
}
