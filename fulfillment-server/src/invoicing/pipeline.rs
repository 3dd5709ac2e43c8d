//! Invoice generation & delivery pipeline
//!
//! Three stages behind a process-local dedup guard:
//!
//! 1. **Templating** - styled HTML, falling back to a minimal document
//!    on any template fault (never aborts the pipeline)
//! 2. **Rendering** - A4 PDF through the shared render pool; bounded
//!    retries, each attempt raced against a wall-clock timeout; total
//!    failure degrades to delivery without attachment
//! 3. **Delivery** - external HTTP API with linear-backoff retries;
//!    total failure folds into the overall `false` result
//!
//! `generate_and_deliver` never returns an error: every stage failure is
//! caught, logged with the order/invoice identifiers, and reflected in
//! the boolean outcome. There is no durable retry queue; a failed
//! delivery is retriggered manually.

use std::sync::Arc;
use std::time::Duration;

use super::dedup::InFlightSet;
use super::delivery::{Attachment, InvoiceTransport, OutboundMessage};
use super::render::{DocumentRenderer, RenderError};
use super::retry::{Backoff, retry_with_backoff};
use super::template;
use super::types::{InvoiceJob, StoreIdentity};

/// Render stage policy
const RENDER_ATTEMPTS: u32 = 3;
const RENDER_TIMEOUT: Duration = Duration::from_secs(20);
const RENDER_RETRY_PAUSE: Duration = Duration::from_secs(1);

/// Delivery stage policy
const DELIVERY_ATTEMPTS: u32 = 3;
const DELIVERY_BACKOFF_STEP: Duration = Duration::from_secs(2);

/// Invoice pipeline service
pub struct InvoicePipeline {
    renderer: Arc<dyn DocumentRenderer>,
    transport: Arc<dyn InvoiceTransport>,
    in_flight: InFlightSet,
    store: StoreIdentity,
}

impl InvoicePipeline {
    pub fn new(
        renderer: Arc<dyn DocumentRenderer>,
        transport: Arc<dyn InvoiceTransport>,
        store: StoreIdentity,
    ) -> Self {
        Self {
            renderer,
            transport,
            in_flight: InFlightSet::new(),
            store,
        }
    }

    /// Generate and deliver one invoice. Returns whether the delivery
    /// stage ultimately succeeded.
    ///
    /// At most one concurrent run per invoice number within this
    /// process: a duplicate call short-circuits to `true` without
    /// executing any stage.
    pub async fn generate_and_deliver(&self, job: &InvoiceJob) -> bool {
        let invoice_number = job.invoice.invoice_number.as_str();
        let Some(_guard) = self.in_flight.acquire(invoice_number) else {
            tracing::info!(
                order_id = job.order.id,
                invoice_number,
                "Invoice generation already in flight, skipping duplicate"
            );
            return true;
        };
        // _guard is dropped on every exit path below

        // Stage A: templating (degrade to the minimal document on fault)
        let html = match template::render_invoice_html(job, &self.store) {
            Ok(html) => html,
            Err(err) => {
                tracing::warn!(
                    order_id = job.order.id,
                    invoice_number,
                    error = %err,
                    "Styled template failed, falling back to minimal document"
                );
                template::render_minimal_html(job)
            }
        };

        // Stage B: rendering (degrade to no attachment)
        let pdf = self.render_with_retry(job, &html).await;

        // Stage C: delivery
        self.deliver_with_retry(job, html, pdf).await
    }

    async fn render_with_retry(&self, job: &InvoiceJob, html: &str) -> Option<Vec<u8>> {
        let result = retry_with_backoff(
            "invoice_render",
            RENDER_ATTEMPTS,
            Backoff::Fixed(RENDER_RETRY_PAUSE),
            || async {
                match tokio::time::timeout(RENDER_TIMEOUT, self.renderer.render_pdf(html)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(RenderError::Timeout(RENDER_TIMEOUT.as_millis() as u64)),
                }
            },
        )
        .await;

        match result {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                tracing::error!(
                    order_id = job.order.id,
                    invoice_number = %job.invoice.invoice_number,
                    error = %err,
                    "Rendering failed after {} attempts, delivering without attachment",
                    RENDER_ATTEMPTS
                );
                None
            }
        }
    }

    async fn deliver_with_retry(
        &self,
        job: &InvoiceJob,
        html: String,
        pdf: Option<Vec<u8>>,
    ) -> bool {
        let Some(recipient) = job.customer.email.clone() else {
            tracing::error!(
                order_id = job.order.id,
                invoice_number = %job.invoice.invoice_number,
                customer_id = job.customer.id,
                "Customer has no delivery address, invoice not sent"
            );
            return false;
        };

        let attachments = match pdf {
            Some(bytes) => vec![Attachment::pdf(
                format!("{}.pdf", job.invoice.invoice_number),
                &bytes,
            )],
            None => Vec::new(),
        };
        let message = OutboundMessage {
            recipient,
            subject: format!("Factura {} - {}", job.invoice.invoice_number, self.store.name),
            html_body: html,
            attachments,
        };

        let result = retry_with_backoff(
            "invoice_delivery",
            DELIVERY_ATTEMPTS,
            Backoff::Linear(DELIVERY_BACKOFF_STEP),
            || async { self.transport.send(&message).await },
        )
        .await;

        match result {
            Ok(message_id) => {
                tracing::info!(
                    order_id = job.order.id,
                    invoice_number = %job.invoice.invoice_number,
                    message_id = %message_id,
                    with_attachment = !message.attachments.is_empty(),
                    "Invoice delivered"
                );
                true
            }
            Err(err) => {
                tracing::error!(
                    order_id = job.order.id,
                    invoice_number = %job.invoice.invoice_number,
                    error = %err,
                    "Invoice delivery failed after {} attempts",
                    DELIVERY_ATTEMPTS
                );
                false
            }
        }
    }
}

impl std::fmt::Debug for InvoicePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvoicePipeline")
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoicing::delivery::DeliveryError;
    use crate::invoicing::render::RenderResult;
    use async_trait::async_trait;
    use shared::models::{Customer, Invoice, InvoiceStatus, Order, OrderStatus};
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::Mutex;

    fn test_job() -> InvoiceJob {
        InvoiceJob {
            order: Order {
                id: 7,
                order_number: "PED2026010110001".to_string(),
                customer_id: 1,
                status: OrderStatus::Paid,
                total_amount: 21.0,
                notes: None,
                created_at: 0,
                updated_at: 0,
            },
            invoice: Invoice {
                id: 1,
                order_id: 7,
                invoice_number: "FAC2026010110001".to_string(),
                total_amount: 21.0,
                paid_amount: 21.0,
                status: InvoiceStatus::Paid,
                created_at: 0,
                updated_at: 0,
            },
            customer: Customer {
                id: 1,
                name: "Maria Lopez".to_string(),
                phone: Some("+34600111222".to_string()),
                email: Some("maria@example.com".to_string()),
                address: None,
                created_at: 0,
                updated_at: 0,
            },
            lines: Vec::new(),
        }
    }

    fn test_store() -> StoreIdentity {
        StoreIdentity {
            name: "Obrador Central".to_string(),
            address: None,
            phone: None,
            logo_path: None,
        }
    }

    /// Renderer mock: fails `fail_first` times, then succeeds; optional
    /// per-call delay to keep a pipeline run in flight.
    struct MockRenderer {
        calls: AtomicU32,
        fail_first: u32,
        delay: Duration,
    }

    impl MockRenderer {
        fn ok() -> Self {
            Self { calls: AtomicU32::new(0), fail_first: 0, delay: Duration::ZERO }
        }

        fn failing() -> Self {
            Self { calls: AtomicU32::new(0), fail_first: u32::MAX, delay: Duration::ZERO }
        }

        fn slow(delay: Duration) -> Self {
            Self { calls: AtomicU32::new(0), fail_first: 0, delay }
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DocumentRenderer for MockRenderer {
        async fn render_pdf(&self, _html: &str) -> RenderResult<Vec<u8>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if n <= self.fail_first {
                Err(RenderError::Unavailable("engine down".to_string()))
            } else {
                Ok(b"%PDF-1.4 rendered".to_vec())
            }
        }
    }

    /// Transport mock recording sent messages
    struct MockTransport {
        calls: AtomicU32,
        fail: bool,
        sent: Mutex<Vec<OutboundMessage>>,
    }

    impl MockTransport {
        fn ok() -> Self {
            Self { calls: AtomicU32::new(0), fail: false, sent: Mutex::new(Vec::new()) }
        }

        fn failing() -> Self {
            Self { calls: AtomicU32::new(0), fail: true, sent: Mutex::new(Vec::new()) }
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InvoiceTransport for MockTransport {
        async fn send(&self, message: &OutboundMessage) -> super::super::delivery::DeliveryResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DeliveryError::Unreachable("api down".to_string()));
            }
            self.sent.lock().await.push(message.clone());
            Ok("msg-1".to_string())
        }
    }

    fn pipeline(
        renderer: Arc<MockRenderer>,
        transport: Arc<MockTransport>,
    ) -> InvoicePipeline {
        InvoicePipeline::new(renderer, transport, test_store())
    }

    #[tokio::test]
    async fn test_happy_path_delivers_with_attachment() {
        let renderer = Arc::new(MockRenderer::ok());
        let transport = Arc::new(MockTransport::ok());
        let pipeline = pipeline(renderer.clone(), transport.clone());

        assert!(pipeline.generate_and_deliver(&test_job()).await);

        assert_eq!(renderer.call_count(), 1);
        let sent = transport.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "maria@example.com");
        assert_eq!(sent[0].attachments.len(), 1);
        assert_eq!(sent[0].attachments[0].filename, "FAC2026010110001.pdf");
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_failure_degrades_to_no_attachment() {
        let renderer = Arc::new(MockRenderer::failing());
        let transport = Arc::new(MockTransport::ok());
        let pipeline = pipeline(renderer.clone(), transport.clone());

        // Delivery succeeds, so the overall result is still true
        assert!(pipeline.generate_and_deliver(&test_job()).await);

        assert_eq!(renderer.call_count(), RENDER_ATTEMPTS);
        let sent = transport.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].attachments.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_recovers_on_second_attempt() {
        let renderer = Arc::new(MockRenderer {
            calls: AtomicU32::new(0),
            fail_first: 1,
            delay: Duration::ZERO,
        });
        let transport = Arc::new(MockTransport::ok());
        let pipeline = pipeline(renderer.clone(), transport.clone());

        assert!(pipeline.generate_and_deliver(&test_job()).await);
        assert_eq!(renderer.call_count(), 2);
        assert_eq!(transport.sent.lock().await[0].attachments.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivery_failure_returns_false_without_panicking() {
        let renderer = Arc::new(MockRenderer::ok());
        let transport = Arc::new(MockTransport::failing());
        let pipeline = pipeline(renderer, transport.clone());

        assert!(!pipeline.generate_and_deliver(&test_job()).await);
        assert_eq!(transport.call_count(), DELIVERY_ATTEMPTS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_delivery_address_returns_false() {
        let renderer = Arc::new(MockRenderer::ok());
        let transport = Arc::new(MockTransport::ok());
        let pipeline = pipeline(renderer, transport.clone());

        let mut job = test_job();
        job.customer.email = None;

        assert!(!pipeline.generate_and_deliver(&job).await);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_executes_once() {
        let renderer = Arc::new(MockRenderer::slow(Duration::from_millis(200)));
        let transport = Arc::new(MockTransport::ok());
        let pipeline = Arc::new(pipeline(renderer.clone(), transport.clone()));

        let first = {
            let pipeline = pipeline.clone();
            tokio::spawn(async move { pipeline.generate_and_deliver(&test_job()).await })
        };
        // Let the first call claim the guard before the duplicate arrives
        tokio::time::sleep(Duration::from_millis(50)).await;
        let second = {
            let pipeline = pipeline.clone();
            tokio::spawn(async move { pipeline.generate_and_deliver(&test_job()).await })
        };

        let (first, second) = (first.await.unwrap(), second.await.unwrap());
        assert!(first);
        assert!(second);
        // Exactly one templating+render+delivery sequence ran
        assert_eq!(renderer.call_count(), 1);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_released_after_failed_run() {
        let renderer = Arc::new(MockRenderer::ok());
        let transport = Arc::new(MockTransport::failing());
        let pipeline = pipeline(renderer.clone(), transport.clone());

        assert!(!pipeline.generate_and_deliver(&test_job()).await);
        // The key is free again: a retriggered run re-executes the stages
        assert!(!pipeline.generate_and_deliver(&test_job()).await);
        assert_eq!(renderer.call_count(), 2);
    }
}
