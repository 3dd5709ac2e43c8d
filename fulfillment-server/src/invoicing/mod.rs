//! Invoicing Module
//!
//! Invoice generation & delivery as a background pipeline:
//!
//! - **pipeline**: orchestration (template → render → deliver) behind a
//!   dedup guard
//! - **template**: styled + minimal fallback HTML documents
//! - **render**: shared render engine pool (external worker process)
//! - **delivery**: outbound transport over the delivery HTTP API
//! - **retry**: shared retry-with-backoff combinator
//! - **dedup**: process-local in-flight set with RAII claims
//!
//! # Flow
//!
//! ```text
//! generate_and_deliver(job)
//!     ├─ claim invoice number (duplicate → return true)
//!     ├─ Stage A: styled HTML  (fault → minimal document)
//!     ├─ Stage B: PDF render   (3 × 20s, 1s pause; fault → no attachment)
//!     └─ Stage C: delivery     (3 ×, 2s/4s backoff; fault → false)
//! ```

pub mod dedup;
pub mod delivery;
pub mod pipeline;
pub mod render;
pub mod retry;
pub mod template;
pub mod types;

pub use delivery::{InvoiceTransport, MailerClient};
pub use pipeline::InvoicePipeline;
pub use render::{DocumentRenderer, RenderConfig, RenderPool};
pub use types::{InvoiceJob, StoreIdentity};
