//! Invoice delivery transport
//!
//! Stage C of the pipeline: sends the rendered document through the
//! external delivery HTTP API (sender, recipient, subject, HTML body,
//! base64 attachments). Single-shot per attempt; the retry policy lives
//! in the pipeline.

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Delivery API unreachable: {0}")]
    Unreachable(String),

    #[error("Delivery API rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// Base64-encoded file attachment
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub content_base64: String,
    pub mime_type: String,
}

impl Attachment {
    pub fn pdf(filename: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            filename: filename.into(),
            content_base64: base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type: "application/pdf".to_string(),
        }
    }
}

/// Outbound message for the delivery API
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
    pub attachments: Vec<Attachment>,
}

/// Seam for the pipeline: anything that can deliver an outbound message.
#[async_trait]
pub trait InvoiceTransport: Send + Sync {
    /// Deliver the message; returns the provider message identifier.
    async fn send(&self, message: &OutboundMessage) -> DeliveryResult<String>;
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    id: String,
}

/// HTTP client for the delivery API
#[derive(Debug, Clone)]
pub struct MailerClient {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    sender: String,
}

impl MailerClient {
    pub fn from_config(config: &crate::core::Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.mail_api_url.clone(),
            api_key: config.mail_api_key.clone(),
            sender: config.mail_sender.clone(),
        }
    }
}

#[async_trait]
impl InvoiceTransport for MailerClient {
    async fn send(&self, message: &OutboundMessage) -> DeliveryResult<String> {
        let attachments: Vec<_> = message
            .attachments
            .iter()
            .map(|a| {
                json!({
                    "filename": a.filename,
                    "content": a.content_base64,
                    "type": a.mime_type,
                })
            })
            .collect();

        let mut request = self.client.post(&self.api_url).json(&json!({
            "from": self.sender,
            "to": message.recipient,
            "subject": message.subject,
            "html": message.html_body,
            "attachments": attachments,
        }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| DeliveryError::Unreachable(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected { status, body });
        }

        let parsed: SendResponse = resp.json().await.unwrap_or(SendResponse {
            id: String::new(),
        });
        Ok(parsed.id)
    }
}
