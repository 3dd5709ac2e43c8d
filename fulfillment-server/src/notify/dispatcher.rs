//! Outbound chat notifications
//!
//! Capability-probed: when the gateway is not configured every call is a
//! logged no-op. The gateway speaks session + chat id + text.

use serde_json::json;
use shared::models::OrderStatus;

/// Chat gateway connection settings
#[derive(Debug, Clone)]
struct ChatGatewayConfig {
    url: String,
    session: String,
    api_key: Option<String>,
}

/// What happened, with the data the message text needs
#[derive(Debug, Clone)]
pub enum NotificationKind {
    OrderReceived { order_number: String },
    StatusChanged { order_number: String, status: OrderStatus },
    InvoiceDelivered { invoice_number: String },
}

impl NotificationKind {
    /// Customer-facing message text
    pub fn message_text(&self) -> String {
        match self {
            Self::OrderReceived { order_number } => {
                format!("Hemos recibido su pedido {}. ¡Gracias!", order_number)
            }
            Self::StatusChanged { order_number, status } => {
                let estado = match status {
                    OrderStatus::Confirmed => "confirmado",
                    OrderStatus::Invoiced => "facturado",
                    OrderStatus::Paid => "pagado",
                    OrderStatus::Production => "en producción",
                    OrderStatus::Packaging => "en empaquetado",
                    OrderStatus::Shipping => "en camino",
                    OrderStatus::Completed => "entregado",
                    OrderStatus::Cancelled => "cancelado",
                    OrderStatus::Pending => "pendiente",
                };
                format!("Su pedido {} está {}.", order_number, estado)
            }
            Self::InvoiceDelivered { invoice_number } => {
                format!("Le hemos enviado la factura {}.", invoice_number)
            }
        }
    }
}

/// Fire-and-forget chat notification dispatcher
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    client: reqwest::Client,
    config: Option<ChatGatewayConfig>,
}

impl NotificationDispatcher {
    pub fn from_config(config: &crate::core::Config) -> Self {
        let gateway = config.chat_gateway_url.as_ref().map(|url| ChatGatewayConfig {
            url: url.clone(),
            session: config.chat_session_id.clone(),
            api_key: config.chat_api_key.clone(),
        });
        if gateway.is_none() {
            tracing::info!("Chat gateway not configured, notifications disabled");
        }
        Self {
            client: reqwest::Client::new(),
            config: gateway,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Send one notification. Never returns an error; failures are
    /// logged and swallowed (best-effort contract).
    pub async fn notify(&self, phone: &str, kind: NotificationKind) {
        let Some(gateway) = &self.config else {
            tracing::debug!(phone, ?kind, "Chat gateway not configured, skipping notification");
            return;
        };

        let chat_id = chat_id_for_phone(phone);
        let text = kind.message_text();

        let mut request = self
            .client
            .post(format!("{}/api/sendText", gateway.url))
            .json(&json!({
                "session": gateway.session,
                "chatId": chat_id,
                "text": text,
            }));
        if let Some(key) = &gateway.api_key {
            request = request.header("X-Api-Key", key);
        }

        match request.send().await {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!(%chat_id, "Notification sent");
            }
            Ok(resp) => {
                tracing::warn!(
                    %chat_id,
                    status = %resp.status(),
                    "Chat gateway rejected notification"
                );
            }
            Err(e) => {
                tracing::warn!(%chat_id, error = %e, "Failed to reach chat gateway");
            }
        }
    }
}

/// Gateway chat id for a phone number (digits only + provider suffix)
fn chat_id_for_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    format!("{}@c.us", digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_id_strips_formatting() {
        assert_eq!(chat_id_for_phone("+34 600-111-222"), "34600111222@c.us");
    }

    #[test]
    fn test_message_texts_carry_identifiers() {
        let text = NotificationKind::StatusChanged {
            order_number: "PED2026010110001".to_string(),
            status: OrderStatus::Shipping,
        }
        .message_text();
        assert!(text.contains("PED2026010110001"));
        assert!(text.contains("en camino"));

        let text = NotificationKind::InvoiceDelivered {
            invoice_number: "FAC2026010110001".to_string(),
        }
        .message_text();
        assert!(text.contains("FAC2026010110001"));
    }

    #[tokio::test]
    async fn test_unconfigured_dispatcher_is_noop() {
        let dispatcher = NotificationDispatcher {
            client: reqwest::Client::new(),
            config: None,
        };
        assert!(!dispatcher.is_configured());
        // Must not panic or attempt any network call
        dispatcher
            .notify(
                "+34600111222",
                NotificationKind::OrderReceived {
                    order_number: "PED1".to_string(),
                },
            )
            .await;
    }
}
