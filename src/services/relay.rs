use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use crate::models::Participant;

/// Errors that can occur when talking to the WhatsApp relay
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Relay returned error status {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Recipient must be in international format starting with +: {0}")]
    InvalidRecipient(String),
}

/// Client for the WhatsApp message relay
///
/// The relay accepts `{to, type, text: {body}}` on POST /relay, authorized
/// with an `X-Relay-Auth` header, and forwards the message to the WhatsApp
/// provider. Recipients must be in international format; the relay rejects
/// anything without a leading `+`, so we refuse those before the wire.
pub struct RelayClient {
    base_url: String,
    auth_token: String,
    client: Client,
}

impl RelayClient {
    pub fn new(base_url: String, auth_token: String, timeout_secs: u64) -> Result<Self, RelayError> {
        if auth_token.is_empty() {
            tracing::warn!("Relay auth token not set; the relay may refuse messages");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            auth_token,
            client,
        })
    }

    /// Send one text message through the relay
    pub async fn send_text(&self, to: &str, body: &str) -> Result<(), RelayError> {
        if !to.starts_with('+') {
            return Err(RelayError::InvalidRecipient(to.to_string()));
        }

        let url = format!("{}/relay", self.base_url.trim_end_matches('/'));
        let payload = serde_json::json!({
            "to": to,
            "type": "text",
            "text": { "body": body },
        });

        let response = self
            .client
            .post(&url)
            .header("X-Relay-Auth", &self.auth_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!("Relayed message to {}", to);

        Ok(())
    }

    /// Notify both sides of a fresh pairing
    ///
    /// Best-effort: each failure is logged and swallowed, so a slow or dead
    /// relay can never fail a submission that already committed its pairing.
    pub async fn notify_pair(&self, a: &Participant, b: &Participant, distance_km: f64) {
        for (recipient, partner) in [(a, b), (b, a)] {
            let body = format!(
                "Hi {}! You have been paired with {} ({}), about {:.2} km away.",
                recipient.name, partner.name, partner.phone, distance_km
            );
            if let Err(e) = self.send_text(&recipient.phone, &body).await {
                tracing::warn!(
                    "Failed to notify {} about pairing with {}: {}",
                    recipient.phone,
                    partner.name,
                    e
                );
            }
        }
    }
}
