//! Workflow webhook client: record forwarding and feed price updates.

use crate::forward::error::ForwardError;
use crate::settings::Settings;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Timeout for record sends.
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for price update triggers; the workflow kicks off a feed crawl
/// before answering.
const PRICE_UPDATE_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for the workflow engine's webhook endpoints.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    send_url: String,
    price_update_url: String,
}

impl WebhookClient {
    /// Create a client with explicit endpoints.
    pub fn new(send_url: impl Into<String>, price_update_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            send_url: send_url.into(),
            price_update_url: price_update_url.into(),
        }
    }

    /// Create a client from persisted settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.webhook_url, &settings.price_update_url)
    }

    /// Use a shared HTTP client instead of a private one.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// POST a payload (a record, or a record merged with its completion) to
    /// the webhook.
    ///
    /// Returns the response body parsed as JSON. Workflows often answer with
    /// plain text or an empty body; those come back as `{}` rather than an
    /// error. A non-success status is an error carrying the status code.
    pub async fn send_record<T: Serialize + ?Sized>(
        &self,
        payload: &T,
    ) -> Result<serde_json::Value, ForwardError> {
        debug!(url = %self.send_url, "sending record to webhook");
        let response = self
            .client
            .post(&self.send_url)
            .json(payload)
            .timeout(SEND_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForwardError::WebhookStatus {
                status: status.as_u16(),
            });
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .unwrap_or_else(|_| serde_json::json!({}));
        debug!(status = status.as_u16(), "webhook accepted record");
        Ok(body)
    }

    /// POST `{"feed_url": ...}` to the workflow start endpoint.
    ///
    /// Any status below 300 counts as started; the status code is returned
    /// for display. The response body is not interpreted.
    pub async fn start_price_update(&self, feed_url: &str) -> Result<u16, ForwardError> {
        debug!(url = %self.price_update_url, feed_url, "triggering price update");
        let response = self
            .client
            .post(&self.price_update_url)
            .json(&serde_json::json!({ "feed_url": feed_url }))
            .timeout(PRICE_UPDATE_TIMEOUT)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status < 300 {
            Ok(status)
        } else {
            Err(ForwardError::WebhookStatus { status })
        }
    }
}
