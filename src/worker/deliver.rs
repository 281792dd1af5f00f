use std::time::Duration;

use reqwest::Client as HttpClient;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{error, info};

use crate::core::models::{RpcResponse, WebhookTarget};

/// What happened to a webhook POST. Delivery never fails the caller; this is
/// reported for logging and tests only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered(u16),
    Rejected(u16),
    Failed(String),
}

impl DeliveryOutcome {
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }
}

/// Posts final payloads to caller-supplied webhooks. One attempt, no retries.
#[derive(Clone)]
pub struct WebhookDispatcher {
    http: HttpClient,
}

impl WebhookDispatcher {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    pub async fn deliver(&self, target: &WebhookTarget, payload: &RpcResponse) -> DeliveryOutcome {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let sent = self
            .http
            .post(&target.url)
            .headers(headers)
            .bearer_auth(&target.token)
            .json(payload)
            .send()
            .await;

        let resp = match sent {
            Ok(resp) => resp,
            Err(e) => {
                error!("Webhook POST to {} failed: {}", target.url, e);
                return DeliveryOutcome::Failed(e.to_string());
            }
        };

        let status = resp.status();
        if status.is_success() {
            info!(
                "Webhook delivered to {} for request id={}: status={}",
                target.url,
                payload.id(),
                status
            );
            return DeliveryOutcome::Delivered(status.as_u16());
        }

        let body_text = resp
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read body>".to_string());
        error!(
            "Webhook POST to {} rejected: status={} body={}",
            target.url, status, body_text
        );
        DeliveryOutcome::Rejected(status.as_u16())
    }
}
