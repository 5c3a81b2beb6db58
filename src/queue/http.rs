use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::{Value, json};

use super::error::{QueueError, QueueResult};
use super::traits::WorkQueue;
use crate::config::QueueConfig;
use crate::models::WorkItem;

/// Work queue backed by an HTTP endpoint.
///
/// Each item is posted as a queue element envelope:
/// `{"name": <kind>, "status": "NEW", "payload": {...}}`.
pub struct HttpWorkQueue {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpWorkQueue {
    /// Create a queue client from configuration and an optional resolved API key.
    pub fn from_config(
        config: &QueueConfig,
        client: reqwest::Client,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn build_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = if let Some(api_key) = &self.api_key {
            request.header(AUTHORIZATION, api_key)
        } else {
            request
        };

        request.timeout(self.timeout)
    }

    async fn check_response(response: reqwest::Response) -> QueueResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("(empty body)"));

        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(String::from))
            .unwrap_or(body);

        Err(QueueError::Status { status, message })
    }
}

#[async_trait]
impl WorkQueue for HttpWorkQueue {
    async fn enqueue(&self, item: &WorkItem) -> QueueResult<()> {
        let envelope = json!({
            "name": item.kind.as_str(),
            "status": "NEW",
            "payload": item.payload(),
        });

        let response = self
            .build_request(self.client.post(&self.endpoint).json(&envelope))
            .send()
            .await?;

        Self::check_response(response).await?;
        Ok(())
    }
}
