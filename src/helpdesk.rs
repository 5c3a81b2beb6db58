//! HTTP client for the helpdesk ticket API.
//!
//! Resolves a ticket's closure state via the ticket endpoint, with a search
//! fallback for refs the ticket endpoint no longer knows about. Closure and
//! workflow data live in numbered custom fields, so the field ids are
//! configurable rather than hardcoded.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, COOKIE};
use serde_json::Value;
use thiserror::Error;

use crate::config::HelpdeskConfig;

#[derive(Debug, Error)]
pub enum HelpdeskError {
    #[error("Ticket {0} not found")]
    NotFound(i64),

    #[error("Helpdesk API error ({status}): {message}")]
    Status { status: StatusCode, message: String },

    #[error("Unexpected response shape: {0}")]
    UnexpectedBody(&'static str),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type HelpdeskResult<T> = Result<T, HelpdeskError>;

/// Closure state of a single ticket, as reported by the helpdesk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketStatus {
    /// When the ticket was closed. None while the ticket is still open.
    pub closed_at: Option<DateTime<Utc>>,
    /// Whether the workflow field carries the configured completion marker.
    pub completion_marker_present: bool,
}

pub struct HelpdeskClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    locale_cookie: Option<String>,
    timeout: Duration,
    closure_field: String,
    workflow_field: String,
    completion_marker: Option<String>,
}

impl HelpdeskClient {
    /// Create a client from configuration and a resolved API key.
    pub fn from_config(config: &HelpdeskConfig, client: reqwest::Client, api_key: String) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            locale_cookie: config.locale_cookie.clone().filter(|c| !c.is_empty()),
            timeout: Duration::from_secs(config.timeout_secs),
            closure_field: config.closure_field.clone(),
            workflow_field: config.workflow_field.clone(),
            completion_marker: config.completion_marker.clone(),
        }
    }

    /// Build a request with auth headers and timeout.
    ///
    /// The helpdesk expects the key verbatim in the Authorization header,
    /// without a Bearer prefix.
    fn build_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header(AUTHORIZATION, &self.api_key);

        let request = if let Some(cookie) = &self.locale_cookie {
            request.header(COOKIE, cookie)
        } else {
            request
        };

        request.timeout(self.timeout)
    }

    /// Check a response for error status and extract the error message if so.
    async fn check_response(response: reqwest::Response) -> HelpdeskResult<reqwest::Response> {
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

        Err(HelpdeskError::Status { status, message })
    }

    /// Fetch a ticket and extract its closure state.
    ///
    /// A 404 maps to [`HelpdeskError::NotFound`] so callers can fall back to
    /// [`search_has_ticket`](Self::search_has_ticket) for refs the ticket
    /// endpoint has forgotten.
    pub async fn get_ticket(&self, ticket_ref: i64) -> HelpdeskResult<TicketStatus> {
        let url = format!("{}/api/v2/tickets/{}", self.base_url, ticket_ref);
        let response = self.build_request(self.client.get(&url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(HelpdeskError::NotFound(ticket_ref));
        }

        let response = Self::check_response(response).await?;
        let body: Value = response.json().await?;

        Ok(self.parse_ticket_status(ticket_ref, &body))
    }

    /// Check whether a ticket ref still shows up in helpdesk search.
    ///
    /// Used after a 404: a ref that search still finds is merged or moved
    /// rather than purged, so it should be retried on a later run instead of
    /// being treated as gone.
    ///
    /// Only a well-formed result set with no ticket hits counts as a miss.
    /// A body that does not carry the grouped-results contract is an
    /// [`UnexpectedBody`](HelpdeskError::UnexpectedBody) error, since a miss
    /// feeds the destructive cleanup path.
    pub async fn search_has_ticket(&self, ticket_ref: i64) -> HelpdeskResult<bool> {
        let url = format!(
            "{}/api/v2/search?q={}&types=ticket",
            self.base_url, ticket_ref
        );
        let response = self.build_request(self.client.get(&url)).send().await?;
        let response = Self::check_response(response).await?;
        let body: Value = response.json().await?;

        let groups = body["data"]["grouped_results"].as_array().ok_or(
            HelpdeskError::UnexpectedBody("missing data.grouped_results array"),
        )?;

        for group in groups {
            let group_type = group
                .get("type")
                .ok_or(HelpdeskError::UnexpectedBody("search group without a type"))?;

            if group_type == "ticket" {
                let results = group.get("results").and_then(Value::as_array).ok_or(
                    HelpdeskError::UnexpectedBody("ticket group without a results array"),
                )?;
                return Ok(!results.is_empty());
            }
        }

        Ok(false)
    }

    fn parse_ticket_status(&self, ticket_ref: i64, body: &Value) -> TicketStatus {
        let fields = &body["data"]["fields"];

        let closed_at = fields[&self.closure_field]["value"]
            .as_str()
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| {
                let parsed = parse_closure_datetime(raw);
                if parsed.is_none() {
                    tracing::warn!(
                        ticket_ref = ticket_ref,
                        value = raw,
                        "Unparseable closure date, treating ticket as not closed"
                    );
                }
                parsed
            });

        let completion_marker_present = match &self.completion_marker {
            Some(marker) => workflow_entries(&fields[&self.workflow_field]["detail"])
                .any(|entry| entry["title"] == marker.as_str()),
            None => false,
        };

        TicketStatus {
            closed_at,
            completion_marker_present,
        }
    }
}

/// Iterate the entries of a workflow detail field.
///
/// The helpdesk serializes the detail as an object keyed by entry id, but
/// older exports carry a plain array. Both shapes are accepted.
fn workflow_entries(detail: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
    match detail {
        Value::Object(map) => Box::new(map.values()),
        Value::Array(entries) => Box::new(entries.iter()),
        _ => Box::new(std::iter::empty()),
    }
}

/// Parse a closure timestamp in the helpdesk's `%Y-%m-%dT%H:%M:%S%z` format.
fn parse_closure_datetime(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
