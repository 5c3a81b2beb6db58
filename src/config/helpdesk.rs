use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Helpdesk API configuration.
///
/// The sweep reads two endpoints: the ticket detail endpoint, whose
/// per-slot fields map carries the closure date and workflow entries, and
/// the search endpoint used to tell "moved" apart from "gone" when a
/// ticket 404s.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HelpdeskConfig {
    /// Base URL of the helpdesk, e.g. `https://support.example.com`.
    #[serde(default)]
    pub base_url: String,

    /// API key sent as-is in the `Authorization` header.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Name of a secret holding the API key, resolved via `[secrets]`.
    /// `api_key` wins when both are set.
    #[serde(default)]
    pub api_key_secret: Option<String>,

    /// Cookie header value pinning the response locale. Workflow entry
    /// titles compared against `completion_marker` are locale sensitive,
    /// so lookups pin a locale by default. Set an empty string to send no
    /// cookie.
    #[serde(default = "default_locale_cookie")]
    pub locale_cookie: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Field slot holding the closure datetime in the ticket payload.
    #[serde(default = "default_closure_field")]
    pub closure_field: String,

    /// Field slot holding the workflow entries in the ticket payload.
    #[serde(default = "default_workflow_field")]
    pub workflow_field: String,

    /// Workflow entry title that must be present before a closure date is
    /// trusted. Required when `require_completion_marker` is on.
    #[serde(default)]
    pub completion_marker: Option<String>,

    /// Only accept a closure date once the completion marker is present.
    #[serde(default = "default_true")]
    pub require_completion_marker: bool,

    /// Pause after each accepted ticket lookup, in milliseconds. Keeps the
    /// sweep from hammering the helpdesk API.
    #[serde(default = "default_lookup_delay_ms")]
    pub lookup_delay_ms: u64,
}

impl Default for HelpdeskConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            api_key_secret: None,
            locale_cookie: default_locale_cookie(),
            timeout_secs: default_timeout_secs(),
            closure_field: default_closure_field(),
            workflow_field: default_workflow_field(),
            completion_marker: None,
            require_completion_marker: default_true(),
            lookup_delay_ms: default_lookup_delay_ms(),
        }
    }
}

impl HelpdeskConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::Validation(
                "helpdesk.base_url must be set".to_string(),
            ));
        }
        if url::Url::parse(&self.base_url).is_err() {
            return Err(ConfigError::Validation(format!(
                "helpdesk.base_url is not a valid URL: {}",
                self.base_url
            )));
        }
        if self.api_key.is_none() && self.api_key_secret.is_none() {
            return Err(ConfigError::Validation(
                "helpdesk.api_key or helpdesk.api_key_secret must be set".to_string(),
            ));
        }
        if self.require_completion_marker && self.completion_marker.is_none() {
            return Err(ConfigError::Validation(
                "helpdesk.completion_marker must be set when require_completion_marker is on"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

fn default_locale_cookie() -> Option<String> {
    Some("dp_last_lang=en".to_string())
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_closure_field() -> String {
    "180".to_string()
}

fn default_workflow_field() -> String {
    "48".to_string()
}

fn default_lookup_delay_ms() -> u64 {
    300
}

fn default_true() -> bool {
    true
}
