use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Work queue configuration.
///
/// Deletion work items are posted to the orchestrator's submission
/// endpoint as they are produced. Enqueues sit outside the run's database
/// transaction, so downstream workers must tolerate duplicate items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    /// Work-item submission endpoint, e.g.
    /// `https://orchestrator.example.com/api/work-items`.
    #[serde(default)]
    pub endpoint: String,

    /// API key sent as-is in the `Authorization` header, if the endpoint
    /// requires one.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Name of a secret holding the API key, resolved via `[secrets]`.
    /// `api_key` wins when both are set.
    #[serde(default)]
    pub api_key_secret: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            api_key_secret: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl QueueConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.is_empty() {
            return Err(ConfigError::Validation(
                "queue.endpoint must be set".to_string(),
            ));
        }
        if url::Url::parse(&self.endpoint).is_err() {
            return Err(ConfigError::Validation(format!(
                "queue.endpoint is not a valid URL: {}",
                self.endpoint
            )));
        }
        Ok(())
    }
}

fn default_timeout_secs() -> u64 {
    30
}
