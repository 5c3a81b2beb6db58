//! Secrets manager configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Configuration for the secrets manager.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SecretsConfig {
    /// No secrets manager. API keys must be inline in the config file
    /// (possibly via `${VAR}` expansion).
    #[default]
    None,

    /// Environment variable-based secrets.
    /// Keys are looked up directly as environment variable names.
    Env,

    /// In-memory secrets seeded from the config file. Testing only.
    Memory {
        #[serde(default)]
        values: HashMap<String, String>,
    },
}

impl SecretsConfig {
    pub fn is_none(&self) -> bool {
        matches!(self, SecretsConfig::None)
    }
}
