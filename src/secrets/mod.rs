//! Secrets management for helpdesk and queue API keys.
//!
//! Supports multiple backends:
//! - Environment variables (default for scheduled deployments)
//! - In-memory (for testing, seeded from configuration)

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::SecretsConfig;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type SecretResult<T> = Result<T, SecretError>;

/// Trait for reading secrets (API keys, etc.)
#[async_trait]
pub trait SecretManager: Send + Sync {
    /// Get a secret by key. Returns None if not found.
    async fn get(&self, key: &str) -> SecretResult<Option<String>>;

    /// Check if the secret manager is healthy/connected.
    async fn health_check(&self) -> SecretResult<()> {
        Ok(())
    }
}

/// In-memory secret manager, seeded from the `[secrets]` config section.
pub struct MemorySecretManager {
    secrets: Arc<dashmap::DashMap<String, String>>,
}

impl MemorySecretManager {
    pub fn new() -> Self {
        Self {
            secrets: Arc::new(dashmap::DashMap::new()),
        }
    }

    pub fn with_values(values: HashMap<String, String>) -> Self {
        let secrets = dashmap::DashMap::new();
        for (key, value) in values {
            secrets.insert(key, value);
        }
        Self {
            secrets: Arc::new(secrets),
        }
    }
}

impl Default for MemorySecretManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecretManager for MemorySecretManager {
    async fn get(&self, key: &str) -> SecretResult<Option<String>> {
        Ok(self.secrets.get(key).map(|v| v.value().clone()))
    }
}

/// Environment-based secret manager (reads from env vars)
pub struct EnvSecretManager;

impl EnvSecretManager {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EnvSecretManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecretManager for EnvSecretManager {
    async fn get(&self, key: &str) -> SecretResult<Option<String>> {
        Ok(std::env::var(key).ok())
    }
}

/// Build the secret manager selected by configuration, if any.
pub fn create_secret_manager(config: &SecretsConfig) -> Option<Arc<dyn SecretManager>> {
    match config {
        SecretsConfig::None => None,
        SecretsConfig::Env => Some(Arc::new(EnvSecretManager::new())),
        SecretsConfig::Memory { values } => {
            Some(Arc::new(MemorySecretManager::with_values(values.clone())))
        }
    }
}

/// Resolve an API key from either an inline config value or a named secret.
///
/// An inline key always wins. A named secret that resolves to nothing is an
/// error rather than a silent None, so a misconfigured deployment fails
/// before making any unauthenticated calls.
pub async fn resolve_api_key(
    inline: Option<&str>,
    secret_name: Option<&str>,
    secrets: Option<&Arc<dyn SecretManager>>,
) -> SecretResult<Option<String>> {
    if let Some(key) = inline {
        return Ok(Some(key.to_string()));
    }

    let Some(name) = secret_name else {
        return Ok(None);
    };

    let Some(manager) = secrets else {
        return Err(SecretError::Internal(format!(
            "Secret '{name}' referenced but no secrets backend is configured"
        )));
    };

    match manager.get(name).await? {
        Some(value) => Ok(Some(value)),
        None => Err(SecretError::NotFound(name.to_string())),
    }
}
