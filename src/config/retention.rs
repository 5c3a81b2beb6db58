//! Retention window and sweep behavior.
//!
//! # Example
//!
//! ```toml
//! [retention]
//! window_days = 45
//! dry_run = false
//!
//! [retention.snapshot]
//! mode = "off"
//! path = "resolved_candidates.jsonl"
//! ```

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Retention configuration.
///
/// A ticket is swept once its helpdesk closure date is older than the
/// retention window at the moment the run starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetentionConfig {
    /// Days a ticket must have been closed before it is swept.
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    /// Log what would be enqueued and updated without doing either.
    #[serde(default)]
    pub dry_run: bool,

    /// Snapshot recording and replay of resolved candidates.
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            dry_run: false,
            snapshot: SnapshotConfig::default(),
        }
    }
}

impl RetentionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_days == 0 {
            return Err(ConfigError::Validation(
                "retention.window_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Snapshot configuration.
///
/// Recording writes each candidate's resolved closure to a JSON-lines
/// file after the helpdesk pass; replay loads that file instead of
/// calling the helpdesk at all. Meant for developing against a large
/// candidate set without re-resolving it on every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotConfig {
    #[serde(default)]
    pub mode: SnapshotMode,

    /// Path of the JSON-lines snapshot file.
    #[serde(default = "default_snapshot_path")]
    pub path: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            mode: SnapshotMode::default(),
            path: default_snapshot_path(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotMode {
    #[default]
    Off,
    Record,
    Replay,
}

impl SnapshotMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotMode::Off => "off",
            SnapshotMode::Record => "record",
            SnapshotMode::Replay => "replay",
        }
    }
}

fn default_window_days() -> u32 {
    45
}

fn default_snapshot_path() -> String {
    "resolved_candidates.jsonl".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RetentionConfig::default();
        assert_eq!(config.window_days, 45);
        assert!(!config.dry_run);
        assert_eq!(config.snapshot.mode, SnapshotMode::Off);
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: RetentionConfig = toml::from_str("").unwrap();
        assert_eq!(config.window_days, 45);
    }

    #[test]
    fn test_parse_full_config() {
        let config: RetentionConfig = toml::from_str(
            r#"
            window_days = 90
            dry_run = true

            [snapshot]
            mode = "record"
            path = "/tmp/candidates.jsonl"
            "#,
        )
        .unwrap();
        assert_eq!(config.window_days, 90);
        assert!(config.dry_run);
        assert_eq!(config.snapshot.mode, SnapshotMode::Record);
        assert_eq!(config.snapshot.path, "/tmp/candidates.jsonl");
    }

    #[test]
    fn test_zero_window_rejected() {
        let config: RetentionConfig = toml::from_str("window_days = 0").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("window_days"));
    }
}
