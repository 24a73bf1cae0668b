//! Sync configuration.
//!
//! Loaded from a JSON file:
//!
//! ```json
//! {
//!   "server_url": "https://dsu.example.org/dsu",
//!   "client_id": "ohmage-cli",
//!   "client_secret": "secret",
//!   "batch_size": 50
//! }
//! ```

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SOURCE_NAME: &str = "ohmage";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Base URL of the data storage unit (DSU).
    pub server_url: String,
    /// OAuth client credentials used for token refresh.
    pub client_id: String,
    pub client_secret: String,
    /// Records uploaded per buffer read.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// `source_name` written into each data point's provenance.
    #[serde(default = "default_source_name")]
    pub source_name: String,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_source_name() -> String {
    DEFAULT_SOURCE_NAME.to_string()
}

impl SyncConfig {
    pub fn new(
        server_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            source_name: default_source_name(),
        }
    }

    /// Read and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "server_url must be an http(s) URL, got '{}'",
                self.server_url
            )));
        }
        if self.batch_size == 0 {
            return Err(AppError::Config("batch_size must be at least 1".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::Config("timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Absolute URL of an endpoint below `server_url`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.server_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_optional_fields() {
        let config: SyncConfig = serde_json::from_str(
            r#"{"server_url":"https://dsu.test","client_id":"id","client_secret":"s"}"#,
        )
        .expect("parse");
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.source_name, "ohmage");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = SyncConfig::new("ftp://dsu.test", "id", "s");
        assert!(config.validate().is_err());

        config.server_url = "https://dsu.test".to_string();
        config.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn endpoint_joins_slashes() {
        let config = SyncConfig::new("https://dsu.test/dsu/", "id", "s");
        assert_eq!(config.endpoint("/dataPoints"), "https://dsu.test/dsu/dataPoints");
        assert_eq!(config.endpoint("oauth/token"), "https://dsu.test/dsu/oauth/token");
    }
}
