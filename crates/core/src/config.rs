//! Xentral API configuration with runtime credential updates.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use url::Url;

pub const ENV_API_URL: &str = "XENTRAL_API_URL";
pub const ENV_API_KEY: &str = "XENTRAL_API_KEY";

const DEFAULT_API_URL: &str = "https://api.xentral.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Credentials and connection settings for the upstream Xentral instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XentralConfig {
    #[serde(default = "default_api_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    /// Per-request timeout for upstream calls. No automatic retries.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for XentralConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl XentralConfig {
    /// Load from environment variables, honoring a `.env` file when present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            base_url: std::env::var(ENV_API_URL).unwrap_or_else(|_| default_api_url()),
            api_key: std::env::var(ENV_API_KEY).unwrap_or_default(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Apply environment variables on top of file-provided values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(ENV_API_URL) {
            self.base_url = url;
        }
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            self.api_key = key;
        }
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.api_key.is_empty()
    }

    /// Validation problems with the current settings, empty when usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        match Url::parse(&self.base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(format!(
                "{ENV_API_URL} must use http or https, got {}",
                url.scheme()
            )),
            Err(e) => errors.push(format!("{ENV_API_URL} is not a valid URL: {e}")),
        }

        if self.api_key.is_empty() {
            errors.push(format!("{ENV_API_KEY} is required"));
        } else if self.api_key.len() < 10 {
            errors.push(format!("{ENV_API_KEY} appears to be too short"));
        }

        errors
    }

    /// API key with all but a short prefix hidden, for /info and logs.
    pub fn masked_key(&self) -> String {
        if self.api_key.is_empty() {
            "not_configured".to_string()
        } else {
            "*".repeat(self.api_key.len().min(8))
        }
    }

    /// Base URL without a trailing slash, ready for endpoint joining.
    pub fn base_url_trimmed(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Shared handle to the active configuration.
///
/// Readers take a cheap `Arc` snapshot; the only mutation path is
/// [`SharedConfig::update_credentials`], which validates and then swaps the
/// whole config. A request that snapshotted before a swap keeps the old
/// credentials for its remaining lifetime.
#[derive(Clone)]
pub struct SharedConfig {
    inner: Arc<RwLock<Arc<XentralConfig>>>,
}

impl SharedConfig {
    pub fn new(config: XentralConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    pub fn snapshot(&self) -> Arc<XentralConfig> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replace the API credentials at runtime. Fails without touching the
    /// active config when the replacement does not validate.
    pub fn update_credentials(&self, base_url: &str, api_key: &str) -> Result<()> {
        let current = self.snapshot();
        let candidate = XentralConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout_secs: current.timeout_secs,
        };

        let errors = candidate.validate();
        if !errors.is_empty() {
            anyhow::bail!("invalid credentials: {}", errors.join("; "));
        }

        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(candidate);

        tracing::info!("Xentral API credentials updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> XentralConfig {
        XentralConfig {
            base_url: "https://erp.example.com".to_string(),
            api_key: "0123456789abcdef".to_string(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn default_config_fails_validation_without_key() {
        let config = XentralConfig::default();
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains(ENV_API_KEY));
    }

    #[test]
    fn validate_rejects_non_http_url() {
        let config = XentralConfig {
            base_url: "ftp://erp.example.com".to_string(),
            ..configured()
        };
        assert!(!config.validate().is_empty());
    }

    #[test]
    fn validate_rejects_short_key() {
        let config = XentralConfig {
            api_key: "short".to_string(),
            ..configured()
        };
        assert_eq!(config.validate().len(), 1);
    }

    #[test]
    fn masked_key_hides_the_secret() {
        let config = configured();
        assert!(!config.masked_key().contains("0123"));
        assert_eq!(XentralConfig::default().masked_key(), "not_configured");
    }

    #[test]
    fn update_swaps_atomically_and_trims_slash() {
        let shared = SharedConfig::new(configured());
        let before = shared.snapshot();

        shared
            .update_credentials("https://other.example.com/", "fedcba9876543210")
            .unwrap();

        let after = shared.snapshot();
        assert_eq!(after.base_url, "https://other.example.com");
        assert_eq!(after.api_key, "fedcba9876543210");
        // The old snapshot is untouched by the swap.
        assert_eq!(before.base_url, "https://erp.example.com");
    }

    #[test]
    fn update_rejects_bad_credentials_and_keeps_current() {
        let shared = SharedConfig::new(configured());
        assert!(shared.update_credentials("not a url", "key").is_err());
        assert_eq!(shared.snapshot().base_url, "https://erp.example.com");
    }
}
