use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use xentral_mcp::{builtin_registry, Dispatcher, SharedRegistry};
use xentral_mcp_core::{SharedConfig, XentralApi, XentralClient, XentralConfig};

pub const SERVER_NAME: &str = "xentral-mcp-server";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub xentral: XentralConfig,
}

impl ServerConfig {
    /// Load from a TOML file when present, then apply environment overrides
    /// (`XENTRAL_API_URL`, `XENTRAL_API_KEY`) on top.
    pub fn load(config_path: &Path) -> Result<Self> {
        let mut config: Self = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .context("Failed to read configuration file")?;
            toml::from_str(&content).context("Failed to parse configuration file")?
        } else {
            tracing::info!("Configuration file not found, using defaults");
            Self::default()
        };

        config.xentral = config.xentral.with_env_overrides();
        Ok(config)
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: SharedConfig,
    pub api: Arc<dyn XentralApi>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(xentral: XentralConfig) -> Self {
        let config = SharedConfig::new(xentral);
        let api: Arc<dyn XentralApi> = Arc::new(XentralClient::new(config.clone()));
        let registry = SharedRegistry::new(builtin_registry(api.clone()));
        let dispatcher = Arc::new(Dispatcher::new(
            SERVER_NAME,
            env!("CARGO_PKG_VERSION"),
            registry,
        ));

        Self {
            config,
            api,
            dispatcher,
        }
    }

    /// Rebuild the registration table and swap it in atomically. Requests
    /// already dispatched keep the registry they resolved against.
    pub fn reload_registry(&self) -> usize {
        let registry = builtin_registry(self.api.clone());
        let count = registry.len();
        self.dispatcher.registry().swap(registry);
        count
    }
}
