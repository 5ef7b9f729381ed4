use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Built dashboard bundle served for non-API paths
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            api_port: default_api_port(),
            data_dir: default_data_dir(),
            static_dir: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Settings for the admin console commands
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    /// Base URL of a running dispatchr server
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Rows per page in the people table (default: 8)
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// How long success banners stay visible, in seconds (default: 3)
    #[serde(default = "default_alert_timeout_secs")]
    pub alert_timeout_secs: u64,
    /// Let archived assignments give their driver back to the available pool
    #[serde(default)]
    pub release_archived_drivers: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            page_size: default_page_size(),
            alert_timeout_secs: default_alert_timeout_secs(),
            release_archived_drivers: false,
        }
    }
}

impl ConsoleConfig {
    pub fn alert_timeout(&self) -> Duration {
        Duration::from_secs(self.alert_timeout_secs)
    }
}

fn default_api_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_page_size() -> usize {
    8
}

fn default_alert_timeout_secs() -> u64 {
    3
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).with_context(|| "Failed to parse configuration file")?;
        if config.console.page_size == 0 {
            anyhow::bail!("console.page_size must be at least 1");
        }
        Ok(config)
    }
}
