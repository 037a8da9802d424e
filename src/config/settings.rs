//! Configuration settings for Cryptoton.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `CRYPTOTON_POLLING__REFRESH_INTERVAL_SECS=5`.
const ENV_PREFIX: &str = "CRYPTOTON";

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upstream API configuration.
    pub api: ApiConfig,
    /// Refresh cadence.
    pub polling: PollingConfig,
    /// Synthetic fallback data.
    pub demo: DemoConfig,
    /// Holdings persistence.
    pub storage: StorageConfig,
    /// Alert and notification settings.
    pub alerts: AlertConfig,
}

impl Config {
    /// Load configuration from file, returning default if file doesn't exist.
    pub fn load_or_default() -> crate::Result<Self> {
        Self::load(None)
    }

    /// Load configuration from file, layered with `CRYPTOTON_*` environment variables.
    pub fn load(path: Option<PathBuf>) -> crate::Result<Self> {
        let config_path = path.unwrap_or_else(Self::default_path);

        let settings = config::Config::builder()
            .add_source(config::File::from(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::Error::config(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| crate::Error::config(e.to_string()))
    }

    /// Save configuration to file.
    pub fn save(&self, path: Option<PathBuf>) -> crate::Result<()> {
        let config_path = path.unwrap_or_else(Self::default_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::config(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    fn default_path() -> PathBuf {
        super::config_dir()
            .map(|p| p.join("config.toml"))
            .unwrap_or_else(|_| PathBuf::from("config.toml"))
    }
}

/// Upstream API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Market data API base URL.
    pub base_url: String,
    /// Quote currency for prices.
    pub vs_currency: String,
    /// Request timeout in seconds. Exceeding it counts as an upstream failure.
    pub timeout_secs: u64,
    /// User agent sent with each request.
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            vs_currency: "usd".to_string(),
            timeout_secs: 10,
            user_agent: concat!("cryptoton/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ApiConfig {
    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Polling cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between scheduled fetches; also the countdown start value.
    pub refresh_interval_secs: u64,
    /// Milliseconds between countdown decrements.
    pub countdown_tick_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 15,
            countdown_tick_ms: 1000,
        }
    }
}

impl PollingConfig {
    /// Fetch interval as a `Duration`.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Countdown tick as a `Duration`.
    pub fn countdown_tick(&self) -> Duration {
        Duration::from_millis(self.countdown_tick_ms)
    }
}

/// Synthetic (demo mode) data configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Seed for the synthetic generator.
    pub seed: u64,
    /// Number of points in each generated sparkline.
    pub sparkline_len: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed_c0de,
            sparkline_len: 20,
        }
    }
}

/// Holdings persistence configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the blob store. Defaults to the platform data dir.
    pub data_dir: Option<PathBuf>,
    /// Key under which the holdings map is stored.
    pub holdings_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            holdings_key: "crypto_holdings".to_string(),
        }
    }
}

impl StorageConfig {
    /// Resolve the blob store directory.
    pub fn resolve_data_dir(&self) -> crate::Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => super::data_dir(),
        }
    }
}

/// Alert configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Maximum notifications kept in the log (0 keeps everything).
    pub max_notifications: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            max_notifications: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("cryptoton-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.polling.refresh_interval(), Duration::from_secs(15));
        assert_eq!(config.polling.countdown_tick(), Duration::from_secs(1));
        assert_eq!(config.storage.holdings_key, "crypto_holdings");
        assert_eq!(config.api.vs_currency, "usd");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load(Some(temp_path("absent.toml"))).unwrap();
        assert_eq!(config.polling, PollingConfig::default());
        assert_eq!(config.demo, DemoConfig::default());
    }

    #[test]
    fn test_save_then_load_partial_override() {
        let path = temp_path("config.toml");
        let mut config = Config::default();
        config.polling.refresh_interval_secs = 30;
        config.alerts.max_notifications = 5;
        config.save(Some(path.clone())).unwrap();

        let loaded = Config::load(Some(path.clone())).unwrap();
        assert_eq!(loaded.polling.refresh_interval_secs, 30);
        assert_eq!(loaded.alerts.max_notifications, 5);
        assert_eq!(loaded.api, ApiConfig::default());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
