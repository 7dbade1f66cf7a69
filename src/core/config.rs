use crate::core::catalog::Product;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
}

impl ServerConfig {
    fn default_host() -> String {
        "127.0.0.1".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RatesConfig {
    #[serde(default = "RatesConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "RatesConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "RatesConfig::default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "RatesConfig::default_retries")]
    pub retries: usize,
}

impl RatesConfig {
    fn default_base_url() -> String {
        "https://www.cnb.cz".to_string()
    }

    fn default_timeout_secs() -> u64 {
        8
    }

    fn default_ttl_secs() -> u64 {
        600
    }

    fn default_retries() -> usize {
        1
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for RatesConfig {
    fn default() -> Self {
        RatesConfig {
            base_url: Self::default_base_url(),
            timeout_secs: Self::default_timeout_secs(),
            ttl_secs: Self::default_ttl_secs(),
            retries: Self::default_retries(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub rates: RatesConfig,
    /// Replaces the built-in catalog when present.
    #[serde(default)]
    pub products: Option<Vec<Product>>,
}

impl AppConfig {
    /// Loads the config from the default location, falling back to defaults
    /// when no file has been set up yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("cz", "cartquote", "cartquote")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
server:
  host: "0.0.0.0"
  port: 9000
rates:
  base_url: "http://example.com/cnb"
  timeout_secs: 3
products:
  - id: 10
    name: "Čaj"
    price: 89.5
  - id: 11
    name: "Konvice"
    price: 650
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.server.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.rates.base_url, "http://example.com/cnb");
        assert_eq!(config.rates.timeout(), Duration::from_secs(3));
        assert_eq!(config.rates.ttl(), Duration::from_secs(600));
        assert_eq!(config.rates.retries, 1);

        let products = config.products.expect("products should be set");
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Čaj");
        assert_eq!(products[0].unit_price_czk, dec!(89.5));
        assert_eq!(products[1].unit_price_czk, dec!(650));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.server.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.rates.base_url, "https://www.cnb.cz");
        assert_eq!(config.rates.timeout(), Duration::from_secs(8));
        assert_eq!(config.rates.ttl(), Duration::from_secs(600));
        assert!(config.products.is_none());
    }

    #[test]
    fn test_load_from_path_reports_parse_errors() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), "server: [not, a, map]").unwrap();

        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
