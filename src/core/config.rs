use crate::core::errors::ConfigError;
use crate::tools::async_support::{BackoffStrategy, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

pub const ENV_CONFIG_PATH: &str = "SUI_KIT_CONFIG";
pub const ENV_NETWORK: &str = "SUI_KIT_NETWORK";
pub const ENV_FULLNODE_URLS: &str = "SUI_KIT_FULLNODE_URLS";

/// Sui network selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Mainnet,
    Testnet,
    #[default]
    Devnet,
    Localnet,
}

impl NetworkType {
    /// Public fullnode of the network
    pub fn default_fullnode_url(&self) -> String {
        match self {
            NetworkType::Localnet => "http://127.0.0.1:9000".to_string(),
            other => format!("https://fullnode.{}.sui.io:443", other.as_str()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Mainnet => "mainnet",
            NetworkType::Testnet => "testnet",
            NetworkType::Devnet => "devnet",
            NetworkType::Localnet => "localnet",
        }
    }
}

impl FromStr for NetworkType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(NetworkType::Mainnet),
            "testnet" => Ok(NetworkType::Testnet),
            "devnet" => Ok(NetworkType::Devnet),
            "localnet" => Ok(NetworkType::Localnet),
            other => Err(ConfigError::Invalid(format!("unknown network '{}'", other))),
        }
    }
}

/// Backoff between endpoint attempts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Delay before the second attempt (milliseconds)
    #[serde(default = "RetryConfig::default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound for exponential backoff (milliseconds)
    #[serde(default = "RetryConfig::default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default)]
    pub strategy: BackoffStrategy,
}

impl RetryConfig {
    fn default_base_delay_ms() -> u64 { 2_000 }
    fn default_max_delay_ms() -> u64 { 30_000 }

    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            strategy: self.strategy,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: Self::default_base_delay_ms(),
            max_delay_ms: Self::default_max_delay_ms(),
            strategy: BackoffStrategy::default(),
        }
    }
}

/// Toolkit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitConfig {
    #[serde(default)]
    pub network: NetworkType,

    /// Fullnode RPC urls, tried in order. Empty means the network default.
    #[serde(default)]
    pub fullnode_urls: Vec<String>,

    #[serde(default)]
    pub retry: RetryConfig,

    /// Max object ids per `sui_multiGetObjects` request
    #[serde(default = "KitConfig::default_object_batch_size")]
    pub object_batch_size: usize,

    /// Page size passed to `suix_getCoins`; node default when unset
    #[serde(default)]
    pub coin_page_limit: Option<u32>,

    /// HTTP request timeout (seconds)
    #[serde(default = "KitConfig::default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "KitConfig::default_gas_budget")]
    pub default_gas_budget: u64,

    #[serde(default = "KitConfig::default_gas_price")]
    pub default_gas_price: u64,
}

impl KitConfig {
    fn default_object_batch_size() -> usize { 50 }
    fn default_request_timeout_secs() -> u64 { 30 }
    fn default_gas_budget() -> u64 { 100_000_000 }
    fn default_gas_price() -> u64 { 1_000 }

    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: KitConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Load from `SUI_KIT_CONFIG` (if set), then apply env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(ENV_CONFIG_PATH) {
            Ok(path) if !path.trim().is_empty() => {
                debug!("loading config from {}", path);
                Self::from_file(path.trim())?
            }
            _ => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(network) = std::env::var(ENV_NETWORK) {
            if !network.trim().is_empty() {
                self.network = network.parse()?;
            }
        }
        if let Ok(urls) = std::env::var(ENV_FULLNODE_URLS) {
            let urls: Vec<String> = urls
                .split(',')
                .map(|u| u.trim())
                .filter(|u| !u.is_empty())
                .map(str::to_string)
                .collect();
            if !urls.is_empty() {
                self.fullnode_urls = urls;
            }
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.object_batch_size == 0 {
            return Err(ConfigError::Invalid("object_batch_size must be at least 1".into()));
        }
        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            return Err(ConfigError::Invalid(
                "retry.max_delay_ms must not be below retry.base_delay_ms".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    /// Configured urls, or the network's public fullnode.
    pub fn resolved_fullnode_urls(&self) -> Vec<String> {
        if self.fullnode_urls.is_empty() {
            vec![self.network.default_fullnode_url()]
        } else {
            self.fullnode_urls.clone()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for KitConfig {
    fn default() -> Self {
        Self {
            network: NetworkType::default(),
            fullnode_urls: Vec::new(),
            retry: RetryConfig::default(),
            object_batch_size: Self::default_object_batch_size(),
            coin_page_limit: None,
            request_timeout_secs: Self::default_request_timeout_secs(),
            default_gas_budget: Self::default_gas_budget(),
            default_gas_price: Self::default_gas_price(),
        }
    }
}
