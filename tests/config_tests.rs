// tests/config_tests.rs
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::io::Write;
use std::time::Duration;
use sui_kit::core::config::{ENV_CONFIG_PATH, ENV_FULLNODE_URLS, ENV_NETWORK};
use sui_kit::core::{ConfigError, KitConfig, NetworkType};
use sui_kit::network::EndpointPool;
use sui_kit::tools::BackoffStrategy;

fn clear_env() {
    std::env::remove_var(ENV_CONFIG_PATH);
    std::env::remove_var(ENV_NETWORK);
    std::env::remove_var(ENV_FULLNODE_URLS);
}

const FULL_CONFIG: &str = r#"
network = "mainnet"
fullnode_urls = ["https://a.example:443", "https://b.example:443"]
object_batch_size = 25
coin_page_limit = 100
request_timeout_secs = 10
default_gas_budget = 5000000
default_gas_price = 750

[retry]
base_delay_ms = 500
max_delay_ms = 4000
strategy = "exponential"
"#;

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(FULL_CONFIG.as_bytes()).unwrap();

    let config = KitConfig::from_file(file.path()).unwrap();
    assert_eq!(config.network, NetworkType::Mainnet);
    assert_eq!(config.resolved_fullnode_urls().len(), 2);
    assert_eq!(config.object_batch_size, 25);
    assert_eq!(config.coin_page_limit, Some(100));
    assert_eq!(config.request_timeout(), Duration::from_secs(10));
    assert_eq!(config.default_gas_price, 750);

    let policy = config.retry.to_policy();
    assert_eq!(policy.strategy, BackoffStrategy::Exponential);
    assert_eq!(policy.delay_after(1), Duration::from_millis(500));
    assert_eq!(policy.delay_after(4), Duration::from_millis(4000));

    let pool = EndpointPool::from_config(&config).unwrap();
    assert_eq!(pool.len(), 2);
    assert_eq!(pool.batch_size(), 25);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = KitConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_invalid_retry_bounds() {
    let err =
        KitConfig::from_toml_str("[retry]\nbase_delay_ms = 10\nmax_delay_ms = 5\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_malformed_toml() {
    assert!(matches!(KitConfig::from_toml_str("network = ["), Err(ConfigError::Parse(_))));
}

#[test]
#[serial]
fn test_env_overrides() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(FULL_CONFIG.as_bytes()).unwrap();

    std::env::set_var(ENV_CONFIG_PATH, file.path());
    std::env::set_var(ENV_NETWORK, "testnet");
    std::env::set_var(ENV_FULLNODE_URLS, " http://x:9000 , ,http://y:9000");
    let config = KitConfig::load();
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.network, NetworkType::Testnet);
    assert_eq!(
        config.fullnode_urls,
        vec!["http://x:9000".to_string(), "http://y:9000".to_string()]
    );
    assert_eq!(config.object_batch_size, 25);
}

#[test]
#[serial]
fn test_defaults_without_env() {
    clear_env();
    let config = KitConfig::load().unwrap();
    assert_eq!(config.network, NetworkType::Devnet);
    assert_eq!(
        config.resolved_fullnode_urls(),
        vec!["https://fullnode.devnet.sui.io:443".to_string()]
    );
}

#[test]
#[serial]
fn test_bad_network_env() {
    clear_env();
    std::env::set_var(ENV_NETWORK, "betanet");
    let result = KitConfig::load();
    clear_env();
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}
