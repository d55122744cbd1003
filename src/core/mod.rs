// src/core/mod.rs
pub mod address;
pub mod config;
pub mod errors;

pub use address::{normalize_sui_address, ObjectId, SuiAddress};
pub use config::{KitConfig, NetworkType, RetryConfig};
pub use errors::{
    CoinSelectionError, ConfigError, EndpointPoolError, FundsShortfall, KeyError, KitError,
    PolicyError, RpcError,
};
