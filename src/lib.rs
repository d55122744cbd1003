#![allow(clippy::useless_vec)]
#![allow(clippy::empty_line_after_doc_comments)]
#![allow(clippy::needless_return)]
#![allow(clippy::len_zero)]
// src/lib.rs

pub mod account;
pub mod blockchain;
pub mod cli;
pub mod core;
pub mod crypto;
pub mod network;
pub mod service;
pub mod tools;

pub use crate::account::{AccountManager, DerivePathParams};
pub use crate::blockchain::{CoinSelection, CoinSelector, GasParams, SuiRpc, TransactionBuilder};
pub use crate::core::{KitConfig, KitError};
pub use crate::crypto::{KeyMaterial, MultiSigPolicy, PublicKeyWeightPair, SerializedSignature};
pub use crate::network::{EndpointPool, JsonRpcEndpoint};
pub use crate::service::SuiKit;
