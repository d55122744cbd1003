//! Error taxonomy for the toolkit.
//!
//! Each subsystem has its own enum so callers can match on the failure that
//! matters to them; `KitError` wraps them all for the composition root.

use std::fmt;
use thiserror::Error;

/// Failures while building a multisig policy or aggregating / decoding
/// multisig signatures. Never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("multisig policy needs at least one signer")]
    NoSigners,

    #[error("max number of signers in a multisig is {max}, got {actual}")]
    TooManySigners { max: usize, actual: usize },

    #[error("threshold {threshold} is unreachable: total weight is {total_weight}")]
    ThresholdUnreachable { threshold: u16, total_weight: u32 },

    #[error("threshold must be at least 1")]
    ZeroThreshold,

    #[error("weight of signer {index} must be at least 1")]
    ZeroWeight { index: usize },

    #[error("{keys} public keys supplied with {weights} weights")]
    WeightCountMismatch { keys: usize, weights: usize },

    #[error("invalid public key at index {index}: {reason}")]
    InvalidPublicKey { index: usize, reason: String },

    #[error("public key at index {index} duplicates the key at index {first}")]
    DuplicatePublicKey { index: usize, first: usize },

    #[error("signature from public key {public_key} does not belong to the policy")]
    UnknownSigner { public_key: String },

    #[error("signer at index {index} contributed more than one signature")]
    DuplicateSigner { index: usize },

    #[error("{scheme} signatures are not supported inside a multisig")]
    UnsupportedNestedScheme { scheme: &'static str },

    #[error("invalid multisig flag: {}", describe_flag(*.found))]
    BadFlag { found: Option<u8> },

    #[error("invalid bitmap {bitmap:#06x}: {reason}")]
    InvalidBitmap { bitmap: u16, reason: String },

    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("multisig encoding error: {0}")]
    Encoding(String),
}

fn describe_flag(found: Option<u8>) -> String {
    match found {
        Some(flag) => format!("expected 0x03, got {:#04x}", flag),
        None => "empty signature".to_string(),
    }
}

/// Key parsing, derivation and signing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("invalid {scheme} public key length: expected {expected}, got {actual}")]
    InvalidPublicKeyLength { scheme: &'static str, expected: usize, actual: usize },

    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("invalid derivation path: {0}")]
    InvalidDerivationPath(String),

    #[error("unsupported signature scheme flag {0:#04x}")]
    UnsupportedScheme(u8),

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),
}

/// Failure reported by a single RPC endpoint.
///
/// The variant decides what the failover loop does next: `Retryable` moves on
/// to the next endpoint, `Rejected` aborts, `UnknownOutcome` aborts and must
/// never be resubmitted blindly because the request may already have reached
/// the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    #[error("endpoint {endpoint} unavailable: {message}")]
    Retryable { endpoint: String, message: String },

    #[error("endpoint {endpoint} rejected the request: {message}")]
    Rejected { endpoint: String, message: String },

    #[error("outcome unknown at endpoint {endpoint}: {message}")]
    UnknownOutcome { endpoint: String, message: String },
}

impl RpcError {
    pub fn retryable(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Retryable { endpoint: endpoint.into(), message: message.into() }
    }

    pub fn rejected(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected { endpoint: endpoint.into(), message: message.into() }
    }

    pub fn unknown_outcome(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnknownOutcome { endpoint: endpoint.into(), message: message.into() }
    }

    /// Only failures known to have left no state change behind may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RpcError::Retryable { .. })
    }

    pub fn endpoint(&self) -> &str {
        match self {
            RpcError::Retryable { endpoint, .. }
            | RpcError::Rejected { endpoint, .. }
            | RpcError::UnknownOutcome { endpoint, .. } => endpoint,
        }
    }
}

/// Failures of an operation executed against the whole endpoint pool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointPoolError {
    #[error("endpoint pool needs at least one endpoint")]
    NoEndpoints,

    #[error("{operation} failed on all {attempts} endpoints; last error: {last}")]
    AllEndpointsFailed {
        operation: String,
        attempts: usize,
        #[source]
        last: RpcError,
    },

    #[error("{operation} rejected: {source}")]
    Rejected {
        operation: String,
        #[source]
        source: RpcError,
    },

    #[error("{operation} has an unknown outcome and was not retried: {source}")]
    UnknownOutcome {
        operation: String,
        #[source]
        source: RpcError,
    },
}

impl EndpointPoolError {
    /// The last transport error, when the failure came from an endpoint.
    pub fn rpc_error(&self) -> Option<&RpcError> {
        match self {
            EndpointPoolError::NoEndpoints => None,
            EndpointPoolError::AllEndpointsFailed { last, .. } => Some(last),
            EndpointPoolError::Rejected { source, .. }
            | EndpointPoolError::UnknownOutcome { source, .. } => Some(source),
        }
    }
}

/// Why a coin selection came up short.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FundsShortfall {
    /// The owner holds no coin of this type with a positive balance.
    NoSpendableCoins,
    /// Coins exist but their total is below the requested amount.
    BelowTarget { available: u128, required: u64 },
}

impl fmt::Display for FundsShortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FundsShortfall::NoSpendableCoins => write!(f, "no spendable coins found"),
            FundsShortfall::BelowTarget { available, required } => {
                write!(f, "need {}, only {} available", required, available)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoinSelectionError {
    #[error("insufficient funds of {coin_type} for {owner}: {shortfall}")]
    InsufficientFunds { owner: String, coin_type: String, shortfall: FundsShortfall },

    #[error("failed to fetch coin page: {0}")]
    Fetch(#[from] EndpointPoolError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Umbrella error for the composition root and the binary.
#[derive(Debug, Error)]
pub enum KitError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    CoinSelection(#[from] CoinSelectionError),

    #[error(transparent)]
    EndpointPool(#[from] EndpointPoolError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("transaction builder error: {0}")]
    Builder(String),

    #[error("object error: {0}")]
    Object(String),
}

impl KitError {
    /// A submission whose fate is unknown; resubmitting may double-spend.
    pub fn is_unknown_outcome(&self) -> bool {
        matches!(self, KitError::EndpointPool(EndpointPoolError::UnknownOutcome { .. }))
    }
}
