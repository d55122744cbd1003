//! 账户管理
//!
//! Holds either a mnemonic (HD mode, accounts can be switched) or a single
//! secret key. Without either, a fresh 24-word mnemonic is generated.

pub mod derivation;
pub mod secret;

pub use derivation::{derive_ed25519_secret, DerivePathParams};
pub use secret::{generate_mnemonic, hex_or_base64_to_bytes, normalize_private_key};

use crate::core::address::SuiAddress;
use crate::core::errors::KeyError;
use crate::crypto::keypair::{Ed25519KeyPair, KeyMaterial};
use secrecy::{ExposeSecret, SecretString};
use tracing::info;
use zeroize::Zeroizing;

pub struct AccountManager {
    mnemonic: Option<SecretString>,
    current: Ed25519KeyPair,
    current_address: SuiAddress,
}

impl AccountManager {
    /// `mnemonic` takes precedence over `secret_key` when both are given.
    pub fn new(mnemonic: Option<&str>, secret_key: Option<&str>) -> Result<Self, KeyError> {
        let mnemonic = mnemonic.map(str::trim).filter(|m| !m.is_empty());
        let secret_key = secret_key.map(str::trim).filter(|s| !s.is_empty());

        match (mnemonic, secret_key) {
            (Some(phrase), _) => Self::from_mnemonic(phrase),
            (None, Some(secret)) => Self::from_secret_key(secret),
            (None, None) => {
                info!("no mnemonic or secret key supplied, generating a 24-word mnemonic");
                let phrase = Zeroizing::new(generate_mnemonic(24)?);
                Self::from_mnemonic(&phrase)
            }
        }
    }

    pub fn from_mnemonic(phrase: &str) -> Result<Self, KeyError> {
        bip39::Mnemonic::parse(phrase).map_err(|e| KeyError::InvalidMnemonic(e.to_string()))?;
        let mnemonic = SecretString::new(phrase.to_string());
        let current = derive_key_pair(&mnemonic, &DerivePathParams::default())?;
        let current_address = current.to_address();
        Ok(Self { mnemonic: Some(mnemonic), current, current_address })
    }

    /// Hex (with or without `0x`) or base64 secret key.
    pub fn from_secret_key(encoded: &str) -> Result<Self, KeyError> {
        let bytes = hex_or_base64_to_bytes(encoded)?;
        let secret = normalize_private_key(&bytes)?;
        let current = Ed25519KeyPair::from_secret_key(&secret[..])?;
        let current_address = current.to_address();
        Ok(Self { mnemonic: None, current, current_address })
    }

    pub fn has_mnemonic(&self) -> bool {
        self.mnemonic.is_some()
    }

    /// The current key pair.
    pub fn current_key_pair(&self) -> &Ed25519KeyPair {
        &self.current
    }

    pub fn current_address(&self) -> SuiAddress {
        self.current_address
    }

    /// Key pair at `params`; without a mnemonic this is always the current
    /// key pair.
    pub fn get_key_pair(
        &self,
        params: Option<&DerivePathParams>,
    ) -> Result<Ed25519KeyPair, KeyError> {
        match (&self.mnemonic, params) {
            (Some(mnemonic), Some(params)) => derive_key_pair(mnemonic, params),
            _ => Ok(self.current.clone()),
        }
    }

    pub fn get_address(&self, params: Option<&DerivePathParams>) -> Result<SuiAddress, KeyError> {
        match (&self.mnemonic, params) {
            (Some(mnemonic), Some(params)) => Ok(derive_key_pair(mnemonic, params)?.to_address()),
            _ => Ok(self.current_address),
        }
    }

    /// Make `params` the current account. No-op in secret-key mode.
    pub fn switch_account(&mut self, params: &DerivePathParams) -> Result<(), KeyError> {
        if let Some(mnemonic) = &self.mnemonic {
            self.current = derive_key_pair(mnemonic, params)?;
            self.current_address = self.current.to_address();
            info!("switched account to {} ({})", self.current_address, params.path());
        }
        Ok(())
    }
}

fn derive_key_pair(
    mnemonic: &SecretString,
    params: &DerivePathParams,
) -> Result<Ed25519KeyPair, KeyError> {
    let parsed = bip39::Mnemonic::parse(mnemonic.expose_secret().as_str())
        .map_err(|e| KeyError::InvalidMnemonic(e.to_string()))?;
    let seed = Zeroizing::new(parsed.to_seed(""));
    let secret = derive_ed25519_secret(&seed[..], &params.path())?;
    Ed25519KeyPair::from_secret_key(&secret[..])
}

impl std::fmt::Debug for AccountManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountManager")
            .field("hd", &self.has_mnemonic())
            .field("current_address", &self.current_address)
            .finish()
    }
}
