//! SLIP-0010 ed25519 密钥推导
//!
//! Sui derives ed25519 keys along `m/44'/784'/{account}'/{change}'/{address}'`.
//! ed25519 only supports hardened children, so every level is hardened.

use crate::core::errors::KeyError;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use tracing::debug;
use zeroize::Zeroizing;

type HmacSha512 = Hmac<Sha512>;

pub const SUI_COIN_TYPE: u32 = 784;
const HARDENED_OFFSET: u32 = 0x8000_0000;
const ED25519_CURVE_SEED: &[u8] = b"ed25519 seed";

/// Account selection inside a mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DerivePathParams {
    pub account_index: u32,
    pub is_external: bool,
    pub address_index: u32,
}

impl DerivePathParams {
    pub fn account(account_index: u32) -> Self {
        Self { account_index, ..Self::default() }
    }

    /// `m/44'/784'/{account}'/{0|1}'/{address}'`
    pub fn path(&self) -> String {
        format!(
            "m/44'/{}'/{}'/{}'/{}'",
            SUI_COIN_TYPE,
            self.account_index,
            u32::from(self.is_external),
            self.address_index
        )
    }
}

/// Parse a fully hardened path such as `m/44'/784'/0'/0'/0'`.
pub fn parse_hardened_path(path: &str) -> Result<Vec<u32>, KeyError> {
    let mut segments = path.trim().split('/');
    if segments.next() != Some("m") {
        return Err(KeyError::InvalidDerivationPath(format!("'{}' must start with m/", path)));
    }
    segments
        .map(|segment| {
            let index = segment.strip_suffix('\'').ok_or_else(|| {
                KeyError::InvalidDerivationPath(format!(
                    "segment '{}' of '{}' is not hardened",
                    segment, path
                ))
            })?;
            let index: u32 = index.parse().map_err(|_| {
                KeyError::InvalidDerivationPath(format!("bad segment '{}' in '{}'", segment, path))
            })?;
            if index >= HARDENED_OFFSET {
                return Err(KeyError::InvalidDerivationPath(format!(
                    "segment '{}' of '{}' is out of range",
                    segment, path
                )));
            }
            Ok(index)
        })
        .collect()
}

fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Result<Zeroizing<[u8; 64]>, KeyError> {
    let mut mac = HmacSha512::new_from_slice(key)
        .map_err(|e| KeyError::InvalidDerivationPath(format!("hmac init failed: {}", e)))?;
    for part in parts {
        mac.update(part);
    }
    let mut out = Zeroizing::new([0u8; 64]);
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

/// Derive the 32-byte ed25519 secret key at `path` from a BIP-39 seed.
pub fn derive_ed25519_secret(seed: &[u8], path: &str) -> Result<Zeroizing<[u8; 32]>, KeyError> {
    let indices = parse_hardened_path(path)?;
    debug!("deriving ed25519 key at {}", path);

    let master = hmac_sha512(ED25519_CURVE_SEED, &[seed])?;
    let mut key = Zeroizing::new([0u8; 32]);
    let mut chain_code = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(&master[..32]);
    chain_code.copy_from_slice(&master[32..]);

    for index in indices {
        let hardened = (index | HARDENED_OFFSET).to_be_bytes();
        let child = hmac_sha512(&chain_code[..], &[&[0u8][..], &key[..], &hardened[..]])?;
        key.copy_from_slice(&child[..32]);
        chain_code.copy_from_slice(&child[32..]);
    }
    Ok(key)
}
