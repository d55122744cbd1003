//! Signature scheme flags as defined by the Sui network.

use crate::core::errors::KeyError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const ED25519_FLAG: u8 = 0x00;
pub const SECP256K1_FLAG: u8 = 0x01;
pub const SECP256R1_FLAG: u8 = 0x02;
pub const MULTISIG_FLAG: u8 = 0x03;
pub const ZKLOGIN_FLAG: u8 = 0x05;
pub const PASSKEY_FLAG: u8 = 0x06;

/// Every supported scheme signs with a 64-byte compact signature.
pub const SIGNATURE_LENGTH: usize = 64;
pub const ED25519_PUBLIC_KEY_LENGTH: usize = 32;
pub const SECP256K1_PUBLIC_KEY_LENGTH: usize = 33;
pub const SECP256R1_PUBLIC_KEY_LENGTH: usize = 33;

/// Schemes a single signer may use. Aggregate schemes (multisig, zkLogin,
/// passkey) are deliberately not representable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureScheme {
    Ed25519,
    Secp256k1,
    Secp256r1,
}

impl SignatureScheme {
    pub const ALL: [SignatureScheme; 3] =
        [SignatureScheme::Ed25519, SignatureScheme::Secp256k1, SignatureScheme::Secp256r1];

    pub fn flag(&self) -> u8 {
        match self {
            SignatureScheme::Ed25519 => ED25519_FLAG,
            SignatureScheme::Secp256k1 => SECP256K1_FLAG,
            SignatureScheme::Secp256r1 => SECP256R1_FLAG,
        }
    }

    pub fn from_flag(flag: u8) -> Result<Self, KeyError> {
        match flag {
            ED25519_FLAG => Ok(SignatureScheme::Ed25519),
            SECP256K1_FLAG => Ok(SignatureScheme::Secp256k1),
            SECP256R1_FLAG => Ok(SignatureScheme::Secp256r1),
            other => Err(KeyError::UnsupportedScheme(other)),
        }
    }

    pub fn public_key_length(&self) -> usize {
        match self {
            SignatureScheme::Ed25519 => ED25519_PUBLIC_KEY_LENGTH,
            SignatureScheme::Secp256k1 => SECP256K1_PUBLIC_KEY_LENGTH,
            SignatureScheme::Secp256r1 => SECP256R1_PUBLIC_KEY_LENGTH,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SignatureScheme::Ed25519 => "ED25519",
            SignatureScheme::Secp256k1 => "Secp256k1",
            SignatureScheme::Secp256r1 => "Secp256r1",
        }
    }
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name of an aggregate / non-simple scheme flag, if `flag` is one.
pub fn aggregate_scheme_name(flag: u8) -> Option<&'static str> {
    match flag {
        MULTISIG_FLAG => Some("MultiSig"),
        ZKLOGIN_FLAG => Some("ZkLogin"),
        PASSKEY_FLAG => Some("Passkey"),
        _ => None,
    }
}
