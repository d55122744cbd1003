//! BCS layout of a Sui multisig, as accepted by the network.
//!
//! Variant order is part of the wire format and must not change.

use crate::core::errors::PolicyError;
use crate::crypto::keypair::SuiPublicKey;
use crate::crypto::scheme::{SignatureScheme, SIGNATURE_LENGTH};
use crate::tools::serdes::FixedBytes;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressedSignature {
    Ed25519(FixedBytes<64>),
    Secp256k1(FixedBytes<64>),
    Secp256r1(FixedBytes<64>),
    ZkLogin(Vec<u8>),
}

impl CompressedSignature {
    pub fn new(scheme: SignatureScheme, signature: [u8; SIGNATURE_LENGTH]) -> Self {
        match scheme {
            SignatureScheme::Ed25519 => CompressedSignature::Ed25519(FixedBytes(signature)),
            SignatureScheme::Secp256k1 => CompressedSignature::Secp256k1(FixedBytes(signature)),
            SignatureScheme::Secp256r1 => CompressedSignature::Secp256r1(FixedBytes(signature)),
        }
    }

    /// Scheme and raw bytes; zkLogin is refused.
    pub fn to_parts(&self) -> Result<(SignatureScheme, [u8; SIGNATURE_LENGTH]), PolicyError> {
        match self {
            CompressedSignature::Ed25519(sig) => Ok((SignatureScheme::Ed25519, sig.0)),
            CompressedSignature::Secp256k1(sig) => Ok((SignatureScheme::Secp256k1, sig.0)),
            CompressedSignature::Secp256r1(sig) => Ok((SignatureScheme::Secp256r1, sig.0)),
            CompressedSignature::ZkLogin(_) => {
                Err(PolicyError::UnsupportedNestedScheme { scheme: "ZkLogin" })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublicKeyEnum {
    Ed25519(FixedBytes<32>),
    Secp256k1(FixedBytes<33>),
    Secp256r1(FixedBytes<33>),
    ZkLogin(Vec<u8>),
}

impl PublicKeyEnum {
    pub fn to_public_key(&self) -> Result<SuiPublicKey, PolicyError> {
        let key = match self {
            PublicKeyEnum::Ed25519(pk) => {
                SuiPublicKey::new(SignatureScheme::Ed25519, pk.as_bytes())
            }
            PublicKeyEnum::Secp256k1(pk) => {
                SuiPublicKey::new(SignatureScheme::Secp256k1, pk.as_bytes())
            }
            PublicKeyEnum::Secp256r1(pk) => {
                SuiPublicKey::new(SignatureScheme::Secp256r1, pk.as_bytes())
            }
            PublicKeyEnum::ZkLogin(_) => {
                return Err(PolicyError::UnsupportedNestedScheme { scheme: "ZkLogin" })
            }
        };
        key.map_err(|e| PolicyError::Encoding(e.to_string()))
    }
}

impl TryFrom<&SuiPublicKey> for PublicKeyEnum {
    type Error = PolicyError;

    fn try_from(pk: &SuiPublicKey) -> Result<Self, Self::Error> {
        let bad_len = || PolicyError::Encoding(format!("unexpected {} key length", pk.scheme()));
        Ok(match pk.scheme() {
            SignatureScheme::Ed25519 => {
                PublicKeyEnum::Ed25519(FixedBytes::from_slice(pk.as_bytes()).ok_or_else(bad_len)?)
            }
            SignatureScheme::Secp256k1 => {
                PublicKeyEnum::Secp256k1(FixedBytes::from_slice(pk.as_bytes()).ok_or_else(bad_len)?)
            }
            SignatureScheme::Secp256r1 => {
                PublicKeyEnum::Secp256r1(FixedBytes::from_slice(pk.as_bytes()).ok_or_else(bad_len)?)
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSigPublicKeyWire {
    pub pk_map: Vec<(PublicKeyEnum, u8)>,
    pub threshold: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSigWire {
    pub sigs: Vec<CompressedSignature>,
    pub bitmap: u16,
    pub multisig_pk: MultiSigPublicKeyWire,
}

impl MultiSigWire {
    pub fn to_bcs(&self) -> Result<Vec<u8>, PolicyError> {
        bcs::to_bytes(self).map_err(|e| PolicyError::Encoding(e.to_string()))
    }

    pub fn from_bcs(bytes: &[u8]) -> Result<Self, PolicyError> {
        bcs::from_bytes(bytes).map_err(|e| PolicyError::Encoding(e.to_string()))
    }
}

/// Ascending indices of the set bits in `bitmap`.
pub fn bitmap_indices(bitmap: u16) -> Vec<usize> {
    (0..16).filter(|i| bitmap & (1u16 << i) != 0).collect()
}
