use crate::core::errors::KeyError;
use crate::crypto::hash::blake2b256_concat;
use crate::crypto::keypair::SuiPublicKey;
use crate::crypto::scheme::{SignatureScheme, SIGNATURE_LENGTH};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Intent prefix for transaction data: scope TransactionData, version V0,
/// app id Sui.
pub const TRANSACTION_INTENT: [u8; 3] = [0, 0, 0];

/// `intent || tx_bytes`
pub fn intent_message(tx_bytes: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(TRANSACTION_INTENT.len() + tx_bytes.len());
    message.extend_from_slice(&TRANSACTION_INTENT);
    message.extend_from_slice(tx_bytes);
    message
}

/// Digest that single signers sign over.
pub fn transaction_digest(tx_bytes: &[u8]) -> [u8; 32] {
    blake2b256_concat(&[&TRANSACTION_INTENT, tx_bytes])
}

/// A signature in Sui's serialized form, submitted as base64.
///
/// Single-signer signatures are `flag || signature || public key`; a
/// combined multisig is `0x03 || bcs(MultiSig)`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SerializedSignature(Vec<u8>);

impl SerializedSignature {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn from_parts(public_key: &SuiPublicKey, signature: &[u8; SIGNATURE_LENGTH]) -> Self {
        let mut bytes = Vec::with_capacity(1 + SIGNATURE_LENGTH + public_key.as_bytes().len());
        bytes.push(public_key.flag());
        bytes.extend_from_slice(signature);
        bytes.extend_from_slice(public_key.as_bytes());
        Self(bytes)
    }

    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        BASE64
            .decode(encoded.trim())
            .map(Self)
            .map_err(|e| KeyError::InvalidEncoding(format!("invalid base64 signature: {}", e)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.0)
    }

    pub fn flag(&self) -> Option<u8> {
        self.0.first().copied()
    }
}

impl AsRef<[u8]> for SerializedSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for SerializedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl fmt::Debug for SerializedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SerializedSignature({})", self.to_base64())
    }
}

impl Serialize for SerializedSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for SerializedSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        SerializedSignature::from_base64(&s).map_err(serde::de::Error::custom)
    }
}

/// A parsed single-signer signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParts {
    pub scheme: SignatureScheme,
    pub signature: [u8; SIGNATURE_LENGTH],
    pub public_key: SuiPublicKey,
}

/// Split `flag || signature || public key`. Only the three simple schemes are
/// accepted; the trailing key length must match the scheme exactly.
pub fn split_signature(bytes: &[u8]) -> Result<SignatureParts, KeyError> {
    let (flag, rest) = bytes
        .split_first()
        .ok_or_else(|| KeyError::InvalidEncoding("empty signature".to_string()))?;
    let scheme = SignatureScheme::from_flag(*flag)?;
    let expected = SIGNATURE_LENGTH + scheme.public_key_length();
    if rest.len() != expected {
        return Err(KeyError::InvalidEncoding(format!(
            "{} signature must be {} bytes after the flag, got {}",
            scheme,
            expected,
            rest.len()
        )));
    }
    let (sig, pk) = rest.split_at(SIGNATURE_LENGTH);
    let mut signature = [0u8; SIGNATURE_LENGTH];
    signature.copy_from_slice(sig);
    Ok(SignatureParts { scheme, signature, public_key: SuiPublicKey::new(scheme, pk)? })
}

/// Check a single-signer transaction signature against its embedded key.
pub fn verify_transaction_signature(
    tx_bytes: &[u8],
    signature: &SerializedSignature,
) -> Result<SuiPublicKey, KeyError> {
    let parts = split_signature(signature.as_bytes())?;
    parts.public_key.verify(&transaction_digest(tx_bytes), &parts.signature)?;
    Ok(parts.public_key)
}
