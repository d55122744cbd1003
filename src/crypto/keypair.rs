//! Public keys and signing key pairs for the three simple Sui schemes.

use crate::core::address::SuiAddress;
use crate::core::errors::KeyError;
use crate::crypto::hash::blake2b256_concat;
use crate::crypto::scheme::{SignatureScheme, ED25519_FLAG, SIGNATURE_LENGTH};
use crate::crypto::signature_utils::{transaction_digest, SerializedSignature};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::rngs::OsRng;
use std::fmt;

/// Raw public key bytes tagged with their scheme. The length always matches
/// the scheme.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SuiPublicKey {
    scheme: SignatureScheme,
    bytes: Vec<u8>,
}

impl SuiPublicKey {
    pub fn new(scheme: SignatureScheme, bytes: &[u8]) -> Result<Self, KeyError> {
        let expected = scheme.public_key_length();
        if bytes.len() != expected {
            return Err(KeyError::InvalidPublicKeyLength {
                scheme: scheme.name(),
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self { scheme, bytes: bytes.to_vec() })
    }

    /// Parse `flag || raw public key`.
    pub fn from_sui_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let (flag, raw) = bytes
            .split_first()
            .ok_or_else(|| KeyError::InvalidEncoding("empty public key".to_string()))?;
        Self::new(SignatureScheme::from_flag(*flag)?, raw)
    }

    /// Parse the base64 `flag || raw` form used by the Sui CLI keystore.
    pub fn from_sui_public_key(encoded: &str) -> Result<Self, KeyError> {
        let bytes = decode_base64(encoded)?;
        Self::from_sui_bytes(&bytes)
    }

    /// Base64 ed25519 public key: 32 raw bytes, or 33 with a leading 0x00 flag.
    pub fn ed25519_from_base64(encoded: &str) -> Result<Self, KeyError> {
        let bytes = decode_base64(encoded)?;
        match bytes.len() {
            32 => Self::new(SignatureScheme::Ed25519, &bytes),
            33 if bytes[0] == ED25519_FLAG => Self::new(SignatureScheme::Ed25519, &bytes[1..]),
            actual => Err(KeyError::InvalidPublicKeyLength {
                scheme: SignatureScheme::Ed25519.name(),
                expected: 32,
                actual,
            }),
        }
    }

    pub fn scheme(&self) -> SignatureScheme {
        self.scheme
    }

    pub fn flag(&self) -> u8 {
        self.scheme.flag()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_raw_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// `flag || raw public key`
    pub fn to_sui_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.bytes.len());
        out.push(self.flag());
        out.extend_from_slice(&self.bytes);
        out
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    pub fn to_sui_public_key(&self) -> String {
        BASE64.encode(self.to_sui_bytes())
    }

    /// Single-signer address: BLAKE2b-256(flag || raw public key).
    pub fn to_address(&self) -> SuiAddress {
        SuiAddress::new(blake2b256_concat(&[&[self.flag()], &self.bytes]))
    }

    /// Verify a 64-byte signature over `message` with this key.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), KeyError> {
        if signature.len() != SIGNATURE_LENGTH {
            return Err(KeyError::VerificationFailed(format!(
                "signature must be {} bytes, got {}",
                SIGNATURE_LENGTH,
                signature.len()
            )));
        }
        let fail = |e: &dyn fmt::Display| KeyError::VerificationFailed(e.to_string());
        match self.scheme {
            SignatureScheme::Ed25519 => {
                use ed25519_dalek::Verifier;
                let key_bytes: [u8; 32] =
                    self.bytes.as_slice().try_into().map_err(|e| fail(&e))?;
                let sig_bytes: [u8; 64] = signature.try_into().map_err(|e| fail(&e))?;
                let vk = ed25519_dalek::VerifyingKey::from_bytes(&key_bytes).map_err(|e| fail(&e))?;
                vk.verify(message, &ed25519_dalek::Signature::from_bytes(&sig_bytes))
                    .map_err(|e| fail(&e))
            }
            SignatureScheme::Secp256k1 => {
                use k256::ecdsa::signature::Verifier;
                let vk = k256::ecdsa::VerifyingKey::from_sec1_bytes(&self.bytes)
                    .map_err(|e| fail(&e))?;
                let sig = k256::ecdsa::Signature::from_slice(signature).map_err(|e| fail(&e))?;
                vk.verify(message, &sig).map_err(|e| fail(&e))
            }
            SignatureScheme::Secp256r1 => {
                use p256::ecdsa::signature::Verifier;
                let vk = p256::ecdsa::VerifyingKey::from_sec1_bytes(&self.bytes)
                    .map_err(|e| fail(&e))?;
                let sig = p256::ecdsa::Signature::from_slice(signature).map_err(|e| fail(&e))?;
                vk.verify(message, &sig).map_err(|e| fail(&e))
            }
        }
    }
}

impl fmt::Debug for SuiPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SuiPublicKey({}, {})", self.scheme, self.to_base64())
    }
}

impl fmt::Display for SuiPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

fn decode_base64(encoded: &str) -> Result<Vec<u8>, KeyError> {
    BASE64
        .decode(encoded.trim())
        .map_err(|e| KeyError::InvalidEncoding(format!("invalid base64: {}", e)))
}

/// Signing capability consumed by the multisig and transaction layers.
///
/// Implementors only provide raw signing; the intent-message digest and the
/// serialized `flag || signature || public key` layout come for free.
pub trait KeyMaterial: Send + Sync {
    fn scheme(&self) -> SignatureScheme;

    fn public_key(&self) -> SuiPublicKey;

    /// Sign arbitrary bytes, returning the 64-byte compact signature.
    fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LENGTH], KeyError>;

    fn to_address(&self) -> SuiAddress {
        self.public_key().to_address()
    }

    /// Sign transaction bytes under the transaction intent.
    fn sign_transaction(&self, tx_bytes: &[u8]) -> Result<SerializedSignature, KeyError> {
        let digest = transaction_digest(tx_bytes);
        let signature = self.sign(&digest)?;
        Ok(SerializedSignature::from_parts(&self.public_key(), &signature))
    }
}

#[derive(Clone)]
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

impl Ed25519KeyPair {
    pub fn generate() -> Self {
        Self { signing_key: ed25519_dalek::SigningKey::generate(&mut OsRng) }
    }

    pub fn from_secret_key(secret: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; 32] = secret.try_into().map_err(|_| {
            KeyError::InvalidSecretKey(format!(
                "ed25519 secret key must be 32 bytes, got {}",
                secret.len()
            ))
        })?;
        Ok(Self { signing_key: ed25519_dalek::SigningKey::from_bytes(&bytes) })
    }
}

impl KeyMaterial for Ed25519KeyPair {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::Ed25519
    }

    fn public_key(&self) -> SuiPublicKey {
        SuiPublicKey {
            scheme: SignatureScheme::Ed25519,
            bytes: self.signing_key.verifying_key().to_bytes().to_vec(),
        }
    }

    fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LENGTH], KeyError> {
        use ed25519_dalek::Signer;
        Ok(self.signing_key.sign(message).to_bytes())
    }
}

impl fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519KeyPair({})", self.public_key())
    }
}

/// ECDSA over secp256k1; messages are SHA-256 prehashed and signatures
/// normalised to low-S.
pub struct Secp256k1KeyPair {
    signing_key: k256::ecdsa::SigningKey,
}

impl Secp256k1KeyPair {
    pub fn generate() -> Self {
        Self { signing_key: k256::ecdsa::SigningKey::random(&mut OsRng) }
    }

    pub fn from_secret_key(secret: &[u8]) -> Result<Self, KeyError> {
        let signing_key = k256::ecdsa::SigningKey::from_slice(secret)
            .map_err(|e| KeyError::InvalidSecretKey(format!("secp256k1: {}", e)))?;
        Ok(Self { signing_key })
    }
}

impl KeyMaterial for Secp256k1KeyPair {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::Secp256k1
    }

    fn public_key(&self) -> SuiPublicKey {
        let point = self.signing_key.verifying_key().to_encoded_point(true);
        SuiPublicKey { scheme: SignatureScheme::Secp256k1, bytes: point.as_bytes().to_vec() }
    }

    fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LENGTH], KeyError> {
        use k256::ecdsa::signature::Signer;
        let sig: k256::ecdsa::Signature = self
            .signing_key
            .try_sign(message)
            .map_err(|e| KeyError::SigningFailed(e.to_string()))?;
        let sig = sig.normalize_s().unwrap_or(sig);
        let mut out = [0u8; SIGNATURE_LENGTH];
        out.copy_from_slice(&sig.to_bytes());
        Ok(out)
    }
}

impl fmt::Debug for Secp256k1KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secp256k1KeyPair({})", self.public_key())
    }
}

/// ECDSA over NIST P-256, same conventions as [`Secp256k1KeyPair`].
pub struct Secp256r1KeyPair {
    signing_key: p256::ecdsa::SigningKey,
}

impl Secp256r1KeyPair {
    pub fn generate() -> Self {
        Self { signing_key: p256::ecdsa::SigningKey::random(&mut OsRng) }
    }

    pub fn from_secret_key(secret: &[u8]) -> Result<Self, KeyError> {
        let signing_key = p256::ecdsa::SigningKey::from_slice(secret)
            .map_err(|e| KeyError::InvalidSecretKey(format!("secp256r1: {}", e)))?;
        Ok(Self { signing_key })
    }
}

impl KeyMaterial for Secp256r1KeyPair {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::Secp256r1
    }

    fn public_key(&self) -> SuiPublicKey {
        let point = self.signing_key.verifying_key().to_encoded_point(true);
        SuiPublicKey { scheme: SignatureScheme::Secp256r1, bytes: point.as_bytes().to_vec() }
    }

    fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LENGTH], KeyError> {
        use p256::ecdsa::signature::Signer;
        let sig: p256::ecdsa::Signature = self
            .signing_key
            .try_sign(message)
            .map_err(|e| KeyError::SigningFailed(e.to_string()))?;
        let sig = sig.normalize_s().unwrap_or(sig);
        let mut out = [0u8; SIGNATURE_LENGTH];
        out.copy_from_slice(&sig.to_bytes());
        Ok(out)
    }
}

impl fmt::Debug for Secp256r1KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secp256r1KeyPair({})", self.public_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_keypairs() -> Vec<Box<dyn KeyMaterial>> {
        vec![
            Box::new(Ed25519KeyPair::generate()),
            Box::new(Secp256k1KeyPair::generate()),
            Box::new(Secp256r1KeyPair::generate()),
        ]
    }

    #[test]
    fn test_public_key_lengths_match_scheme() {
        for kp in all_keypairs() {
            let pk = kp.public_key();
            assert_eq!(pk.as_bytes().len(), kp.scheme().public_key_length());
            assert_eq!(pk.to_sui_bytes()[0], kp.scheme().flag());
        }
    }

    #[test]
    fn test_sign_then_verify_all_schemes() {
        for kp in all_keypairs() {
            let sig = kp.sign(b"hello sui").unwrap();
            kp.public_key().verify(b"hello sui", &sig).unwrap();
            assert!(kp.public_key().verify(b"tampered", &sig).is_err());
        }
    }

    #[test]
    fn test_ed25519_base64_with_and_without_flag() {
        let kp = Ed25519KeyPair::from_secret_key(&[3u8; 32]).unwrap();
        let pk = kp.public_key();
        let raw = SuiPublicKey::ed25519_from_base64(&pk.to_base64()).unwrap();
        let flagged = SuiPublicKey::ed25519_from_base64(&pk.to_sui_public_key()).unwrap();
        assert_eq!(raw, pk);
        assert_eq!(flagged, pk);
        let err = SuiPublicKey::ed25519_from_base64(&BASE64.encode([1u8; 31])).unwrap_err();
        assert_eq!(
            err,
            KeyError::InvalidPublicKeyLength { scheme: "ED25519", expected: 32, actual: 31 }
        );
    }

    #[test]
    fn test_address_is_blake2b_of_flag_and_key() {
        let kp = Ed25519KeyPair::from_secret_key(&[5u8; 32]).unwrap();
        let pk = kp.public_key();
        let mut buf = vec![ED25519_FLAG];
        buf.extend_from_slice(pk.as_bytes());
        assert_eq!(pk.to_address().as_bytes(), &crate::crypto::hash::blake2b256(&buf));
        assert_eq!(kp.to_address(), pk.to_address());
    }

    #[test]
    fn test_secp256k1_signature_is_low_s() {
        let kp = Secp256k1KeyPair::from_secret_key(&[7u8; 32]).unwrap();
        for i in 0..16u8 {
            let raw = kp.sign(&[i; 10]).unwrap();
            let sig = k256::ecdsa::Signature::from_slice(&raw).unwrap();
            assert!(sig.normalize_s().is_none());
        }
    }

    #[test]
    fn test_rejects_invalid_secret_keys() {
        assert!(Ed25519KeyPair::from_secret_key(&[1u8; 31]).is_err());
        assert!(Secp256k1KeyPair::from_secret_key(&[0u8; 32]).is_err());
        assert!(Secp256r1KeyPair::from_secret_key(&[0u8; 32]).is_err());
    }
}
