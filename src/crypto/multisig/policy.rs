//! 多签策略：加权公钥集合与阈值
//!
//! The position of each signer is significant: it feeds the address hash and
//! decides which bitmap bit the signer owns.

use crate::core::address::SuiAddress;
use crate::core::errors::PolicyError;
use crate::crypto::hash::blake2b256;
use crate::crypto::keypair::SuiPublicKey;
use crate::crypto::multisig::wire::{MultiSigPublicKeyWire, PublicKeyEnum};
use crate::crypto::scheme::MULTISIG_FLAG;
use tracing::debug;

/// Max number of signers in a multisig
pub const MAX_SIGNERS: usize = 10;

/// One signer of a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyWeightPair {
    public_key: SuiPublicKey,
    weight: u8,
}

impl PublicKeyWeightPair {
    pub fn new(public_key: SuiPublicKey, weight: u8) -> Self {
        Self { public_key, weight }
    }

    pub fn public_key(&self) -> &SuiPublicKey {
        &self.public_key
    }

    pub fn weight(&self) -> u8 {
        self.weight
    }
}

/// Ordered signer list. Index `i` owns bit `i` of a combined signature's
/// bitmap, so the order is never changed after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerSet(Vec<PublicKeyWeightPair>);

impl SignerSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PublicKeyWeightPair> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PublicKeyWeightPair> {
        self.0.iter()
    }

    pub fn index_of(&self, public_key: &SuiPublicKey) -> Option<usize> {
        self.0.iter().position(|p| p.public_key() == public_key)
    }

    pub fn total_weight(&self) -> u32 {
        total_weight(&self.0)
    }
}

fn total_weight(pairs: &[PublicKeyWeightPair]) -> u32 {
    pairs.iter().map(|p| u32::from(p.weight)).sum()
}

/// Derive the multisig address of `pairs` under `threshold`.
///
/// BLAKE2b-256 over `0x03 || threshold (u16 LE) || (flag || pk || weight)*`,
/// in the given order.
pub fn derive_address(
    pairs: &[PublicKeyWeightPair],
    threshold: u16,
) -> Result<SuiAddress, PolicyError> {
    if pairs.is_empty() {
        return Err(PolicyError::NoSigners);
    }
    if pairs.len() > MAX_SIGNERS {
        return Err(PolicyError::TooManySigners { max: MAX_SIGNERS, actual: pairs.len() });
    }
    let total_weight = total_weight(pairs);
    if total_weight < u32::from(threshold) {
        return Err(PolicyError::ThresholdUnreachable { threshold, total_weight });
    }

    let mut buf = Vec::with_capacity(3 + pairs.len() * (1 + 33 + 1));
    buf.push(MULTISIG_FLAG);
    buf.extend_from_slice(&threshold.to_le_bytes());
    for pair in pairs {
        buf.push(pair.public_key.flag());
        buf.extend_from_slice(pair.public_key.as_bytes());
        buf.push(pair.weight);
    }
    Ok(SuiAddress::new(blake2b256(&buf)))
}

/// A validated weighted multisig policy. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSigPolicy {
    signers: SignerSet,
    threshold: u16,
    address: SuiAddress,
}

impl MultiSigPolicy {
    pub fn new(pairs: Vec<PublicKeyWeightPair>, threshold: u16) -> Result<Self, PolicyError> {
        if pairs.is_empty() {
            return Err(PolicyError::NoSigners);
        }
        if pairs.len() > MAX_SIGNERS {
            return Err(PolicyError::TooManySigners { max: MAX_SIGNERS, actual: pairs.len() });
        }
        if threshold == 0 {
            return Err(PolicyError::ZeroThreshold);
        }
        for (index, pair) in pairs.iter().enumerate() {
            if pair.weight == 0 {
                return Err(PolicyError::ZeroWeight { index });
            }
            if let Some(first) = pairs[..index].iter().position(|p| p.public_key == pair.public_key)
            {
                return Err(PolicyError::DuplicatePublicKey { index, first });
            }
        }

        let address = derive_address(&pairs, threshold)?;
        debug!(
            "multisig policy: {} signers, threshold {}, address {}",
            pairs.len(),
            threshold,
            address
        );
        Ok(Self { signers: SignerSet(pairs), threshold, address })
    }

    /// Zip keys with weights; both lists must have the same length.
    pub fn from_public_keys(
        public_keys: Vec<SuiPublicKey>,
        weights: &[u8],
        threshold: u16,
    ) -> Result<Self, PolicyError> {
        if public_keys.len() != weights.len() {
            return Err(PolicyError::WeightCountMismatch {
                keys: public_keys.len(),
                weights: weights.len(),
            });
        }
        let pairs = public_keys
            .into_iter()
            .zip(weights.iter().copied())
            .map(|(pk, w)| PublicKeyWeightPair::new(pk, w))
            .collect();
        Self::new(pairs, threshold)
    }

    /// Base64 ed25519 keys, with or without the leading scheme flag.
    pub fn from_raw_ed25519_public_keys<S: AsRef<str>>(
        raw_public_keys: &[S],
        weights: &[u8],
        threshold: u16,
    ) -> Result<Self, PolicyError> {
        if raw_public_keys.len() != weights.len() {
            return Err(PolicyError::WeightCountMismatch {
                keys: raw_public_keys.len(),
                weights: weights.len(),
            });
        }
        let keys = raw_public_keys
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                SuiPublicKey::ed25519_from_base64(raw.as_ref())
                    .map_err(|e| PolicyError::InvalidPublicKey { index, reason: e.to_string() })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_public_keys(keys, weights, threshold)
    }

    pub fn address(&self) -> SuiAddress {
        self.address
    }

    pub fn signers(&self) -> &SignerSet {
        &self.signers
    }

    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    pub fn total_weight(&self) -> u32 {
        self.signers.total_weight()
    }

    pub(crate) fn to_wire(&self) -> Result<MultiSigPublicKeyWire, PolicyError> {
        let pk_map = self
            .signers
            .iter()
            .map(|p| Ok((PublicKeyEnum::try_from(p.public_key())?, p.weight())))
            .collect::<Result<Vec<_>, PolicyError>>()?;
        Ok(MultiSigPublicKeyWire { pk_map, threshold: self.threshold })
    }
}
