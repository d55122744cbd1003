//! 部分签名聚合与多签解码

use crate::core::errors::PolicyError;
use crate::crypto::keypair::SuiPublicKey;
use crate::crypto::multisig::policy::{MultiSigPolicy, MAX_SIGNERS};
use crate::crypto::multisig::wire::{bitmap_indices, CompressedSignature, MultiSigWire};
use crate::crypto::scheme::{
    aggregate_scheme_name, SignatureScheme, MULTISIG_FLAG, SIGNATURE_LENGTH,
};
use crate::crypto::signature_utils::{
    split_signature, transaction_digest, SerializedSignature, SignatureParts,
};
use tracing::debug;

/// Parse one participant's `flag || signature || public key`.
pub fn parse_partial_signature(bytes: &[u8]) -> Result<SignatureParts, PolicyError> {
    let flag = *bytes
        .first()
        .ok_or_else(|| PolicyError::MalformedSignature("empty signature".to_string()))?;
    if let Some(scheme) = aggregate_scheme_name(flag) {
        return Err(PolicyError::UnsupportedNestedScheme { scheme });
    }
    split_signature(bytes).map_err(|e| PolicyError::MalformedSignature(e.to_string()))
}

impl MultiSigPolicy {
    /// Aggregate partial signatures into one submittable multisig.
    ///
    /// Signatures are emitted in ascending signer-index order whatever order
    /// they arrive in, so the bitmap and the signature list always pair up
    /// positionally. Whether the signed weight reaches the threshold is left
    /// to the network.
    pub fn combine<S: AsRef<[u8]>>(
        &self,
        partials: &[S],
    ) -> Result<SerializedSignature, PolicyError> {
        if partials.len() > MAX_SIGNERS {
            return Err(PolicyError::TooManySigners { max: MAX_SIGNERS, actual: partials.len() });
        }
        if partials.is_empty() {
            return Err(PolicyError::MalformedSignature("no partial signatures supplied".into()));
        }

        let mut indexed: Vec<(usize, CompressedSignature)> = Vec::with_capacity(partials.len());
        let mut bitmap: u16 = 0;
        for partial in partials {
            let parts = parse_partial_signature(partial.as_ref())?;
            let index = self.signers().index_of(&parts.public_key).ok_or_else(|| {
                PolicyError::UnknownSigner { public_key: parts.public_key.to_base64() }
            })?;
            let bit = 1u16 << index;
            if bitmap & bit != 0 {
                return Err(PolicyError::DuplicateSigner { index });
            }
            bitmap |= bit;
            indexed.push((index, CompressedSignature::new(parts.scheme, parts.signature)));
        }
        indexed.sort_by_key(|(index, _)| *index);

        let wire = MultiSigWire {
            sigs: indexed.into_iter().map(|(_, sig)| sig).collect(),
            bitmap,
            multisig_pk: self.to_wire()?,
        };
        let body = wire.to_bcs()?;
        let mut bytes = Vec::with_capacity(1 + body.len());
        bytes.push(MULTISIG_FLAG);
        bytes.extend_from_slice(&body);

        debug!(
            "combined {} partial signatures for {} (bitmap {:#06x})",
            wire.sigs.len(),
            self.address(),
            bitmap
        );
        Ok(SerializedSignature::new(bytes))
    }

    /// Base64 convenience wrapper around [`MultiSigPolicy::combine`].
    pub fn combine_base64<S: AsRef<str>>(&self, partials: &[S]) -> Result<String, PolicyError> {
        let decoded = partials
            .iter()
            .map(|p| {
                SerializedSignature::from_base64(p.as_ref())
                    .map_err(|e| PolicyError::MalformedSignature(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.combine(&decoded)?.to_base64())
    }
}

/// One signature recovered from a combined multisig.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSignature {
    pub scheme: SignatureScheme,
    pub signature: [u8; SIGNATURE_LENGTH],
    pub public_key: SuiPublicKey,
    pub weight: u8,
    /// Position of the signer in the embedded policy
    pub signer_index: usize,
}

impl DecodedSignature {
    pub fn verify_transaction(&self, tx_bytes: &[u8]) -> Result<(), PolicyError> {
        self.public_key
            .verify(&transaction_digest(tx_bytes), &self.signature)
            .map_err(|e| PolicyError::MalformedSignature(e.to_string()))
    }
}

/// Decode `0x03 || bcs(MultiSig)` back into its signatures, pairing the
/// `k`-th signature with the `k`-th set bit of the bitmap.
pub fn decode_multisig(combined: &[u8]) -> Result<Vec<DecodedSignature>, PolicyError> {
    decode_with_threshold(combined).map(|(signatures, _)| signatures)
}

/// Like [`decode_multisig`], also returning the embedded threshold.
pub fn decode_with_threshold(combined: &[u8]) -> Result<(Vec<DecodedSignature>, u16), PolicyError> {
    match combined.first() {
        Some(&MULTISIG_FLAG) => {}
        other => return Err(PolicyError::BadFlag { found: other.copied() }),
    }
    let wire = MultiSigWire::from_bcs(&combined[1..])?;
    let pk_map = &wire.multisig_pk.pk_map;

    let indices = bitmap_indices(wire.bitmap);
    if let Some(&out_of_range) = indices.iter().find(|&&i| i >= pk_map.len()) {
        return Err(PolicyError::InvalidBitmap {
            bitmap: wire.bitmap,
            reason: format!("bit {} set but policy has {} signers", out_of_range, pk_map.len()),
        });
    }
    if indices.len() != wire.sigs.len() {
        return Err(PolicyError::InvalidBitmap {
            bitmap: wire.bitmap,
            reason: format!("{} bits set for {} signatures", indices.len(), wire.sigs.len()),
        });
    }

    let mut decoded = Vec::with_capacity(wire.sigs.len());
    for (sig, &signer_index) in wire.sigs.iter().zip(indices.iter()) {
        let (scheme, signature) = sig.to_parts()?;
        let (pk_enum, weight) = &pk_map[signer_index];
        let public_key = pk_enum.to_public_key()?;
        if public_key.scheme() != scheme {
            return Err(PolicyError::MalformedSignature(format!(
                "{} signature paired with {} public key at index {}",
                scheme,
                public_key.scheme(),
                signer_index
            )));
        }
        decoded.push(DecodedSignature {
            scheme,
            signature,
            public_key,
            weight: *weight,
            signer_index,
        });
    }
    Ok((decoded, wire.multisig_pk.threshold))
}

/// Base64 convenience wrapper around [`decode_multisig`].
pub fn decode_multisig_base64(combined: &str) -> Result<Vec<DecodedSignature>, PolicyError> {
    let bytes = SerializedSignature::from_base64(combined)
        .map_err(|e| PolicyError::MalformedSignature(e.to_string()))?;
    decode_multisig(bytes.as_bytes())
}
