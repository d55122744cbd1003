//! Secret key and mnemonic helpers.

use crate::core::errors::KeyError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

pub const PRIVATE_KEY_SIZE: usize = 32;
pub const LEGACY_PRIVATE_KEY_SIZE: usize = 64;

pub fn is_hex(s: &str) -> bool {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit())
}

pub fn is_base64(s: &str) -> bool {
    let body = s.trim_end_matches('=');
    let padding = s.len() - body.len();
    !body.is_empty()
        && padding <= 2
        && body.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/')
}

/// Decode a hex (optionally `0x` prefixed) or base64 string. Hex wins when a
/// string is valid in both alphabets.
pub fn hex_or_base64_to_bytes(input: &str) -> Result<Zeroizing<Vec<u8>>, KeyError> {
    let s = input.trim();
    if is_hex(s) {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        return hex::decode(digits)
            .map(Zeroizing::new)
            .map_err(|e| KeyError::InvalidEncoding(format!("invalid hex: {}", e)));
    }
    if is_base64(s) {
        return BASE64
            .decode(s)
            .map(Zeroizing::new)
            .map_err(|e| KeyError::InvalidEncoding(format!("invalid base64: {}", e)));
    }
    Err(KeyError::InvalidEncoding("the string is not a valid hex or base64 string".into()))
}

/// Reduce the accepted secret key layouts to the bare 32-byte key:
/// 32 bytes as-is, 33 bytes with a leading ed25519 flag, or a legacy 64-byte
/// `secret || public` pair.
pub fn normalize_private_key(key: &[u8]) -> Result<Zeroizing<[u8; PRIVATE_KEY_SIZE]>, KeyError> {
    let raw = match key.len() {
        PRIVATE_KEY_SIZE => key,
        LEGACY_PRIVATE_KEY_SIZE => &key[..PRIVATE_KEY_SIZE],
        n if n == PRIVATE_KEY_SIZE + 1 && key[0] == 0 => &key[1..],
        n => {
            return Err(KeyError::InvalidSecretKey(format!(
                "expected 32, 33 (flagged) or 64 bytes, got {}",
                n
            )))
        }
    };
    let mut out = Zeroizing::new([0u8; PRIVATE_KEY_SIZE]);
    out.copy_from_slice(raw);
    Ok(out)
}

/// Fresh BIP-39 mnemonic with 12 or 24 words.
pub fn generate_mnemonic(word_count: usize) -> Result<String, KeyError> {
    let entropy_len = match word_count {
        12 => 16,
        24 => 32,
        other => {
            return Err(KeyError::InvalidMnemonic(format!(
                "word count must be 12 or 24, got {}",
                other
            )))
        }
    };
    let mut entropy = Zeroizing::new(vec![0u8; entropy_len]);
    OsRng.fill_bytes(&mut entropy);
    let mnemonic = bip39::Mnemonic::from_entropy(&entropy)
        .map_err(|e| KeyError::InvalidMnemonic(e.to_string()))?;
    Ok(mnemonic.to_string())
}
