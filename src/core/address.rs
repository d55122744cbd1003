//! 32-byte Sui account / object identifiers.

use crate::core::errors::KeyError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const SUI_ADDRESS_LENGTH: usize = 32;

/// A Sui address. Rendered as `0x` followed by 64 lower-case hex digits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SuiAddress([u8; SUI_ADDRESS_LENGTH]);

/// Object ids share the address format.
pub type ObjectId = SuiAddress;

impl SuiAddress {
    pub const ZERO: SuiAddress = SuiAddress([0u8; SUI_ADDRESS_LENGTH]);

    pub const fn new(bytes: [u8; SUI_ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SUI_ADDRESS_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Accepts short forms such as `0x2` by left-padding with zeros.
    pub fn from_hex(input: &str) -> Result<Self, KeyError> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.is_empty() || digits.len() > SUI_ADDRESS_LENGTH * 2 {
            return Err(KeyError::InvalidEncoding(format!("invalid sui address '{}'", input)));
        }
        let padded = format!("{:0>64}", digits.to_ascii_lowercase());
        let raw = hex::decode(&padded).map_err(|e| {
            KeyError::InvalidEncoding(format!("invalid sui address '{}': {}", input, e))
        })?;
        let mut bytes = [0u8; SUI_ADDRESS_LENGTH];
        bytes.copy_from_slice(&raw);
        Ok(Self(bytes))
    }
}

/// Normalise an address string to its canonical 66-character form.
pub fn normalize_sui_address(input: &str) -> Result<String, KeyError> {
    SuiAddress::from_hex(input).map(|a| a.to_hex())
}

impl fmt::Display for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SuiAddress({})", self)
    }
}

impl FromStr for SuiAddress {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; SUI_ADDRESS_LENGTH]> for SuiAddress {
    fn from(bytes: [u8; SUI_ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl Serialize for SuiAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SuiAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        SuiAddress::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
