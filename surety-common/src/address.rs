use std::{fmt, str::FromStr};

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::SuretyError;

pub const ADDRESS_LEN: usize = 20;

/// Opaque fixed-width account identity (airlines, passengers, oracles, admin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(#[serde(with = "hex::serde")] [u8; ADDRESS_LEN]);

impl Address {
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Derives the account of an ed25519 key: the last 20 bytes of `sha256(pk)`.
    pub fn from_public_key(key: &VerifyingKey) -> Self {
        Self::from_digest(key.as_bytes())
    }

    /// Deterministic address for named simulation accounts ("airline-1", "passenger-3").
    pub fn derive(label: &str) -> Self {
        Self::from_digest(label.as_bytes())
    }

    fn from_digest(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest[digest.len() - ADDRESS_LEN..]);
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = SuretyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(raw, &mut bytes)
            .map_err(|e| SuretyError::InvalidAddress(format!("{s}: {e}")))?;
        Ok(Self(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;

    #[test]
    fn test_display_and_parse() {
        let addr = Address::derive("airline-0");
        let printed = addr.to_string();
        assert!(printed.starts_with("0x"));
        assert_eq!(printed.len(), 2 + ADDRESS_LEN * 2);
        assert_eq!(printed.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("not-hex".parse::<Address>().is_err());
    }

    #[test]
    fn test_public_key_derivation_is_stable() {
        let key = SigningKey::from_bytes(&[7u8; 32]);
        let a = Address::from_public_key(&key.verifying_key());
        let b = Address::from_public_key(&key.verifying_key());
        assert_eq!(a, b);
        assert_ne!(a, Address::derive("something-else"));
    }
}
