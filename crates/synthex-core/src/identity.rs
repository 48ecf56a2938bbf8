// crates/synthex-core/src/identity.rs
//
// Participant and contract identities.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::SynthError;

/// A 32-byte account identity (participant, token, or collaborator).
///
/// Serialized as a `0x`-prefixed hex string.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 32]);

impl Address {
    /// The all-zero address. Never a valid participant.
    pub const ZERO: Address = Address([0u8; 32]);

    /// Derive a deterministic address from a human-readable label.
    ///
    /// Used by the CLI and tests to name participants ("alice", "oracle").
    pub fn from_label(label: &str) -> Self {
        let digest = Sha256::digest(label.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Address(bytes)
    }

    /// Whether this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// First four bytes as hex, for log lines.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl TryFrom<String> for Address {
    type Error = SynthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let digits = value.strip_prefix("0x").unwrap_or(&value);
        let raw = hex::decode(digits)
            .map_err(|e| SynthError::InvalidParameter(format!("address '{}': {}", value, e)))?;
        let bytes: [u8; 32] = raw.try_into().map_err(|_| {
            SynthError::InvalidParameter(format!("address '{}' is not 32 bytes", value))
        })?;
        Ok(Address(bytes))
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{}..)", self.short_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_is_deterministic() {
        assert_eq!(Address::from_label("alice"), Address::from_label("alice"));
        assert_ne!(Address::from_label("alice"), Address::from_label("bob"));
        assert!(!Address::from_label("alice").is_zero());
    }

    #[test]
    fn test_display() {
        let addr = Address([0xab; 32]);
        assert_eq!(addr.short_hex(), "abababab");
        assert_eq!(addr.to_string().len(), 66);
        assert!(Address::ZERO.is_zero());
    }

    #[test]
    fn test_serde_as_hex() {
        let addr = Address::from_label("alice");
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
        assert!(serde_json::from_str::<Address>("\"0x1234\"").is_err());
    }
}
