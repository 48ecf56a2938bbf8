// crates/synthex-core/src/currency.rs
//
// Fixed-width currency symbols ("sUSD", "sAUD", "iBTC", "SNX", "XDR").

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SynthError;

const KEY_WIDTH: usize = 8;

/// A stable, fixed-width identifier for a tracked currency.
///
/// Symbols are 1 to 8 ASCII alphanumeric characters, stored zero-padded so
/// the key is `Copy` and hashes cheaply. Serialized as its string form.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyKey([u8; KEY_WIDTH]);

impl CurrencyKey {
    /// Maximum symbol length in bytes.
    pub const WIDTH: usize = KEY_WIDTH;

    /// Create a key from a symbol.
    ///
    /// # Errors
    /// Returns `SynthError::InvalidParameter` if the symbol is empty, longer
    /// than `WIDTH`, or contains non-alphanumeric characters.
    pub fn new(symbol: &str) -> Result<Self, SynthError> {
        let bytes = symbol.as_bytes();
        if bytes.is_empty() || bytes.len() > Self::WIDTH {
            return Err(SynthError::InvalidParameter(format!(
                "currency symbol '{}' must be 1 to {} characters",
                symbol,
                Self::WIDTH
            )));
        }
        if !bytes.iter().all(|b| b.is_ascii_alphanumeric()) {
            return Err(SynthError::InvalidParameter(format!(
                "currency symbol '{}' must be ASCII alphanumeric",
                symbol
            )));
        }
        let mut raw = [0u8; KEY_WIDTH];
        raw[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(raw))
    }

    /// The symbol without padding.
    pub fn as_str(&self) -> &str {
        let len = self.0.iter().position(|b| *b == 0).unwrap_or(Self::WIDTH);
        std::str::from_utf8(&self.0[..len]).unwrap_or("")
    }

    /// The padded raw bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_WIDTH] {
        &self.0
    }
}

impl FromStr for CurrencyKey {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyKey {
    type Error = SynthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CurrencyKey> for String {
    fn from(key: CurrencyKey) -> Self {
        key.as_str().to_string()
    }
}

impl fmt::Display for CurrencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for CurrencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CurrencyKey({})", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_symbol() {
        let key = CurrencyKey::new("sUSD").unwrap();
        assert_eq!(key.as_str(), "sUSD");
        assert_eq!(key.to_string(), "sUSD");
        assert_eq!(&key.as_bytes()[..5], b"sUSD\0");
    }

    #[test]
    fn test_full_width_symbol() {
        let key: CurrencyKey = "ABCDEFGH".parse().unwrap();
        assert_eq!(key.as_str(), "ABCDEFGH");
    }

    #[test]
    fn test_rejects_bad_symbols() {
        assert!(CurrencyKey::new("").is_err());
        assert!(CurrencyKey::new("TOOLONGKEY").is_err());
        assert!(CurrencyKey::new("s-USD").is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let key = CurrencyKey::new("iBTC").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"iBTC\"");
        let back: CurrencyKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<CurrencyKey>("\"not a key\"").is_err());
    }
}
