//! Caller-chosen keys and their salt derivation

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte salt used for deterministic address derivation
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Salt([u8; 32]);

impl Salt {
    /// Create a salt from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Salt(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({})", &hex::encode(self.0)[..8])
    }
}

/// A caller-chosen identifier mapped deterministically to an address
///
/// Two flavors share one write/read path: a fixed 32-byte key is used as the
/// salt verbatim, while a text key of arbitrary length is hashed down to the
/// same fixed-width salt space. Collision safety for text keys rests on the
/// hash, not on any uniqueness check here.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Fixed 32-byte key, used directly as the salt
    Fixed([u8; 32]),
    /// Arbitrary-length string key, hashed to a salt
    Text(String),
}

impl Key {
    /// Derive the salt for this key
    pub fn salt(&self) -> Salt {
        match self {
            Key::Fixed(bytes) => Salt(*bytes),
            Key::Text(s) => Salt(*blake3::hash(s.as_bytes()).as_bytes()),
        }
    }

    /// Parse a fixed key from 64 hex chars
    pub fn fixed_from_hex(s: &str) -> crate::Result<Self> {
        let bytes = hex::decode(s.trim_start_matches("0x"))
            .map_err(|e| crate::Error::InvalidKey(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(crate::Error::InvalidKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Key::Fixed(arr))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Fixed(bytes) => write!(f, "{}", hex::encode(bytes)),
            Key::Text(s) => write!(f, "{:?}", s),
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Fixed(bytes) => write!(f, "Key::Fixed({})", &hex::encode(bytes)[..8]),
            Key::Text(s) => write!(f, "Key::Text({:?})", s),
        }
    }
}

impl From<[u8; 32]> for Key {
    fn from(bytes: [u8; 32]) -> Self {
        Key::Fixed(bytes)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Text(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Text(s)
    }
}
