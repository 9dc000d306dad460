//! Storage address type

use crate::model::Salt;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of bytes in an [`Address`]
pub const ADDRESS_LEN: usize = 20;

// Domain bytes keep salted and sequential derivations in disjoint spaces.
const DOMAIN_DERIVE: u8 = 0x01;
const DOMAIN_SEQUENCE: u8 = 0x02;

/// A 20-byte location at which a storage unit resides
///
/// Addresses are opaque identifiers assigned at write time. The all-zero
/// address is reserved as the unoccupied sentinel and is never handed out
/// by a substrate.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The zero address (unoccupied sentinel)
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    /// Create an address from raw bytes
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Address(bytes)
    }

    /// Derive the deterministic address a salted deployment will occupy
    ///
    /// Pure function of `(deployer, salt)`: BLAKE3 over a domain byte, the
    /// deployer and the salt, truncated to 20 bytes.
    pub fn derive(deployer: &Address, salt: &Salt) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[DOMAIN_DERIVE]);
        hasher.update(&deployer.0);
        hasher.update(salt.as_bytes());
        Self::truncate(hasher.finalize().as_bytes())
    }

    /// Address of the `nonce`-th content-style deployment by `deployer`
    pub fn sequence(deployer: &Address, nonce: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[DOMAIN_SEQUENCE]);
        hasher.update(&deployer.0);
        hasher.update(&nonce.to_le_bytes());
        Self::truncate(hasher.finalize().as_bytes())
    }

    /// Hash arbitrary bytes down to an address (useful for naming deployers)
    pub fn digest(data: &[u8]) -> Self {
        Self::truncate(blake3::hash(data).as_bytes())
    }

    fn truncate(hash: &[u8; 32]) -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&hash[..ADDRESS_LEN]);
        Address(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string
    pub fn from_hex(s: &str) -> crate::Result<Self> {
        let bytes = hex::decode(s.trim_start_matches("0x"))
            .map_err(|e| crate::Error::InvalidAddress(e.to_string()))?;
        if bytes.len() != ADDRESS_LEN {
            return Err(crate::Error::InvalidAddress(format!(
                "expected {} bytes, got {}",
                ADDRESS_LEN,
                bytes.len()
            )));
        }
        let mut arr = [0u8; ADDRESS_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Address(arr))
    }

    /// Get a short prefix for display (first 8 chars)
    pub fn short(&self) -> String {
        self.to_hex()[..8].to_string()
    }

    /// Check if this is the zero address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.short())
    }
}

impl Default for Address {
    fn default() -> Self {
        Address::ZERO
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_deterministic() {
        let deployer = Address::digest(b"deployer");
        let salt = Salt::from_bytes([7u8; 32]);

        let a1 = Address::derive(&deployer, &salt);
        let a2 = Address::derive(&deployer, &salt);
        assert_eq!(a1, a2);

        let other = Address::derive(&deployer, &Salt::from_bytes([8u8; 32]));
        assert_ne!(a1, other);
    }

    #[test]
    fn test_derive_depends_on_deployer() {
        let salt = Salt::from_bytes([7u8; 32]);
        let a1 = Address::derive(&Address::digest(b"one"), &salt);
        let a2 = Address::derive(&Address::digest(b"two"), &salt);
        assert_ne!(a1, a2);
    }

    #[test]
    fn test_sequence_distinct_per_nonce() {
        let deployer = Address::digest(b"deployer");
        let a1 = Address::sequence(&deployer, 0);
        let a2 = Address::sequence(&deployer, 1);
        assert_ne!(a1, a2);
    }

    #[test]
    fn test_hex_roundtrip() {
        let a1 = Address::digest(b"roundtrip");
        let a2 = Address::from_hex(&a1.to_hex()).unwrap();
        assert_eq!(a1, a2);

        assert!(Address::from_hex("abcd").is_err());
        assert!(Address::from_hex("zz").is_err());
    }

    #[test]
    fn test_zero_sentinel() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::digest(b"x").is_zero());
    }
}
