//! Key-addressed storage

use crate::codec;
use crate::model::{Address, Key};
use crate::store::DirectStore;
use crate::substrate::Substrate;
use crate::{Error, Result};
use tracing::debug;

/// Store that maps caller-chosen keys onto deterministic addresses
///
/// Every write still lands as an ordinary storage unit; the key only decides
/// *where*. The address a key resolves to is a pure function of the writer
/// identity and the key's salt, so it can be computed before anything is
/// written (see [`address_of`](KeyedStore::address_of)).
///
/// Keys are write-once: once a key's address holds a unit, every further
/// write for that key fails with [`Error::KeyAlreadyUsed`]. The proactive
/// occupancy pre-check here is a fast-fail; the substrate's own atomic
/// rejection of an occupied slot is the authoritative guarantee under
/// concurrent writers.
pub struct KeyedStore<S> {
    direct: DirectStore<S>,
}

impl<S: Substrate> KeyedStore<S> {
    /// Create a store over the given substrate
    pub fn new(substrate: S) -> Self {
        KeyedStore {
            direct: DirectStore::new(substrate),
        }
    }

    /// The address a key resolves to, with no read or write side effect
    pub fn address_of(&self, key: impl Into<Key>) -> Address {
        let key = key.into();
        let substrate = self.direct.substrate();
        substrate.derive_address(&substrate.deployer(), &key.salt())
    }

    /// Store a payload under a key, returning the address it now lives at
    ///
    /// Fails with [`Error::KeyAlreadyUsed`] on any second write for the same
    /// key, and propagates the substrate's `SizeExceeded` for oversized
    /// payloads.
    pub fn write(&self, key: impl Into<Key>, payload: &[u8]) -> Result<Address> {
        let key = key.into();
        let salt = key.salt();
        let substrate = self.direct.substrate();
        let target = substrate.derive_address(&substrate.deployer(), &salt);

        // Fast-fail before deploying. A unit is never empty (it always
        // carries the marker byte), so presence of code means the key is
        // taken.
        if !substrate.read_code(&target)?.is_empty() {
            return Err(Error::KeyAlreadyUsed(key));
        }

        match substrate.deploy_at(&codec::encode(payload), &salt) {
            Ok(address) => {
                debug!(key = %key, address = %address, "stored payload under key");
                Ok(address)
            }
            // Lost the race after the pre-check; same contract violation.
            Err(Error::AddressOccupied(_)) => Err(Error::KeyAlreadyUsed(key)),
            Err(e) => Err(e),
        }
    }

    /// Read the full payload stored under a key
    ///
    /// A key never written yields empty bytes, never an error.
    pub fn read(&self, key: impl Into<Key>) -> Result<Vec<u8>> {
        let address = self.address_of(key);
        self.direct.read(&address)
    }

    /// Read `payload[start..end]` under a key, end clamped to the payload
    pub fn read_slice(
        &self,
        key: impl Into<Key>,
        start: usize,
        end: Option<usize>,
    ) -> Result<Vec<u8>> {
        let address = self.address_of(key);
        self.direct.read_slice(&address, start, end)
    }

    /// Borrow the underlying substrate
    pub fn substrate(&self) -> &S {
        self.direct.substrate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{MAX_PAYLOAD_SIZE, STOP_BYTE};
    use crate::substrate::MemorySubstrate;

    fn store() -> KeyedStore<MemorySubstrate> {
        KeyedStore::new(MemorySubstrate::new())
    }

    fn keys() -> Vec<Key> {
        vec![Key::Fixed([0x5au8; 32]), Key::from("some/string:key")]
    }

    #[test]
    fn test_write_read_roundtrip_both_flavors() {
        for key in keys() {
            let store = store();
            let payload = b"payload bytes";

            store.write(key.clone(), payload).unwrap();
            assert_eq!(store.read(key).unwrap(), payload);
        }
    }

    #[test]
    fn test_second_write_fails_and_preserves_first() {
        for key in keys() {
            let store = store();
            store.write(key.clone(), b"first").unwrap();

            let err = store.write(key.clone(), b"second").unwrap_err();
            assert!(matches!(err, Error::KeyAlreadyUsed(k) if k == key));
            assert_eq!(store.read(key).unwrap(), b"first");
        }
    }

    #[test]
    fn test_empty_keys_are_ordinary() {
        let store = store();

        store.write(Key::Fixed([0u8; 32]), b"zero key").unwrap();
        assert!(matches!(
            store.write(Key::Fixed([0u8; 32]), b"again").unwrap_err(),
            Error::KeyAlreadyUsed(_)
        ));

        store.write("", b"empty string key").unwrap();
        assert!(matches!(
            store.write("", b"again").unwrap_err(),
            Error::KeyAlreadyUsed(_)
        ));

        assert_eq!(store.read(Key::Fixed([0u8; 32])).unwrap(), b"zero key");
        assert_eq!(store.read("").unwrap(), b"empty string key");
    }

    #[test]
    fn test_long_string_key() {
        let store = store();
        let key: String = "lorem ipsum ".repeat(64);

        store.write(key.clone(), b"data").unwrap();
        assert!(matches!(
            store.write(key.clone(), b"more").unwrap_err(),
            Error::KeyAlreadyUsed(_)
        ));
        assert_eq!(store.read(key).unwrap(), b"data");
    }

    #[test]
    fn test_address_of_matches_write() {
        for key in keys() {
            let store = store();
            let predicted = store.address_of(key.clone());
            let actual = store.write(key, b"predictable").unwrap();
            assert_eq!(predicted, actual);
        }
    }

    #[test]
    fn test_address_of_has_no_side_effect() {
        let store = store();
        let address = store.address_of("peek");
        assert_eq!(store.substrate().read_code(&address).unwrap(), b"");
        // Still writable afterwards.
        store.write("peek", b"now").unwrap();
    }

    #[test]
    fn test_stored_unit_is_marker_prefixed() {
        for key in keys() {
            let store = store();
            store.write(key.clone(), b"abc").unwrap();

            let unit = store
                .substrate()
                .read_code(&store.address_of(key))
                .unwrap();
            assert_eq!(unit[0], STOP_BYTE);
            assert_eq!(&unit[1..], b"abc");
        }
    }

    #[test]
    fn test_read_unwritten_key_is_empty() {
        let store = store();
        assert_eq!(store.read("never written").unwrap(), b"");
        assert_eq!(store.read(Key::Fixed([3u8; 32])).unwrap(), b"");
    }

    #[test]
    fn test_write_empty_payload() {
        for key in keys() {
            let store = store();
            store.write(key.clone(), b"").unwrap();
            assert_eq!(store.read(key.clone()).unwrap(), b"");
            // The key is still spent.
            assert!(matches!(
                store.write(key, b"again").unwrap_err(),
                Error::KeyAlreadyUsed(_)
            ));
        }
    }

    #[test]
    fn test_max_payload_boundary() {
        for key in keys() {
            let store = store();

            let fits = vec![1u8; MAX_PAYLOAD_SIZE];
            store.write(key.clone(), &fits).unwrap();
            assert_eq!(store.read(key.clone()).unwrap(), fits);

            let other = self::store();
            let too_big = vec![1u8; MAX_PAYLOAD_SIZE + 1];
            let err = other.write(key, &too_big).unwrap_err();
            assert!(matches!(err, Error::SizeExceeded { .. }));
        }
    }

    #[test]
    fn test_read_slice_boundaries() {
        let store = store();
        let payload: Vec<u8> = (0..100u8).collect();
        store.write("sliced", &payload).unwrap();

        assert_eq!(store.read_slice("sliced", 100, None).unwrap(), b"");
        assert_eq!(store.read_slice("sliced", 99, None).unwrap(), vec![99u8]);
        assert_eq!(
            store.read_slice("sliced", 10, Some(15)).unwrap(),
            &payload[10..15]
        );
        assert_eq!(
            store.read_slice("sliced", 50, Some(200)).unwrap(),
            &payload[50..]
        );
        assert!(matches!(
            store.read_slice("sliced", 3, Some(2)).unwrap_err(),
            Error::InvalidRange { .. }
        ));
    }

    #[test]
    fn test_fixed_and_text_keys_do_not_collide() {
        let store = store();
        // A fixed key equal to the hash of a string is the same salt by
        // construction; any other fixed key is not.
        let fixed = Key::Fixed([0x11; 32]);
        let text = Key::from("some key");
        assert_ne!(store.address_of(fixed), store.address_of(text));
    }

    #[test]
    fn test_shared_substrate_between_stores() {
        let substrate = std::sync::Arc::new(MemorySubstrate::new());
        let keyed = KeyedStore::new(substrate.clone());
        let direct = DirectStore::new(substrate);

        let address = keyed.write("shared", b"via key").unwrap();
        assert_eq!(direct.read(&address).unwrap(), b"via key");
    }
}
