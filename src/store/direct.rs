//! Address-returned storage

use crate::codec;
use crate::model::Address;
use crate::substrate::Substrate;
use crate::Result;

/// Store that hands back the substrate-assigned address of each write
///
/// The thinnest layer over a substrate: writes wrap the payload into a unit,
/// reads strip the marker byte back off. There is no key namespace; callers
/// keep the returned [`Address`] to get their bytes back.
pub struct DirectStore<S> {
    substrate: S,
}

impl<S: Substrate> DirectStore<S> {
    /// Create a store over the given substrate
    pub fn new(substrate: S) -> Self {
        DirectStore { substrate }
    }

    /// Store a payload, returning the address it now lives at
    ///
    /// Size enforcement belongs to the substrate; a payload over
    /// [`MAX_PAYLOAD_SIZE`](crate::codec::MAX_PAYLOAD_SIZE) surfaces its
    /// `SizeExceeded` unchanged.
    pub fn write(&self, payload: &[u8]) -> Result<Address> {
        self.substrate.deploy(&codec::encode(payload))
    }

    /// Read the full payload at an address
    ///
    /// An unoccupied address yields empty bytes, never an error.
    pub fn read(&self, address: &Address) -> Result<Vec<u8>> {
        let unit = self.substrate.read_code(address)?;
        Ok(codec::decode(&unit).to_vec())
    }

    /// Read `payload[start..end]` at an address, end clamped to the payload
    pub fn read_slice(
        &self,
        address: &Address,
        start: usize,
        end: Option<usize>,
    ) -> Result<Vec<u8>> {
        let unit = self.substrate.read_code(address)?;
        Ok(codec::slice(codec::decode(&unit), start, end)?.to_vec())
    }

    /// Borrow the underlying substrate
    pub fn substrate(&self) -> &S {
        &self.substrate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{MAX_PAYLOAD_SIZE, STOP_BYTE};
    use crate::substrate::MemorySubstrate;
    use crate::Error;

    fn store() -> DirectStore<MemorySubstrate> {
        DirectStore::new(MemorySubstrate::new())
    }

    #[test]
    fn test_write_read_roundtrip() {
        let store = store();
        let payload = b"the cat sat on the mat";

        let address = store.write(payload).unwrap();
        assert_eq!(store.read(&address).unwrap(), payload);
    }

    #[test]
    fn test_stored_unit_is_marker_prefixed() {
        let store = store();
        let address = store.write(b"abc").unwrap();

        let unit = store.substrate().read_code(&address).unwrap();
        assert_eq!(unit[0], STOP_BYTE);
        assert_eq!(&unit[1..], b"abc");
    }

    #[test]
    fn test_write_empty_payload() {
        let store = store();
        let address = store.write(b"").unwrap();
        assert_eq!(store.read(&address).unwrap(), b"");
    }

    #[test]
    fn test_read_unwritten_address_is_empty() {
        let store = store();
        let nowhere = Address::digest(b"random pointer");
        assert_eq!(store.read(&nowhere).unwrap(), b"");
        assert_eq!(store.read_slice(&nowhere, 5, None).unwrap(), b"");
    }

    #[test]
    fn test_max_payload_boundary() {
        let store = store();

        let fits = vec![7u8; MAX_PAYLOAD_SIZE];
        let address = store.write(&fits).unwrap();
        assert_eq!(store.read(&address).unwrap(), fits);

        let too_big = vec![7u8; MAX_PAYLOAD_SIZE + 1];
        assert!(matches!(
            store.write(&too_big).unwrap_err(),
            Error::SizeExceeded { .. }
        ));
    }

    #[test]
    fn test_read_slice_boundaries() {
        let store = store();
        let payload: Vec<u8> = (0..100u8).collect();
        let address = store.write(&payload).unwrap();

        assert_eq!(store.read_slice(&address, 100, None).unwrap(), b"");
        assert_eq!(store.read_slice(&address, 99, None).unwrap(), vec![99u8]);
        assert_eq!(
            store.read_slice(&address, 10, Some(15)).unwrap(),
            &payload[10..15]
        );
        assert_eq!(
            store.read_slice(&address, 50, Some(200)).unwrap(),
            &payload[50..]
        );
        assert_eq!(store.read_slice(&address, 101, None).unwrap(), b"");
        assert!(matches!(
            store.read_slice(&address, 3, Some(2)).unwrap_err(),
            Error::InvalidRange { start: 3, end: 2 }
        ));
    }
}
