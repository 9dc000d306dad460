//! In-memory substrate

use crate::codec::MAX_UNIT_SIZE;
use crate::model::{Address, Salt};
use crate::substrate::Substrate;
use crate::{Error, Result};
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

/// Volatile substrate backed by a hash map
///
/// Useful for tests and for callers that only need write-once semantics
/// within a single process. All units live on the heap; nothing persists.
pub struct MemorySubstrate {
    deployer: Address,
    inner: RwLock<Inner>,
}

struct Inner {
    code: HashMap<Address, Vec<u8>>,
    /// Count of content-style deployments, used for fresh addresses
    nonce: u64,
}

impl MemorySubstrate {
    /// Create a substrate with the default deployer identity
    pub fn new() -> Self {
        Self::with_deployer(Address::digest(b"codecell:memory"))
    }

    /// Create a substrate writing as `deployer`
    pub fn with_deployer(deployer: Address) -> Self {
        MemorySubstrate {
            deployer,
            inner: RwLock::new(Inner {
                code: HashMap::new(),
                nonce: 0,
            }),
        }
    }

    /// Number of occupied addresses
    pub fn unit_count(&self) -> usize {
        self.inner.read().code.len()
    }

    fn check_size(unit: &[u8]) -> Result<()> {
        if unit.len() > MAX_UNIT_SIZE {
            return Err(Error::SizeExceeded {
                size: unit.len(),
                max: MAX_UNIT_SIZE,
            });
        }
        Ok(())
    }
}

impl Default for MemorySubstrate {
    fn default() -> Self {
        Self::new()
    }
}

impl Substrate for MemorySubstrate {
    fn deployer(&self) -> Address {
        self.deployer
    }

    fn deploy(&self, unit: &[u8]) -> Result<Address> {
        Self::check_size(unit)?;

        let mut inner = self.inner.write();
        let address = Address::sequence(&self.deployer, inner.nonce);
        match inner.code.entry(address) {
            Entry::Occupied(_) => return Err(Error::AddressOccupied(address)),
            Entry::Vacant(slot) => {
                slot.insert(unit.to_vec());
            }
        }
        inner.nonce += 1;

        debug!(address = %address, size = unit.len(), "deployed unit");
        Ok(address)
    }

    fn deploy_at(&self, unit: &[u8], salt: &Salt) -> Result<Address> {
        Self::check_size(unit)?;

        let address = Address::derive(&self.deployer, salt);
        let mut inner = self.inner.write();
        match inner.code.entry(address) {
            Entry::Occupied(_) => return Err(Error::AddressOccupied(address)),
            Entry::Vacant(slot) => {
                slot.insert(unit.to_vec());
            }
        }

        debug!(address = %address, size = unit.len(), "deployed unit at salted address");
        Ok(address)
    }

    fn read_code(&self, address: &Address) -> Result<Vec<u8>> {
        Ok(self
            .inner
            .read()
            .code
            .get(address)
            .cloned()
            .unwrap_or_default())
    }
}
