//! Storage substrates
//!
//! A substrate is the physical persistence layer a store writes units into.
//! It owns the address space and enforces the two contracts the stores rely
//! on: a hard per-unit size ceiling and write-once address slots. Reading an
//! address that was never written yields empty bytes, not an error.

mod file;
mod memory;

use crate::model::{Address, Salt};
use crate::Result;
use std::sync::Arc;

pub use file::FileSubstrate;
pub use memory::MemorySubstrate;

/// The persistence layer a store deploys units into
pub trait Substrate {
    /// Identity used for address derivation by this substrate's writer
    fn deployer(&self) -> Address;

    /// Deploy a unit at a fresh substrate-assigned address
    ///
    /// Fails with [`Error::SizeExceeded`](crate::Error::SizeExceeded) when
    /// the unit is over the ceiling.
    fn deploy(&self, unit: &[u8]) -> Result<Address>;

    /// Deploy a unit at the address derived from `salt`
    ///
    /// Same ceiling as [`deploy`](Substrate::deploy), plus
    /// [`Error::AddressOccupied`](crate::Error::AddressOccupied) if the slot
    /// is already taken. The occupancy check and insert are atomic; this is
    /// the authoritative write-once guarantee.
    fn deploy_at(&self, unit: &[u8], salt: &Salt) -> Result<Address>;

    /// Read the unit stored at an address, empty if unoccupied
    fn read_code(&self, address: &Address) -> Result<Vec<u8>>;

    /// Compute the address a salted deployment by `deployer` will occupy
    ///
    /// Pure function, no side effects.
    fn derive_address(&self, deployer: &Address, salt: &Salt) -> Address {
        Address::derive(deployer, salt)
    }
}

impl<S: Substrate + ?Sized> Substrate for &S {
    fn deployer(&self) -> Address {
        (**self).deployer()
    }

    fn deploy(&self, unit: &[u8]) -> Result<Address> {
        (**self).deploy(unit)
    }

    fn deploy_at(&self, unit: &[u8], salt: &Salt) -> Result<Address> {
        (**self).deploy_at(unit, salt)
    }

    fn read_code(&self, address: &Address) -> Result<Vec<u8>> {
        (**self).read_code(address)
    }

    fn derive_address(&self, deployer: &Address, salt: &Salt) -> Address {
        (**self).derive_address(deployer, salt)
    }
}

impl<S: Substrate + ?Sized> Substrate for Arc<S> {
    fn deployer(&self) -> Address {
        (**self).deployer()
    }

    fn deploy(&self, unit: &[u8]) -> Result<Address> {
        (**self).deploy(unit)
    }

    fn deploy_at(&self, unit: &[u8], salt: &Salt) -> Result<Address> {
        (**self).deploy_at(unit, salt)
    }

    fn read_code(&self, address: &Address) -> Result<Vec<u8>> {
        (**self).read_code(address)
    }

    fn derive_address(&self, deployer: &Address, salt: &Salt) -> Address {
        (**self).derive_address(deployer, salt)
    }
}
