//! Error types for codecell

use crate::model::{Address, Key};
use thiserror::Error;

/// Result type alias for codecell operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in codecell operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unit of {size} bytes exceeds the {max} byte ceiling")]
    SizeExceeded { size: usize, max: usize },

    #[error("address already occupied: {0}")]
    AddressOccupied(Address),

    #[error("key already used: {0}")]
    KeyAlreadyUsed(Key),

    #[error("invalid range: end {end} is below start {start}")]
    InvalidRange { start: usize, end: usize },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid store file: {0}")]
    InvalidFile(String),

    #[error("version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}
