//! Core data model types for codecell

mod address;
mod key;

pub use address::{Address, ADDRESS_LEN};
pub use key::{Key, Salt};
