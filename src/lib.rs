//! # codecell
//!
//! Write-once byte storage addressed by deployed code cells.
//!
//! Arbitrary payloads are wrapped into marker-prefixed *units* and deployed
//! into a substrate that assigns each unit an immutable address. Retrieval
//! reads the unit back and strips the marker, with byte-range slicing that
//! clamps a long end and rejects a backward one.
//!
//! ## Core Concepts
//!
//! - **Units**: marker-prefixed payload encodings, the substrate's atoms
//! - **Addresses**: opaque 20-byte locations, assigned once, never reused
//! - **Direct store**: keep the address a write returns, read by address
//! - **Keyed store**: map fixed 32-byte or string keys onto deterministic
//!   addresses, one write per key, ever
//!
//! ## Example
//!
//! ```
//! use codecell::{KeyedStore, MemorySubstrate};
//!
//! # fn main() -> codecell::Result<()> {
//! let store = KeyedStore::new(MemorySubstrate::new());
//! store.write("greeting", b"hello")?;
//! assert_eq!(store.read("greeting")?, b"hello");
//! assert!(store.write("greeting", b"again").is_err());
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod model;
pub mod store;
pub mod substrate;

mod error;

pub use codec::{DATA_OFFSET, MAX_PAYLOAD_SIZE, MAX_UNIT_SIZE, STOP_BYTE};
pub use error::{Error, Result};
pub use model::{Address, Key, Salt};
pub use store::{DirectStore, KeyedStore};
pub use substrate::{FileSubstrate, MemorySubstrate, Substrate};

/// Store file format version
pub const VERSION: u32 = 1;

/// Magic bytes for store file identification
pub const MAGIC: &[u8; 8] = b"CODECELL";
