//! Storage layers over a substrate
//!
//! [`DirectStore`] hands back the substrate-assigned address of each write;
//! [`KeyedStore`] layers a write-once key namespace on top via deterministic
//! address derivation.

mod direct;
mod keyed;

pub use direct::DirectStore;
pub use keyed::KeyedStore;
