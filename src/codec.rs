//! Storage unit codec
//!
//! A payload is stored as a *unit*: a single marker byte followed by the
//! payload verbatim, no length field, no padding.
//!
//! ```text
//! byte 0:     0x00       (execution-inhibiting marker)
//! bytes 1..:  payload
//! ```
//!
//! The marker keeps a stored unit from ever starting with a byte the
//! execution environment would interpret as runnable code; readers strip it
//! before handing bytes back.

use crate::{Error, Result};

/// Marker byte prepended to every stored unit
pub const STOP_BYTE: u8 = 0x00;

/// Offset of the first payload byte inside a unit
pub const DATA_OFFSET: usize = 1;

/// Hard ceiling on the size of a single stored unit, marker included
pub const MAX_UNIT_SIZE: usize = 24_576;

/// Largest payload guaranteed to fit under the unit ceiling
pub const MAX_PAYLOAD_SIZE: usize = MAX_UNIT_SIZE - DATA_OFFSET;

/// Wrap a payload into a storage unit
///
/// Never fails; output length is always `payload.len() + 1`. Oversized
/// payloads are rejected by the substrate at deploy time, not here.
pub fn encode(payload: &[u8]) -> Vec<u8> {
    let mut unit = Vec::with_capacity(payload.len() + DATA_OFFSET);
    unit.push(STOP_BYTE);
    unit.extend_from_slice(payload);
    unit
}

/// Unwrap a storage unit back into its payload
///
/// An empty unit (unoccupied location) yields an empty payload; "no data"
/// and "empty data" are indistinguishable at this layer.
pub fn decode(unit: &[u8]) -> &[u8] {
    if unit.is_empty() {
        unit
    } else {
        &unit[DATA_OFFSET..]
    }
}

/// Extract `payload[start..end]` with clamped-end semantics
///
/// Boundary policy:
/// - omitted `end` means the end of the payload;
/// - a supplied `end` past the payload is clamped, never an error;
/// - `start` past the payload yields empty bytes, never an error;
/// - a supplied `end` strictly below `start` is the one rejected case.
pub fn slice(payload: &[u8], start: usize, end: Option<usize>) -> Result<&[u8]> {
    if let Some(end) = end {
        if end < start {
            return Err(Error::InvalidRange { start, end });
        }
    }

    let end = end.unwrap_or(payload.len()).min(payload.len());
    if start >= end {
        return Ok(&[]);
    }
    Ok(&payload[start..end])
}
