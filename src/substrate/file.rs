//! Single-file persistent substrate
//!
//! File format:
//! ```text
//! [HEADER: 64 bytes]
//!   - magic: 8 bytes ("CODECELL")
//!   - version: 4 bytes (u32 LE)
//!   - flags: 4 bytes
//!   - unit_count: 8 bytes (u64 LE)
//!   - index_offset: 8 bytes (u64 LE)
//!   - nonce: 8 bytes (u64 LE)
//!   - deployer: 20 bytes
//!   - reserved: 4 bytes
//!
//! [UNITS: variable]
//!   - unit bytes, concatenated
//!
//! [INDEX: variable]
//!   - array of (address, offset, size) entries
//! ```
//!
//! Units are append-only; the index is rewritten on [`sync`](FileSubstrate::sync).
//! An address, once present in the index, is never reassigned; the file is a
//! write-once namespace like any other substrate.

use crate::codec::MAX_UNIT_SIZE;
use crate::model::{Address, Salt, ADDRESS_LEN};
use crate::substrate::Substrate;
use crate::{Error, Result, MAGIC, VERSION};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::debug;

const HEADER_SIZE: u64 = 64;
// 20 (address) + 8 (offset) + 4 (size)
const INDEX_ENTRY_SIZE: usize = ADDRESS_LEN + 8 + 4;

#[derive(Clone, Debug)]
struct IndexEntry {
    offset: u64,
    size: u32,
}

#[derive(Debug)]
struct Inner {
    file: File,
    index: HashMap<Address, IndexEntry>,
    /// Count of content-style deployments, persisted so reopened files keep
    /// assigning fresh addresses
    nonce: u64,
    /// Current append position (end of units, before any written index)
    write_offset: u64,
}

/// A write-once unit store backed by a single file
#[derive(Debug)]
pub struct FileSubstrate {
    path: std::path::PathBuf,
    deployer: Address,
    inner: RwLock<Inner>,
}

impl FileSubstrate {
    /// Create a new store file with the default deployer identity
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::create_with_deployer(path, Address::digest(b"codecell:file"))
    }

    /// Create a new store file writing as `deployer`
    pub fn create_with_deployer(path: impl AsRef<Path>, deployer: Address) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;

        let mut header = [0u8; HEADER_SIZE as usize];
        header[0..8].copy_from_slice(MAGIC);
        header[8..12].copy_from_slice(&VERSION.to_le_bytes());
        // flags, unit_count, index_offset, nonce: 0
        header[40..40 + ADDRESS_LEN].copy_from_slice(deployer.as_bytes());
        file.write_all(&header)?;
        file.sync_all()?;

        Ok(FileSubstrate {
            path,
            deployer,
            inner: RwLock::new(Inner {
                file,
                index: HashMap::new(),
                nonce: 0,
                write_offset: HEADER_SIZE,
            }),
        })
    }

    /// Open an existing store file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut file = OpenOptions::new().read(true).write(true).open(&path)?;

        let mut header = [0u8; HEADER_SIZE as usize];
        file.read_exact(&mut header)?;

        if &header[0..8] != MAGIC {
            return Err(Error::InvalidFile("invalid magic bytes".into()));
        }

        let version = u32::from_le_bytes(header[8..12].try_into().unwrap());
        if version != VERSION {
            return Err(Error::VersionMismatch {
                expected: VERSION,
                found: version,
            });
        }

        let unit_count = u64::from_le_bytes(header[16..24].try_into().unwrap());
        let index_offset = u64::from_le_bytes(header[24..32].try_into().unwrap());
        let nonce = u64::from_le_bytes(header[32..40].try_into().unwrap());

        let mut deployer_bytes = [0u8; ADDRESS_LEN];
        deployer_bytes.copy_from_slice(&header[40..40 + ADDRESS_LEN]);
        let deployer = Address::from_bytes(deployer_bytes);

        let mut index = HashMap::new();
        if index_offset > 0 && unit_count > 0 {
            file.seek(SeekFrom::Start(index_offset))?;
            for _ in 0..unit_count {
                let mut entry_buf = [0u8; INDEX_ENTRY_SIZE];
                file.read_exact(&mut entry_buf)?;

                let mut address_bytes = [0u8; ADDRESS_LEN];
                address_bytes.copy_from_slice(&entry_buf[0..ADDRESS_LEN]);
                let address = Address::from_bytes(address_bytes);

                let offset = u64::from_le_bytes(entry_buf[20..28].try_into().unwrap());
                let size = u32::from_le_bytes(entry_buf[28..32].try_into().unwrap());

                index.insert(address, IndexEntry { offset, size });
            }
        }

        // Append position: start of the index if one was written, else EOF.
        let write_offset = if index_offset > 0 {
            index_offset
        } else {
            file.seek(SeekFrom::End(0))?
        };

        Ok(FileSubstrate {
            path,
            deployer,
            inner: RwLock::new(Inner {
                file,
                index,
                nonce,
                write_offset,
            }),
        })
    }

    /// Open a store file, creating it if missing
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Number of occupied addresses
    pub fn unit_count(&self) -> usize {
        self.inner.read().index.len()
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush units and rewrite the header and index
    pub fn sync(&self) -> Result<()> {
        let mut inner = self.inner.write();
        let write_offset = inner.write_offset;
        let nonce = inner.nonce;
        let unit_count = inner.index.len() as u64;

        // Sort by address for determinism.
        let mut entries: Vec<(Address, IndexEntry)> = inner
            .index
            .iter()
            .map(|(a, e)| (*a, e.clone()))
            .collect();
        entries.sort_by_key(|(a, _)| *a);

        let file = &mut inner.file;
        file.seek(SeekFrom::Start(16))?;
        file.write_all(&unit_count.to_le_bytes())?;
        file.write_all(&write_offset.to_le_bytes())?;
        file.write_all(&nonce.to_le_bytes())?;

        file.seek(SeekFrom::Start(write_offset))?;
        for (address, entry) in &entries {
            file.write_all(address.as_bytes())?;
            file.write_all(&entry.offset.to_le_bytes())?;
            file.write_all(&entry.size.to_le_bytes())?;
        }

        file.sync_all()?;
        Ok(())
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

    /// Append a unit and claim `address` for it, atomically under the lock
    fn append_at(&self, unit: &[u8], address: Address) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.index.contains_key(&address) {
            return Err(Error::AddressOccupied(address));
        }

        let offset = inner.write_offset;
        inner.file.seek(SeekFrom::Start(offset))?;
        inner.file.write_all(unit)?;
        inner.write_offset = offset + unit.len() as u64;

        inner.index.insert(
            address,
            IndexEntry {
                offset,
                size: unit.len() as u32,
            },
        );
        Ok(())
    }
}

impl Substrate for FileSubstrate {
    fn deployer(&self) -> Address {
        self.deployer
    }

    fn deploy(&self, unit: &[u8]) -> Result<Address> {
        Self::check_size(unit)?;

        let nonce = {
            let mut inner = self.inner.write();
            let nonce = inner.nonce;
            inner.nonce += 1;
            nonce
        };
        let address = Address::sequence(&self.deployer, nonce);
        self.append_at(unit, address)?;

        debug!(address = %address, size = unit.len(), "deployed unit to file");
        Ok(address)
    }

    fn deploy_at(&self, unit: &[u8], salt: &Salt) -> Result<Address> {
        Self::check_size(unit)?;

        let address = Address::derive(&self.deployer, salt);
        self.append_at(unit, address)?;

        debug!(address = %address, size = unit.len(), "deployed unit to file at salted address");
        Ok(address)
    }

    fn read_code(&self, address: &Address) -> Result<Vec<u8>> {
        let mut inner = self.inner.write();
        let entry = match inner.index.get(address) {
            Some(entry) => entry.clone(),
            None => return Ok(Vec::new()),
        };

        inner.file.seek(SeekFrom::Start(entry.offset))?;
        let mut unit = vec![0u8; entry.size as usize];
        inner.file.read_exact(&mut unit)?;
        Ok(unit)
    }
}

impl Drop for FileSubstrate {
    fn drop(&mut self) {
        // Best-effort sync on drop
        let _ = self.sync();
    }
}
