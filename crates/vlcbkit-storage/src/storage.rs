//! Persisted storage backends
//!
//! The event table only needs byte-addressed read/write with durability
//! across restarts. Two backends are provided:
//! - [`MemoryStorage`]: a RAM image, erased to 0xFF, used in tests and when no
//!   image file is configured
//! - [`FileStorage`]: a RAM image mirrored to a file on [`Storage::commit`]

use crate::error::{StorageError, StorageResult};
use std::path::{Path, PathBuf};

/// Value of an erased storage byte.
pub const ERASED: u8 = 0xFF;

/// Byte-addressed persistent storage.
pub trait Storage: Send {
    /// Total number of addressable bytes
    fn capacity(&self) -> usize;

    /// Read one byte
    fn read(&self, address: usize) -> StorageResult<u8>;

    /// Write one byte
    fn write(&mut self, address: usize, value: u8) -> StorageResult<()>;

    /// Read `buf.len()` bytes starting at `address`
    fn read_block(&self, address: usize, buf: &mut [u8]) -> StorageResult<()> {
        for (offset, byte) in buf.iter_mut().enumerate() {
            *byte = self.read(address + offset)?;
        }
        Ok(())
    }

    /// Write `data` starting at `address`
    fn write_block(&mut self, address: usize, data: &[u8]) -> StorageResult<()> {
        check_range(address, data.len(), self.capacity())?;
        for (offset, byte) in data.iter().enumerate() {
            self.write(address + offset, *byte)?;
        }
        Ok(())
    }

    /// Make all previous writes durable
    fn commit(&mut self) -> StorageResult<()> {
        Ok(())
    }
}

fn check_range(address: usize, len: usize, capacity: usize) -> StorageResult<()> {
    if address + len > capacity {
        return Err(StorageError::AddressOutOfBounds {
            address: address + len - 1,
            capacity,
        });
    }
    Ok(())
}

/// Volatile storage held in memory.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    bytes: Vec<u8>,
}

impl MemoryStorage {
    /// Create an erased storage of `size` bytes
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![ERASED; size],
        }
    }

    /// Borrow the raw image
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Storage for MemoryStorage {
    fn capacity(&self) -> usize {
        self.bytes.len()
    }

    fn read(&self, address: usize) -> StorageResult<u8> {
        self.bytes
            .get(address)
            .copied()
            .ok_or(StorageError::AddressOutOfBounds {
                address,
                capacity: self.bytes.len(),
            })
    }

    fn write(&mut self, address: usize, value: u8) -> StorageResult<()> {
        let capacity = self.bytes.len();
        let byte = self
            .bytes
            .get_mut(address)
            .ok_or(StorageError::AddressOutOfBounds { address, capacity })?;
        *byte = value;
        Ok(())
    }

    fn read_block(&self, address: usize, buf: &mut [u8]) -> StorageResult<()> {
        check_range(address, buf.len(), self.bytes.len())?;
        buf.copy_from_slice(&self.bytes[address..address + buf.len()]);
        Ok(())
    }
}

/// Storage image backed by a file.
///
/// Reads and writes go to the in-memory image; [`Storage::commit`] writes the
/// image back to disk when it has changed.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    image: MemoryStorage,
    dirty: bool,
}

impl FileStorage {
    /// Open an image file of `size` bytes, creating an erased one if missing
    pub fn open(path: impl AsRef<Path>, size: usize) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        let image = if path.exists() {
            let bytes = std::fs::read(&path)?;
            if bytes.len() != size {
                return Err(StorageError::ImageSizeMismatch {
                    expected: size,
                    found: bytes.len(),
                });
            }
            tracing::debug!("Loaded storage image {} ({} bytes)", path.display(), size);
            MemoryStorage { bytes }
        } else {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let image = MemoryStorage::new(size);
            std::fs::write(&path, image.as_bytes())?;
            tracing::info!("Created erased storage image {}", path.display());
            image
        };

        Ok(Self {
            path,
            image,
            dirty: false,
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when there are writes not yet committed
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl Storage for FileStorage {
    fn capacity(&self) -> usize {
        self.image.capacity()
    }

    fn read(&self, address: usize) -> StorageResult<u8> {
        self.image.read(address)
    }

    fn write(&mut self, address: usize, value: u8) -> StorageResult<()> {
        self.image.write(address, value)?;
        self.dirty = true;
        Ok(())
    }

    fn read_block(&self, address: usize, buf: &mut [u8]) -> StorageResult<()> {
        self.image.read_block(address, buf)
    }

    fn commit(&mut self) -> StorageResult<()> {
        if self.dirty {
            std::fs::write(&self.path, self.image.as_bytes())?;
            self.dirty = false;
            tracing::debug!("Committed storage image {}", self.path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_starts_erased() {
        let storage = MemoryStorage::new(16);
        assert_eq!(storage.capacity(), 16);
        assert!(storage.as_bytes().iter().all(|&b| b == ERASED));
    }

    #[test]
    fn test_memory_storage_bounds() {
        let mut storage = MemoryStorage::new(4);
        assert!(storage.write(3, 1).is_ok());
        assert!(matches!(
            storage.write(4, 1),
            Err(StorageError::AddressOutOfBounds { address: 4, capacity: 4 })
        ));
        assert!(storage.read(4).is_err());
    }

    #[test]
    fn test_block_write_is_all_or_nothing() {
        let mut storage = MemoryStorage::new(4);
        assert!(storage.write_block(2, &[1, 2, 3]).is_err());
        assert_eq!(storage.as_bytes(), &[ERASED; 4]);

        storage.write_block(1, &[1, 2, 3]).unwrap();
        let mut buf = [0u8; 3];
        storage.read_block(1, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);
    }
}
