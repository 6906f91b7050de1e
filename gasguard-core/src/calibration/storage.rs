//! Byte-addressable non-volatile storage backends
//!
//! The calibration store needs very little from its backend: fixed capacity,
//! read a range, write a range. On the device that is the MCU's EEPROM; on
//! a host it is an image file; in tests it is an array.

use crate::errors::{StorageError, StorageResult};

/// Fixed-size, byte-addressable persistent store
pub trait NvStorage {
    /// Total size in bytes
    fn capacity(&self) -> usize;

    /// Fill `buf` from `address`
    fn read(&mut self, address: usize, buf: &mut [u8]) -> StorageResult<()>;

    /// Write `bytes` starting at `address`
    ///
    /// Implementations must not touch bytes outside the written range.
    fn write(&mut self, address: usize, bytes: &[u8]) -> StorageResult<()>;
}

fn check_bounds(address: usize, len: usize, capacity: usize) -> StorageResult<()> {
    match address.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(StorageError::OutOfBounds { address, len, capacity }),
    }
}

/// RAM-backed store that starts erased (all `0xFF`), like fresh EEPROM
///
/// Supports fault injection so power-loss and write-failure paths can be
/// exercised without hardware.
#[derive(Debug, Clone)]
pub struct MemoryStorage<const N: usize> {
    bytes: [u8; N],
    fail_writes: bool,
    tear_after: Option<usize>,
    writes: u32,
}

impl<const N: usize> MemoryStorage<N> {
    /// Erased store
    pub const fn new() -> Self {
        Self {
            bytes: [0xFF; N],
            fail_writes: false,
            tear_after: None,
            writes: 0,
        }
    }

    /// Store with preset contents
    pub const fn from_bytes(bytes: [u8; N]) -> Self {
        Self {
            bytes,
            fail_writes: false,
            tear_after: None,
            writes: 0,
        }
    }

    /// Make every following write fail without touching memory
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Simulate a power cut: the next write stores only `bytes` bytes
    pub fn tear_next_write(&mut self, bytes: usize) {
        self.tear_after = Some(bytes);
    }

    /// Raw contents
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    /// Number of successful writes
    pub fn write_count(&self) -> u32 {
        self.writes
    }
}

impl<const N: usize> Default for MemoryStorage<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> NvStorage for MemoryStorage<N> {
    fn capacity(&self) -> usize {
        N
    }

    fn read(&mut self, address: usize, buf: &mut [u8]) -> StorageResult<()> {
        check_bounds(address, buf.len(), N)?;
        buf.copy_from_slice(&self.bytes[address..address + buf.len()]);
        Ok(())
    }

    fn write(&mut self, address: usize, bytes: &[u8]) -> StorageResult<()> {
        check_bounds(address, bytes.len(), N)?;

        if self.fail_writes {
            return Err(StorageError::WriteFailed);
        }

        if let Some(written) = self.tear_after.take() {
            let written = written.min(bytes.len());
            self.bytes[address..address + written].copy_from_slice(&bytes[..written]);
            return Err(StorageError::WriteFailed);
        }

        self.bytes[address..address + bytes.len()].copy_from_slice(bytes);
        self.writes = self.writes.saturating_add(1);
        Ok(())
    }
}

/// Host file holding a fixed-size storage image (requires std)
///
/// Every write rewrites the image into a sibling temporary file, syncs it and
/// renames it over the original. A crash at any point leaves either the old
/// or the new image on disk, never a mix.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: std::path::PathBuf,
    capacity: usize,
}

#[cfg(feature = "std")]
impl FileStorage {
    /// Open `path`, creating an erased image of `capacity` bytes if missing
    ///
    /// A shorter existing image is padded with erased bytes.
    pub fn open(path: impl AsRef<std::path::Path>, capacity: usize) -> StorageResult<Self> {
        let storage = Self {
            path: path.as_ref().to_path_buf(),
            capacity,
        };

        let image = match std::fs::read(&storage.path) {
            Ok(image) => image,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(_) => return Err(StorageError::Io { reason: "open image" }),
        };

        if image.len() != capacity {
            let mut resized = image;
            resized.resize(capacity, 0xFF);
            storage.replace_image(&resized)?;
        }

        Ok(storage)
    }

    /// Path of the image file
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Sibling of the image with `.tmp` appended to the full file name
    fn temp_path(&self) -> std::path::PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        std::path::PathBuf::from(name)
    }

    fn read_image(&self) -> StorageResult<Vec<u8>> {
        let image = std::fs::read(&self.path)
            .map_err(|_| StorageError::Io { reason: "read image" })?;
        if image.len() != self.capacity {
            return Err(StorageError::Io { reason: "image size changed" });
        }
        Ok(image)
    }

    fn replace_image(&self, image: &[u8]) -> StorageResult<()> {
        use std::io::Write;

        let tmp = self.temp_path();
        let mut file = std::fs::File::create(&tmp)
            .map_err(|_| StorageError::Io { reason: "create temp image" })?;
        file.write_all(image)
            .map_err(|_| StorageError::WriteFailed)?;
        file.sync_all()
            .map_err(|_| StorageError::Io { reason: "sync temp image" })?;
        drop(file);

        std::fs::rename(&tmp, &self.path)
            .map_err(|_| StorageError::Io { reason: "replace image" })
    }
}

#[cfg(feature = "std")]
impl NvStorage for FileStorage {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn read(&mut self, address: usize, buf: &mut [u8]) -> StorageResult<()> {
        check_bounds(address, buf.len(), self.capacity)?;
        let image = self.read_image()?;
        buf.copy_from_slice(&image[address..address + buf.len()]);
        Ok(())
    }

    fn write(&mut self, address: usize, bytes: &[u8]) -> StorageResult<()> {
        check_bounds(address, bytes.len(), self.capacity)?;
        let mut image = self.read_image()?;
        image[address..address + bytes.len()].copy_from_slice(bytes);
        self.replace_image(&image)
    }
}
