//! Storage abstraction for the init code blob
//!
//! The controller needs its vendor init code streamed in at boot. Where that
//! blob lives (SD card, SPI flash, baked into the firmware image) is up to the
//! board, so the driver only asks for something that can open a file by path
//! and read it sequentially.

use core::fmt::Debug;

/// Storage trait for file system access
pub trait Storage {
    /// Error type
    type Error: Debug;
    /// File type, closed when dropped
    type File: embedded_io::Read;

    /// Open file for reading
    fn open(&mut self, path: &str) -> Result<Self::File, Self::Error>;
}

/// Error returned by [`MemoryStorage`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryStorageError {
    /// No file with this path
    NotFound,
}

impl core::fmt::Display for MemoryStorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "File not found"),
        }
    }
}

impl core::error::Error for MemoryStorageError {}

/// Single file held in memory
///
/// Serves an init code blob linked into the firmware, e.g. with
/// `include_bytes!`.
///
/// ```rust
/// use s1d135xx::{MemoryStorage, Storage, command::INIT_CODE_PATH};
///
/// static ECODE: [u8; 4] = [0xDE, 0xAD, 0xBE, 0xEF];
/// let mut storage = MemoryStorage::new(INIT_CODE_PATH, &ECODE);
/// assert!(storage.open(INIT_CODE_PATH).is_ok());
/// assert!(storage.open("bin/other.bin").is_err());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct MemoryStorage<'a> {
    path: &'a str,
    data: &'a [u8],
}

impl<'a> MemoryStorage<'a> {
    /// Create a storage serving `data` under `path`
    pub const fn new(path: &'a str, data: &'a [u8]) -> Self {
        Self { path, data }
    }
}

impl<'a> Storage for MemoryStorage<'a> {
    type Error = MemoryStorageError;
    type File = &'a [u8];

    fn open(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        if path == self.path {
            Ok(self.data)
        } else {
            Err(MemoryStorageError::NotFound)
        }
    }
}
