//! Settings storage abstractions
//!
//! The host controller reserves a block of non-volatile storage for each
//! plugin. Plugins address their block by [`StorageKey`] and store a
//! postcard-encoded settings struct in it.

/// Storage keys for plugin settings
///
/// Each plugin owns exactly one key. The storage implementation is
/// responsible for integrity checking; a block that fails its check is
/// reported as [`FlashError::Corrupted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Macro slots (content, trigger port, trigger action)
    MacroSettings = 0,
    /// Keypad jog speeds and distances
    JogSettings = 1,
}

impl StorageKey {
    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::MacroSettings),
            1 => Some(StorageKey::JogSettings),
            _ => None,
        }
    }
}

/// Errors from settings storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Low-level flash access failed
    Flash,
    /// Storage layer failed
    Storage,
    /// Nothing stored under the key
    NotFound,
    /// Buffer too small for the stored data
    BufferTooSmall,
    /// Stored block failed its integrity check
    Corrupted,
    /// No room left for the write
    Full,
}

/// Persistent key-value storage
///
/// Mirrors the host's NVS transfer interface: a block is read or written
/// as a whole.
pub trait FlashStorage {
    /// Read the block stored under `key` into `buffer`
    ///
    /// Returns the number of bytes read.
    fn read(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, FlashError>>;

    /// Replace the block stored under `key`
    fn write(
        &mut self,
        key: StorageKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), FlashError>>;

    /// Check if a block exists for `key`
    fn exists(&mut self, key: StorageKey) -> impl core::future::Future<Output = bool>;
}

// Implement the sequential-storage Key trait when the feature is enabled
#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        let Some(slot) = buffer.first_mut() else {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        };
        *slot = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        match buffer.first().copied().map(StorageKey::from_u8) {
            Some(Some(key)) => Ok((key, 1)),
            Some(None) => Err(sequential_storage::map::SerializationError::InvalidFormat),
            None => Err(sequential_storage::map::SerializationError::BufferTooSmall),
        }
    }
}
