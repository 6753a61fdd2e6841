//! Settings persistence
//!
//! Settings structs are postcard-encoded with their layout version as the
//! first byte. Erased storage, undecodable data and other versions are all
//! reported as errors; callers fall back to defaults.

use pendant_hal::{FlashError, FlashStorage, StorageKey};
use serde::{de::DeserializeOwned, Serialize};

use super::jog::{JogSettings, JOG_SETTINGS_VERSION};
use super::macros::{MacroSettings, MACRO_SETTINGS_VERSION};

/// Maximum serialized settings size
pub const MAX_SETTINGS_SIZE: usize = 1280;

/// Byte value of erased flash
const ERASED: u8 = 0xFF;

/// Settings persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistError {
    /// Storage operation failed
    Flash(FlashError),
    /// Serialization failed
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Stored layout version differs from the current one
    VersionMismatch,
}

impl From<FlashError> for PersistError {
    fn from(e: FlashError) -> Self {
        PersistError::Flash(e)
    }
}

/// Settings struct stored under its own key
pub trait Persisted: Serialize + DeserializeOwned {
    /// Storage key owned by the settings
    const KEY: StorageKey;
    /// Current layout version
    const VERSION: u8;
}

impl Persisted for MacroSettings {
    const KEY: StorageKey = StorageKey::MacroSettings;
    const VERSION: u8 = MACRO_SETTINGS_VERSION;
}

impl Persisted for JogSettings {
    const KEY: StorageKey = StorageKey::JogSettings;
    const VERSION: u8 = JOG_SETTINGS_VERSION;
}

/// Load settings from storage
pub async fn load_settings<T: Persisted, S: FlashStorage>(storage: &mut S) -> Result<T, PersistError> {
    let mut buffer = [0u8; MAX_SETTINGS_SIZE];
    let len = storage.read(T::KEY, &mut buffer).await?;
    let data = buffer
        .get(..len)
        .ok_or(PersistError::Flash(FlashError::BufferTooSmall))?;

    debug!("Read {} bytes of {:?} from flash", len, T::KEY);

    if data.iter().all(|b| *b == ERASED) {
        return Err(PersistError::Flash(FlashError::NotFound));
    }

    if data[0] != T::VERSION {
        warn!("Settings version mismatch: found {}, expected {}", data[0], T::VERSION);
        return Err(PersistError::VersionMismatch);
    }

    postcard::from_bytes(data).map_err(|_| PersistError::Deserialize)
}

/// Save settings to storage
pub async fn save_settings<T: Persisted, S: FlashStorage>(
    storage: &mut S,
    settings: &T,
) -> Result<(), PersistError> {
    let mut buffer = [0u8; MAX_SETTINGS_SIZE];
    let bytes = postcard::to_slice(settings, &mut buffer).map_err(|_| PersistError::Serialize)?;

    debug!("Saving {} bytes of {:?} to flash", bytes.len(), T::KEY);

    storage.write(T::KEY, bytes).await?;

    Ok(())
}
