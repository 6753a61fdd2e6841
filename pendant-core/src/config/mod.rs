//! Plugin settings
//!
//! Typed settings structures, stored as postcard binary data under one
//! storage key per plugin.

pub mod display;
pub mod jog;
pub mod macros;
#[cfg(feature = "serde")]
pub mod persist;

pub use display::DisplaySettings;
pub use jog::{JogSettings, JogSettingId};
pub use macros::{
    normalize_setting_id, MacroSettingId, MacroSettings, MacroSlot, MacroText, TriggerAction,
    MACRO_DELIMITER, MACRO_LENGTH_MAX, MAX_MACROS,
};
#[cfg(feature = "serde")]
pub use persist::{load_settings, save_settings, PersistError, Persisted};

/// Setting validation errors
///
/// A rejected setting leaves the stored value unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// Text exceeds the slot capacity
    TooLong,
    /// Slot number out of range
    InvalidSlot,
    /// Port number out of range
    InvalidPort,
    /// Port does not exist or is claimed by someone else
    PortUnavailable,
    /// Action index out of range
    InvalidAction,
    /// Setting id not owned by this plugin
    UnknownSetting,
    /// Value outside its allowed range
    InvalidValue,
}
