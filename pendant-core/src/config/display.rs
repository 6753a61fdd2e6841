//! Display plugin settings
//!
//! Compile-time configuration for the I2C status display; nothing here is
//! persisted.

/// Default I2C address of the display (shared with the keypad)
pub const DISPLAY_I2C_ADDRESS: u8 = 0x49;

/// Display refresh timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplaySettings {
    /// 7-bit I2C address
    pub address: u8,
    /// Regular refresh interval (ms)
    pub refresh_ms: u32,
    /// Refresh interval while jogging (ms)
    pub jog_refresh_ms: u32,
    /// Delay before an event-triggered refresh (ms)
    pub update_now_ms: u32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            address: DISPLAY_I2C_ADDRESS,
            refresh_ms: 300,
            jog_refresh_ms: 100,
            update_now_ms: 20,
        }
    }
}
