//! Keypad jog settings

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::SettingsError;

/// Current settings layout version
pub const JOG_SETTINGS_VERSION: u8 = 1;

/// Host setting ids for the jog parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum JogSettingId {
    StepSpeed = 50,
    SlowSpeed = 51,
    FastSpeed = 52,
    StepDistance = 53,
    SlowDistance = 54,
    FastDistance = 55,
}

impl JogSettingId {
    pub fn from_id(id: u16) -> Option<Self> {
        use JogSettingId::*;

        Some(match id {
            50 => StepSpeed,
            51 => SlowSpeed,
            52 => FastSpeed,
            53 => StepDistance,
            54 => SlowDistance,
            55 => FastDistance,
            _ => return None,
        })
    }
}

/// Jog speeds (mm/min) and distances (mm) per jog mode
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JogSettings {
    /// Layout version
    pub version: u8,
    pub step_speed: f32,
    pub slow_speed: f32,
    pub fast_speed: f32,
    pub step_distance: f32,
    pub slow_distance: f32,
    pub fast_distance: f32,
}

impl Default for JogSettings {
    fn default() -> Self {
        Self {
            version: JOG_SETTINGS_VERSION,
            step_speed: 100.0,
            slow_speed: 600.0,
            fast_speed: 3000.0,
            step_distance: 0.25,
            slow_distance: 500.0,
            fast_distance: 3000.0,
        }
    }
}

impl JogSettings {
    pub fn get(&self, id: JogSettingId) -> f32 {
        match id {
            JogSettingId::StepSpeed => self.step_speed,
            JogSettingId::SlowSpeed => self.slow_speed,
            JogSettingId::FastSpeed => self.fast_speed,
            JogSettingId::StepDistance => self.step_distance,
            JogSettingId::SlowDistance => self.slow_distance,
            JogSettingId::FastDistance => self.fast_distance,
        }
    }

    /// Update one parameter
    ///
    /// Speeds and distances must be positive and finite.
    pub fn set(&mut self, id: JogSettingId, value: f32) -> Result<(), SettingsError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(SettingsError::InvalidValue);
        }

        let field = match id {
            JogSettingId::StepSpeed => &mut self.step_speed,
            JogSettingId::SlowSpeed => &mut self.slow_speed,
            JogSettingId::FastSpeed => &mut self.fast_speed,
            JogSettingId::StepDistance => &mut self.step_distance,
            JogSettingId::SlowDistance => &mut self.slow_distance,
            JogSettingId::FastDistance => &mut self.fast_distance,
        };
        *field = value;

        Ok(())
    }
}
