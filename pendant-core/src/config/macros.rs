//! Macro slot settings
//!
//! Each slot holds the macro text, the aux input port that triggers it and
//! the action taken when that port fires. Settings are addressed by the
//! host's numeric setting ids:
//!
//! | Ids       | Setting                              |
//! |-----------|--------------------------------------|
//! | 490 - 497 | Macro content, blocks separated by `|` |
//! | 500 - 507 | Trigger port, -1 disables            |
//! | 590 - 597 | Trigger action (radio button index)  |

use heapless::String;
use pendant_hal::AuxInputs;
use pendant_protocol::RealtimeCommand;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::SettingsError;

/// Number of macro slots
pub const MAX_MACROS: usize = 8;

/// Maximum macro text length
pub const MACRO_LENGTH_MAX: usize = 127;

/// Block separator inside macro text
pub const MACRO_DELIMITER: u8 = b'|';

/// Current settings layout version
pub const MACRO_SETTINGS_VERSION: u8 = 1;

pub const SETTING_MACRO_BASE: u16 = 490;
pub const SETTING_MACRO_PORT_BASE: u16 = 500;
pub const SETTING_BUTTON_ACTION_BASE: u16 = 590;

/// Radio button labels for the trigger action setting
pub const TRIGGER_ACTION_LABELS: &str = "Macro,Cycle start,Feed hold,Park,Reset,\
Spindle stop (during feed hold),Mist toggle,Flood toggle,Probe connected toggle,\
Optional stop toggle,Single block mode toggle";

/// Macro text storage
pub type MacroText = String<MACRO_LENGTH_MAX>;

/// Action taken when a macro's trigger port fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum TriggerAction {
    /// Run the macro text
    #[default]
    RunMacro = 0,
    CycleStart = 1,
    FeedHold = 2,
    /// Park via the safety door sequence
    Park = 3,
    Reset = 4,
    /// Spindle stop, only honored during feed hold
    SpindleStopOnHold = 5,
    MistToggle = 6,
    FloodToggle = 7,
    ProbeConnectedToggle = 8,
    OptionalStopToggle = 9,
    SingleBlockToggle = 10,
}

impl TriggerAction {
    /// Number of selectable actions
    pub const COUNT: u8 = 11;

    /// Realtime command issued instead of running the macro
    ///
    /// `None` for [`TriggerAction::RunMacro`].
    pub fn realtime_command(self) -> Option<RealtimeCommand> {
        let cmd = match self {
            TriggerAction::RunMacro => return None,
            TriggerAction::CycleStart => RealtimeCommand::CycleStart,
            TriggerAction::FeedHold => RealtimeCommand::FeedHold,
            TriggerAction::Park => RealtimeCommand::SafetyDoor,
            TriggerAction::Reset => RealtimeCommand::Reset,
            TriggerAction::SpindleStopOnHold => RealtimeCommand::SpindleStop,
            TriggerAction::MistToggle => RealtimeCommand::CoolantMistToggle,
            TriggerAction::FloodToggle => RealtimeCommand::CoolantFloodToggle,
            TriggerAction::ProbeConnectedToggle => RealtimeCommand::ProbeConnectedToggle,
            TriggerAction::OptionalStopToggle => RealtimeCommand::OptionalStopToggle,
            TriggerAction::SingleBlockToggle => RealtimeCommand::SingleBlockToggle,
        };

        Some(cmd)
    }

    pub fn from_index(index: u8) -> Option<Self> {
        use TriggerAction::*;

        Some(match index {
            0 => RunMacro,
            1 => CycleStart,
            2 => FeedHold,
            3 => Park,
            4 => Reset,
            5 => SpindleStopOnHold,
            6 => MistToggle,
            7 => FloodToggle,
            8 => ProbeConnectedToggle,
            9 => OptionalStopToggle,
            10 => SingleBlockToggle,
            _ => return None,
        })
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

/// One macro slot
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MacroSlot {
    /// Macro text, empty when unassigned
    pub content: MacroText,
    /// Aux input port that triggers the slot
    pub port: Option<u8>,
    /// What the trigger port does
    pub action: TriggerAction,
}

impl MacroSlot {
    /// Check if the slot has no macro text
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// All macro slots
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MacroSettings {
    /// Layout version
    pub version: u8,
    pub slots: [MacroSlot; MAX_MACROS],
}

impl Default for MacroSettings {
    fn default() -> Self {
        Self {
            version: MACRO_SETTINGS_VERSION,
            slots: core::array::from_fn(|_| MacroSlot::default()),
        }
    }
}

impl MacroSettings {
    pub fn slot(&self, slot: u8) -> Result<&MacroSlot, SettingsError> {
        self.slots
            .get(slot as usize)
            .ok_or(SettingsError::InvalidSlot)
    }

    fn slot_mut(&mut self, slot: u8) -> Result<&mut MacroSlot, SettingsError> {
        self.slots
            .get_mut(slot as usize)
            .ok_or(SettingsError::InvalidSlot)
    }

    /// Macro text of `slot`
    pub fn get(&self, slot: u8) -> Result<&str, SettingsError> {
        Ok(self.slot(slot)?.content.as_str())
    }

    /// Replace the macro text of `slot`
    ///
    /// Text longer than [`MACRO_LENGTH_MAX`] is rejected and the slot keeps
    /// its current content.
    pub fn set(&mut self, slot: u8, text: &str) -> Result<(), SettingsError> {
        let content = MacroText::try_from(text).map_err(|_| SettingsError::TooLong)?;
        self.slot_mut(slot)?.content = content;
        Ok(())
    }

    /// Bind `slot` to an aux input port
    ///
    /// A negative `port` removes the binding. The port must still be
    /// claimable; an already claimed port is rejected.
    pub fn set_port(
        &mut self,
        slot: u8,
        port: i16,
        aux: &impl AuxInputs,
    ) -> Result<(), SettingsError> {
        // Slot errors take precedence over port errors
        self.slot(slot)?;

        let port = if port < 0 {
            None
        } else {
            let port = u8::try_from(port).map_err(|_| SettingsError::InvalidPort)?;
            if !aux.is_claimable(port) {
                return Err(SettingsError::PortUnavailable);
            }
            Some(port)
        };

        self.slot_mut(slot)?.port = port;
        Ok(())
    }

    /// Trigger port of `slot` for display, -1 when unbound
    ///
    /// Ports beyond `max_port` are reported as unbound.
    pub fn port_setting(&self, slot: u8, max_port: Option<u8>) -> Result<i16, SettingsError> {
        let port = self.slot(slot)?.port;
        Ok(match (port, max_port) {
            (Some(p), Some(max)) if p <= max => p as i16,
            _ => -1,
        })
    }

    /// Set the trigger action by radio button index
    pub fn set_action(&mut self, slot: u8, index: u8) -> Result<(), SettingsError> {
        let action = TriggerAction::from_index(index).ok_or(SettingsError::InvalidAction)?;
        self.slot_mut(slot)?.action = action;
        Ok(())
    }

    /// Reset every slot to empty and assign trigger ports
    ///
    /// With port mapping available the last active slot gets the highest
    /// free input port and each earlier slot the next free port below the
    /// one after it, so macros end up on the trailing ports in order.
    pub fn restore_defaults(&mut self, aux: &impl AuxInputs, n_macros: u8) {
        *self = Self::default();

        let n = (n_macros as usize).min(MAX_MACROS);
        if n == 0 || aux.available() == 0 {
            return;
        }

        let mut below = None;
        for slot in self.slots[..n].iter_mut().rev() {
            let Some(port) = aux.find_free(below) else {
                break;
            };
            slot.port = Some(port);
            below = Some(port);
        }
    }
}

/// Setting addressed by a host setting id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacroSettingId {
    Content(u8),
    Port(u8),
    Action(u8),
}

impl MacroSettingId {
    /// Decode a host setting id
    pub fn parse(id: u16) -> Option<Self> {
        let (base, make): (u16, fn(u8) -> Self) = match id {
            490..=499 => (SETTING_MACRO_BASE, MacroSettingId::Content),
            500..=509 => (SETTING_MACRO_PORT_BASE, MacroSettingId::Port),
            590..=599 => (SETTING_BUTTON_ACTION_BASE, MacroSettingId::Action),
            _ => return None,
        };

        let offset = id - base;
        (offset < MAX_MACROS as u16).then(|| make(offset as u8))
    }

    pub fn id(self) -> u16 {
        match self {
            MacroSettingId::Content(n) => SETTING_MACRO_BASE + n as u16,
            MacroSettingId::Port(n) => SETTING_MACRO_PORT_BASE + n as u16,
            MacroSettingId::Action(n) => SETTING_BUTTON_ACTION_BASE + n as u16,
        }
    }

    /// Slot the setting belongs to
    pub fn slot(self) -> u8 {
        match self {
            MacroSettingId::Content(n) | MacroSettingId::Port(n) | MacroSettingId::Action(n) => n,
        }
    }
}

/// Map a per-slot setting id to its group base id
///
/// Ids outside the macro groups are returned unchanged.
pub fn normalize_setting_id(id: u16) -> u16 {
    let in_group = |base: u16| id > base && id < base + MAX_MACROS as u16;

    if in_group(SETTING_MACRO_BASE)
        || in_group(SETTING_MACRO_PORT_BASE)
        || in_group(SETTING_BUTTON_ACTION_BASE)
    {
        id - id % 10
    } else {
        id
    }
}
