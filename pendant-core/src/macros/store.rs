//! Macro store
//!
//! Owns the macro slot settings together with the runtime port bindings
//! derived from them. Settings edits made while a macro is running do not
//! affect that run; the engine works on its own copy of the text.

use pendant_hal::{AuxInputs, InputConfig, IrqMode, PullMode};

use crate::config::macros::{MacroSettingId, TriggerAction};
use crate::config::{MacroSettings, MacroText, SettingsError, MAX_MACROS};

use super::trigger::TriggerTable;

#[cfg(feature = "serde")]
use crate::config::persist::{load_settings, save_settings, PersistError};
#[cfg(feature = "serde")]
use pendant_hal::{FlashError, FlashStorage};

/// Description registered with the host when claiming a port
pub const PORT_DESCRIPTION: &str = "Macro pin";

/// Value of a setting addressed by host id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingValue<'a> {
    Text(&'a str),
    Integer(i32),
}

/// Macro slots plus their claimed trigger ports
#[derive(Debug, Clone)]
pub struct MacroStore {
    settings: MacroSettings,
    /// Slots exposed through the settings interface
    n_macros: u8,
    /// Highest port accepted by the port settings, `None` without port mapping
    max_port: Option<u8>,
    /// Ports successfully claimed with interrupts enabled
    claimed: [Option<u8>; MAX_MACROS],
}

impl MacroStore {
    /// Create a store with empty slots
    ///
    /// With port mapping available the number of usable slots is limited by
    /// the number of input ports.
    pub fn new(aux: &impl AuxInputs) -> Self {
        let available = aux.available();
        let n_macros = if available == 0 {
            MAX_MACROS as u8
        } else {
            available.min(MAX_MACROS as u8)
        };

        Self {
            settings: MacroSettings::default(),
            n_macros,
            max_port: (available > 0).then(|| aux.find_free(None)).flatten(),
            claimed: [None; MAX_MACROS],
        }
    }

    pub fn n_macros(&self) -> u8 {
        self.n_macros
    }

    pub fn settings(&self) -> &MacroSettings {
        &self.settings
    }

    /// Macro text of `slot`
    pub fn content(&self, slot: u8) -> Result<&MacroText, SettingsError> {
        Ok(&self.settings.slot(slot)?.content)
    }

    pub fn get(&self, slot: u8) -> Result<&str, SettingsError> {
        self.settings.get(slot)
    }

    pub fn set(&mut self, slot: u8, text: &str) -> Result<(), SettingsError> {
        self.settings.set(slot, text)
    }

    /// Check if a setting id is exposed to the user
    ///
    /// Only the first `n_macros` slots are exposed. Port settings also
    /// require port mapping.
    pub fn setting_available(&self, id: u16) -> bool {
        match MacroSettingId::parse(id) {
            Some(MacroSettingId::Port(slot)) => self.max_port.is_some() && slot < self.n_macros,
            Some(setting) => setting.slot() < self.n_macros,
            None => false,
        }
    }

    /// Read a setting by host id
    pub fn get_setting(&self, id: u16) -> Result<SettingValue<'_>, SettingsError> {
        match MacroSettingId::parse(id).ok_or(SettingsError::UnknownSetting)? {
            MacroSettingId::Content(slot) => Ok(SettingValue::Text(self.settings.get(slot)?)),
            MacroSettingId::Port(slot) => Ok(SettingValue::Integer(
                self.settings.port_setting(slot, self.max_port)? as i32,
            )),
            MacroSettingId::Action(slot) => Ok(SettingValue::Integer(
                self.settings.slot(slot)?.action.index() as i32,
            )),
        }
    }

    /// Write a setting by host id
    ///
    /// Port changes take effect after the next restart.
    pub fn set_setting(
        &mut self,
        id: u16,
        value: SettingValue<'_>,
        aux: &impl AuxInputs,
    ) -> Result<(), SettingsError> {
        let setting = MacroSettingId::parse(id).ok_or(SettingsError::UnknownSetting)?;

        match (setting, value) {
            (MacroSettingId::Content(slot), SettingValue::Text(text)) => self.settings.set(slot, text),
            (MacroSettingId::Port(slot), SettingValue::Integer(port)) => {
                let port = i16::try_from(port).map_err(|_| SettingsError::InvalidPort)?;
                self.settings.set_port(slot, port, aux)
            }
            (MacroSettingId::Action(slot), SettingValue::Integer(index)) => {
                let index = u8::try_from(index).map_err(|_| SettingsError::InvalidAction)?;
                self.settings.set_action(slot, index)
            }
            _ => Err(SettingsError::InvalidValue),
        }
    }

    /// Reset all slots to defaults
    pub fn restore_defaults(&mut self, aux: &impl AuxInputs) {
        self.settings.restore_defaults(aux, self.n_macros);
    }

    /// Claim the trigger ports and enable their interrupts
    ///
    /// A port that cannot raise falling-edge interrupts, cannot be claimed
    /// or refuses the interrupt is left unbound for this session. Returns
    /// false if any bound port failed.
    pub fn claim_ports(&mut self, aux: &mut impl AuxInputs) -> bool {
        let mut all_ok = true;

        for slot in (0..self.n_macros as usize).rev() {
            self.claimed[slot] = None;

            let Some(port) = self.settings.slots[slot].port else {
                continue;
            };

            if claim_port(aux, port) {
                self.claimed[slot] = Some(port);
            } else {
                warn!("Macro {}: could not claim port {}", slot, port);
                all_ok = false;
            }
        }

        all_ok
    }

    /// Claimed port of `slot`
    pub fn claimed_port(&self, slot: u8) -> Option<u8> {
        self.claimed.get(slot as usize).copied().flatten()
    }

    /// Port bindings for the interrupt handler
    pub fn trigger_table(&self) -> TriggerTable {
        TriggerTable::new(core::array::from_fn(|slot| {
            self.claimed[slot].map(|port| (port, self.action(slot)))
        }))
    }

    fn action(&self, slot: usize) -> TriggerAction {
        self.settings.slots[slot].action
    }

    /// Load settings from storage
    ///
    /// Missing, corrupt or outdated settings are replaced by defaults,
    /// which are written back. Returns true if defaults were restored.
    #[cfg(feature = "serde")]
    pub async fn load<S: FlashStorage>(&mut self, storage: &mut S, aux: &impl AuxInputs) -> bool {
        match load_settings::<MacroSettings, S>(storage).await {
            Ok(settings) => {
                info!("Loaded macro settings from flash");
                self.settings = settings;
                return false;
            }
            Err(PersistError::Flash(FlashError::NotFound)) => {
                debug!("No macro settings in flash, using defaults");
            }
            Err(e) => {
                warn!("Failed to load macro settings: {:?}, using defaults", e);
            }
        }

        self.restore_defaults(aux);
        if let Err(e) = self.save(storage).await {
            warn!("Failed to save macro settings: {:?}", e);
        }

        true
    }

    /// Save settings to storage
    #[cfg(feature = "serde")]
    pub async fn save<S: FlashStorage>(&self, storage: &mut S) -> Result<(), PersistError> {
        save_settings(storage, &self.settings).await
    }
}

/// Claim one input port for a macro trigger
fn claim_port(aux: &mut impl AuxInputs, port: u8) -> bool {
    let Some(caps) = aux.caps(port) else {
        return false;
    };

    if !caps.irq_falling || !aux.claim(port, PORT_DESCRIPTION) {
        return false;
    }

    if caps.debounce {
        aux.configure(
            port,
            InputConfig {
                debounce: true,
                pull_mode: PullMode::Up,
            },
        );
    }

    aux.enable_irq(port, IrqMode::Falling)
}
