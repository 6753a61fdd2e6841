//! Foreground keypress processing

use pendant_protocol::keycodes::{self, *};
use pendant_protocol::realtime::CMD_STATUS_REPORT_LEGACY;
use pendant_protocol::RealtimeCommand;

use crate::config::JogSettings;
use crate::state::StatusCode;
use crate::traits::KeypadHost;

use super::input::KeypadInput;
use super::jog::{JogData, JogMode};

#[cfg(feature = "serde")]
use crate::config::persist::{load_settings, save_settings, PersistError};
#[cfg(feature = "serde")]
use pendant_hal::{FlashError, FlashStorage};

/// Name shown in the plugin report
pub const PLUGIN_NAME: &str = "Keypad";

/// Version shown in the plugin report
pub const PLUGIN_VERSION: &str = "1.42";

/// Version shown when no keypad answered at startup
const PLUGIN_VERSION_DISCONNECTED: &str = "1.42 (not connected)";

/// I2C address of the keypad
pub const KEYPAD_I2C_ADDRESS: u8 = 0x49;

/// Work coordinate systems selected by the next-WCS key, G54 first
const COORD_SYSTEMS: [&str; 9] = [
    "G54", "G55", "G56", "G57", "G58", "G59", "G59.1", "G59.2", "G59.3",
];

/// What processing a keypress did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyOutcome {
    /// No key was pending
    Idle,
    /// Key not allowed in alarm state
    Blocked(u8),
    /// Key consumed by a preview handler
    Previewed(u8),
    /// Realtime command queued
    Realtime(RealtimeCommand),
    /// MPG mode toggle requested; false if the host has no MPG mode
    MpgToggled(bool),
    /// Jog mode changed; jog data changed as well
    JogModeChanged(JogMode),
    /// Jog modifier changed
    JogDataChanged,
    /// G-code block queued, or rejected by the host
    Gcode(bool),
    /// System command executed
    System(StatusCode),
    /// Jog command queued, or rejected by the host
    Jog(bool),
    /// Jog key already released, command not sent
    JogSkipped,
    /// Key code without function
    Unknown(u8),
}

/// Keypad plugin
#[derive(Debug, Clone)]
pub struct Keypad {
    jog: JogData,
}

impl Default for Keypad {
    fn default() -> Self {
        Self::new(JogSettings::default())
    }
}

impl Keypad {
    pub fn new(settings: JogSettings) -> Self {
        Self {
            jog: JogData::new(settings),
        }
    }

    pub fn jog_data(&self) -> &JogData {
        &self.jog
    }

    pub fn settings(&self) -> &JogSettings {
        &self.jog.settings
    }

    pub fn settings_mut(&mut self) -> &mut JogSettings {
        &mut self.jog.settings
    }

    /// Name and version for the host's plugin report
    pub fn report_options(&self, connected: bool) -> (&'static str, &'static str) {
        let version = if connected {
            PLUGIN_VERSION
        } else {
            PLUGIN_VERSION_DISCONNECTED
        };

        (PLUGIN_NAME, version)
    }

    /// Load jog settings from storage
    ///
    /// Missing or unreadable settings are replaced by defaults, which are
    /// written back. Returns true if defaults were restored.
    #[cfg(feature = "serde")]
    pub async fn load<S: FlashStorage>(&mut self, storage: &mut S) -> bool {
        match load_settings::<JogSettings, S>(storage).await {
            Ok(settings) => {
                self.jog.settings = settings;
                return false;
            }
            Err(PersistError::Flash(FlashError::NotFound)) => {
                debug!("No jog settings in flash, using defaults");
            }
            Err(e) => {
                warn!("Failed to load jog settings: {:?}, using defaults", e);
            }
        }

        self.jog.settings = JogSettings::default();
        if let Err(e) = self.save(storage).await {
            warn!("Failed to save jog settings: {:?}", e);
        }

        true
    }

    /// Save jog settings to storage
    #[cfg(feature = "serde")]
    pub async fn save<S: FlashStorage>(&self, storage: &mut S) -> Result<(), PersistError> {
        save_settings(storage, &self.jog.settings).await
    }

    /// Process the oldest buffered keycode
    ///
    /// In alarm state only status, reset, MPG toggle, unlock and home keys
    /// are acted upon. Other keys are offered to `preview` first, which
    /// returns true to consume the key.
    pub fn process_keypress<H: KeypadHost>(
        &mut self,
        host: &mut H,
        input: &KeypadInput,
        preview: impl FnOnce(&mut H, u8) -> bool,
    ) -> KeyOutcome {
        let Some(keycode) = input.next_keycode() else {
            return KeyOutcome::Idle;
        };

        if host.state().is_alarm() && !allowed_in_alarm(keycode) {
            debug!("Key {} blocked in alarm", keycode);
            return KeyOutcome::Blocked(keycode);
        }

        if preview(host, keycode) {
            return KeyOutcome::Previewed(keycode);
        }

        match keycode {
            KEY_MIST => realtime(host, RealtimeCommand::CoolantMistToggle),
            KEY_FLOOD => realtime(host, RealtimeCommand::CoolantFloodToggle),

            KEY_JOG_MODE_FAST | KEY_JOG_MODE_SLOW | KEY_JOG_MODE_STEP => {
                self.jog.mode = match keycode {
                    KEY_JOG_MODE_FAST => JogMode::Fast,
                    KEY_JOG_MODE_SLOW => JogMode::Slow,
                    _ => JogMode::Step,
                };
                KeyOutcome::JogModeChanged(self.jog.mode)
            }
            KEY_JOG_MODE_CYCLE => {
                self.jog.cycle_mode();
                KeyOutcome::JogModeChanged(self.jog.mode)
            }
            KEY_JOG_MODIFIER_CYCLE => {
                self.jog.cycle_modifier();
                KeyOutcome::JogDataChanged
            }

            KEY_NEXT_WCS => {
                let id = host.coord_system() as usize;
                let next = if id + 1 < COORD_SYSTEMS.len() { id + 1 } else { 0 };
                KeyOutcome::Gcode(host.enqueue_gcode(COORD_SYSTEMS[next]))
            }

            KEY_HOME => KeyOutcome::System(host.execute_system_command("$H")),
            KEY_UNLOCK => KeyOutcome::System(host.execute_system_command("$X")),

            KEY_FEED_RESET => realtime(host, RealtimeCommand::FeedReset),
            KEY_FEED_PLUS => realtime(host, RealtimeCommand::FeedCoarsePlus),
            KEY_FEED_MINUS => realtime(host, RealtimeCommand::FeedCoarseMinus),
            KEY_SPINDLE_RESET => realtime(host, RealtimeCommand::SpindleReset),
            KEY_SPINDLE_PLUS => realtime(host, RealtimeCommand::SpindleCoarsePlus),
            KEY_SPINDLE_MINUS => realtime(host, RealtimeCommand::SpindleCoarseMinus),

            _ => {
                if let Some(cmd) = RealtimeCommand::from_byte(keycode) {
                    return realtime_key(host, cmd, keycode);
                }

                match keycodes::jog_axes(keycode) {
                    Some(axes) => self.jog(host, input, keycode, axes),
                    None => KeyOutcome::Unknown(keycode),
                }
            }
        }
    }

    fn jog<H: KeypadHost>(
        &mut self,
        host: &mut H,
        input: &KeypadInput,
        keycode: u8,
        axes: &str,
    ) -> KeyOutcome {
        let Some(command) = self.jog.command(axes, host.units_imperial()) else {
            warn!("Jog command for {} does not fit", axes);
            return KeyOutcome::Unknown(keycode);
        };

        if input.is_released() {
            return KeyOutcome::JogSkipped;
        }

        let accepted = host.enqueue_gcode(&command);
        if accepted {
            input.set_jogging();
        }

        KeyOutcome::Jog(accepted)
    }
}

/// Realtime command keys passed through unmodified
fn realtime_key(
    host: &mut impl KeypadHost,
    cmd: RealtimeCommand,
    keycode: u8,
) -> KeyOutcome {
    use RealtimeCommand::*;

    match cmd {
        MpgModeToggle => KeyOutcome::MpgToggled(host.toggle_mpg_mode()),
        FeedHold | CycleStart | Reset | SafetyDoor | StatusReport | OptionalStopToggle
        | SingleBlockToggle | ProbeConnectedToggle => realtime(host, cmd),
        _ if cmd.is_feed_override() || cmd.is_spindle_override() || cmd.is_coolant_override() => {
            realtime(host, cmd)
        }
        _ => KeyOutcome::Unknown(keycode),
    }
}

fn allowed_in_alarm(keycode: u8) -> bool {
    keycode == RealtimeCommand::StatusReport.to_byte()
        || keycode == CMD_STATUS_REPORT_LEGACY
        || keycode == RealtimeCommand::Reset.to_byte()
        || keycode == RealtimeCommand::MpgModeToggle.to_byte()
        || keycode == KEY_UNLOCK
        || keycode == KEY_HOME
}

fn realtime(host: &mut impl KeypadHost, cmd: RealtimeCommand) -> KeyOutcome {
    host.enqueue_realtime_command(cmd);
    KeyOutcome::Realtime(cmd)
}
