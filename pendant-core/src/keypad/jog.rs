//! Jog modes and jog command generation

use core::fmt::Write;

use heapless::String;
use pendant_protocol::JogModeByte;

use crate::config::JogSettings;

/// Formatted `$J=` command
pub type JogCommand = String<64>;

/// Speed and distance multipliers selectable with the modifier key
pub const JOG_MODIFIERS: [f32; 3] = [1.0, 0.1, 0.01];

/// Jog mode selected on the keypad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum JogMode {
    #[default]
    Fast = 0,
    Slow = 1,
    Step = 2,
}

impl JogMode {
    /// Mode selected by the mode cycle key
    pub fn cycle(self) -> Self {
        match self {
            JogMode::Fast => JogMode::Slow,
            JogMode::Slow => JogMode::Step,
            JogMode::Step => JogMode::Fast,
        }
    }
}

/// Jog settings plus the mode and modifier selected on the keypad
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JogData {
    pub settings: JogSettings,
    pub mode: JogMode,
    modifier_index: u8,
}

impl JogData {
    pub fn new(settings: JogSettings) -> Self {
        Self {
            settings,
            mode: JogMode::Fast,
            modifier_index: 0,
        }
    }

    /// Active speed/distance multiplier
    pub fn modifier(&self) -> f32 {
        JOG_MODIFIERS[self.modifier_index as usize]
    }

    pub fn modifier_index(&self) -> u8 {
        self.modifier_index
    }

    pub fn cycle_mode(&mut self) {
        self.mode = self.mode.cycle();
    }

    pub fn cycle_modifier(&mut self) {
        self.modifier_index = (self.modifier_index + 1) % JOG_MODIFIERS.len() as u8;
    }

    /// Value shown as step size on the display
    ///
    /// Step mode shows the step distance, the continuous modes their feed
    /// rate.
    pub fn stepsize(&self) -> f32 {
        match self.mode {
            JogMode::Fast => self.settings.fast_speed * self.modifier(),
            JogMode::Slow => self.settings.slow_speed * self.modifier(),
            JogMode::Step => self.settings.step_distance * self.modifier(),
        }
    }

    /// Jog mode byte of the display status packet
    pub fn mode_byte(&self) -> JogModeByte {
        JogModeByte {
            mode: self.mode as u8,
            modifier: self.modifier_index,
        }
    }

    /// Build a jog command for `axes`
    ///
    /// Every `?` in `axes` is replaced by the jog distance of the current
    /// mode. Step mode moves the modified step distance at step speed, the
    /// continuous modes move their full distance at the modified speed.
    /// Returns `None` if the command does not fit.
    pub fn command(&self, axes: &str, imperial: bool) -> Option<JogCommand> {
        let s = &self.settings;
        let modifier = self.modifier();

        let (distance, decimals, speed) = match self.mode {
            JogMode::Step => (
                s.step_distance * modifier,
                if imperial { 4 } else { 3 },
                s.step_speed,
            ),
            JogMode::Slow => (s.slow_distance, 0, s.slow_speed * modifier),
            JogMode::Fast => (s.fast_distance, 0, s.fast_speed * modifier),
        };

        let mut cmd = JogCommand::new();
        cmd.push_str("$J=G91G21").ok()?;

        for c in axes.chars() {
            if c == '?' {
                write!(cmd, "{:.*}", decimals, distance).ok()?;
            } else {
                cmd.push(c).ok()?;
            }
        }

        write!(cmd, "F{:.0}", speed).ok()?;

        Some(cmd)
    }
}
