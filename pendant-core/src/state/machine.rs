//! Controller machine state
//!
//! The controller reports its state as a bitmask with at most one bit set
//! (no bits means idle). Plugins gate their behavior on the decoded state.

use pendant_protocol::DisplayState;

/// Raw state bits reported by the controller
pub mod bits {
    pub const ALARM: u16 = 1 << 0;
    pub const CHECK_MODE: u16 = 1 << 1;
    pub const HOMING: u16 = 1 << 2;
    pub const CYCLE: u16 = 1 << 3;
    pub const HOLD: u16 = 1 << 4;
    pub const JOG: u16 = 1 << 5;
    pub const SAFETY_DOOR: u16 = 1 << 6;
    pub const SLEEP: u16 = 1 << 7;
    pub const ESTOP: u16 = 1 << 8;
    pub const TOOL_CHANGE: u16 = 1 << 9;
}

/// Controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MachineState {
    /// Ready for commands
    #[default]
    Idle,
    /// Locked out after a fault or at startup
    Alarm,
    /// Emergency stop asserted
    EStop,
    /// G-code check mode, no motion
    CheckMode,
    /// Homing cycle running
    Homing,
    /// Executing motion
    Cycle,
    /// Feed hold
    Hold,
    /// Jog motion
    Jog,
    /// Safety door open
    SafetyDoor,
    Sleep,
    /// Waiting for a manual tool change
    ToolChange,
}

impl MachineState {
    /// Decode the controller's state bits
    ///
    /// E-stop takes precedence over alarm; unknown bits decode as idle.
    pub fn from_bits(state: u16) -> Self {
        use MachineState::*;

        if state & bits::ESTOP != 0 {
            EStop
        } else if state & bits::ALARM != 0 {
            Alarm
        } else if state & bits::CHECK_MODE != 0 {
            CheckMode
        } else if state & bits::HOMING != 0 {
            Homing
        } else if state & bits::CYCLE != 0 {
            Cycle
        } else if state & bits::HOLD != 0 {
            Hold
        } else if state & bits::JOG != 0 {
            Jog
        } else if state & bits::SAFETY_DOOR != 0 {
            SafetyDoor
        } else if state & bits::SLEEP != 0 {
            Sleep
        } else if state & bits::TOOL_CHANGE != 0 {
            ToolChange
        } else {
            Idle
        }
    }

    /// Encode back to the controller's state bits
    pub fn to_bits(self) -> u16 {
        match self {
            MachineState::Idle => 0,
            MachineState::Alarm => bits::ALARM,
            MachineState::EStop => bits::ESTOP,
            MachineState::CheckMode => bits::CHECK_MODE,
            MachineState::Homing => bits::HOMING,
            MachineState::Cycle => bits::CYCLE,
            MachineState::Hold => bits::HOLD,
            MachineState::Jog => bits::JOG,
            MachineState::SafetyDoor => bits::SAFETY_DOOR,
            MachineState::Sleep => bits::SLEEP,
            MachineState::ToolChange => bits::TOOL_CHANGE,
        }
    }

    /// Check if macros may be started
    pub fn is_idle(&self) -> bool {
        matches!(self, MachineState::Idle)
    }

    /// Check if the machine is locked out (alarm or e-stop)
    ///
    /// Only a small set of keypad keys is accepted in these states.
    pub fn is_alarm(&self) -> bool {
        matches!(self, MachineState::Alarm | MachineState::EStop)
    }

    /// State byte shown by the display
    pub fn display_state(&self) -> DisplayState {
        match self {
            MachineState::Alarm | MachineState::EStop => DisplayState::Alarm,
            MachineState::Cycle => DisplayState::Cycle,
            MachineState::Hold => DisplayState::Hold,
            MachineState::ToolChange => DisplayState::ToolChange,
            MachineState::Idle => DisplayState::Idle,
            MachineState::Homing => DisplayState::Homing,
            MachineState::Jog => DisplayState::Jog,
            _ => DisplayState::Other,
        }
    }
}
