//! Realtime commands
//!
//! Realtime commands bypass the controller's line buffer and are acted upon
//! immediately. Most live in the top-bit-set range; three have legacy
//! printable aliases.

/// ASCII line feed, the block terminator fed to the G-code parser
pub const ASCII_LF: u8 = 0x0A;

/// ASCII cancel, sent by serial pendants when a key is released
pub const ASCII_CAN: u8 = 0x18;

/// Legacy printable status report request
pub const CMD_STATUS_REPORT_LEGACY: u8 = b'?';
/// Legacy printable cycle start
pub const CMD_CYCLE_START_LEGACY: u8 = b'~';
/// Legacy printable feed hold
pub const CMD_FEED_HOLD_LEGACY: u8 = b'!';

/// Single-byte realtime command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RealtimeCommand {
    /// Soft reset (ctrl-X)
    Reset = 0x18,
    StatusReport = 0x80,
    CycleStart = 0x81,
    FeedHold = 0x82,
    GcodeReport = 0x83,
    /// Safety door, also used to request parking
    SafetyDoor = 0x84,
    JogCancel = 0x85,
    StatusReportAll = 0x87,
    OptionalStopToggle = 0x88,
    SingleBlockToggle = 0x89,
    Fan0Toggle = 0x8A,
    MpgModeToggle = 0x8B,
    FeedReset = 0x90,
    FeedCoarsePlus = 0x91,
    FeedCoarseMinus = 0x92,
    FeedFinePlus = 0x93,
    FeedFineMinus = 0x94,
    RapidReset = 0x95,
    RapidMedium = 0x96,
    RapidLow = 0x97,
    SpindleReset = 0x99,
    SpindleCoarsePlus = 0x9A,
    SpindleCoarseMinus = 0x9B,
    SpindleFinePlus = 0x9C,
    SpindleFineMinus = 0x9D,
    /// Spindle stop while in feed hold
    SpindleStop = 0x9E,
    CoolantFloodToggle = 0xA0,
    CoolantMistToggle = 0xA1,
    ProbeConnectedToggle = 0xA4,
}

impl RealtimeCommand {
    /// Parse a command byte, accepting the legacy printable aliases
    pub fn from_byte(byte: u8) -> Option<Self> {
        use RealtimeCommand::*;

        let cmd = match byte {
            0x18 => Reset,
            0x80 | CMD_STATUS_REPORT_LEGACY => StatusReport,
            0x81 | CMD_CYCLE_START_LEGACY => CycleStart,
            0x82 | CMD_FEED_HOLD_LEGACY => FeedHold,
            0x83 => GcodeReport,
            0x84 => SafetyDoor,
            0x85 => JogCancel,
            0x87 => StatusReportAll,
            0x88 => OptionalStopToggle,
            0x89 => SingleBlockToggle,
            0x8A => Fan0Toggle,
            0x8B => MpgModeToggle,
            0x90 => FeedReset,
            0x91 => FeedCoarsePlus,
            0x92 => FeedCoarseMinus,
            0x93 => FeedFinePlus,
            0x94 => FeedFineMinus,
            0x95 => RapidReset,
            0x96 => RapidMedium,
            0x97 => RapidLow,
            0x99 => SpindleReset,
            0x9A => SpindleCoarsePlus,
            0x9B => SpindleCoarseMinus,
            0x9C => SpindleFinePlus,
            0x9D => SpindleFineMinus,
            0x9E => SpindleStop,
            0xA0 => CoolantFloodToggle,
            0xA1 => CoolantMistToggle,
            0xA4 => ProbeConnectedToggle,
            _ => return None,
        };

        Some(cmd)
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Feed and rapid override commands
    pub fn is_feed_override(&self) -> bool {
        (0x90..=0x97).contains(&self.to_byte())
    }

    /// Spindle speed and stop override commands
    pub fn is_spindle_override(&self) -> bool {
        (0x99..=0x9E).contains(&self.to_byte())
    }

    /// Coolant and fan toggles
    pub fn is_coolant_override(&self) -> bool {
        matches!(
            self,
            RealtimeCommand::CoolantFloodToggle
                | RealtimeCommand::CoolantMistToggle
                | RealtimeCommand::Fan0Toggle
        )
    }
}
