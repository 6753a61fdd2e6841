//! Keypad key codes
//!
//! The keypad sends one byte per key press. Printable letters select jog
//! directions and controller functions, top-bit-set codes are passed on as
//! realtime commands, and `0xB0..=0xB7` are reserved for macro keys.

/// Jog +X
pub const JOG_XR: u8 = b'R';
/// Jog -X
pub const JOG_XL: u8 = b'L';
/// Jog +Y
pub const JOG_YF: u8 = b'F';
/// Jog -Y
pub const JOG_YB: u8 = b'B';
/// Jog +Z
pub const JOG_ZU: u8 = b'U';
/// Jog -Z
pub const JOG_ZD: u8 = b'D';
/// Jog +X+Y
pub const JOG_XRYF: u8 = b'r';
/// Jog +X-Y
pub const JOG_XRYB: u8 = b'q';
/// Jog -X+Y
pub const JOG_XLYF: u8 = b's';
/// Jog -X-Y
pub const JOG_XLYB: u8 = b't';
/// Jog +X+Z
pub const JOG_XRZU: u8 = b'w';
/// Jog +X-Z
pub const JOG_XRZD: u8 = b'v';
/// Jog -X+Z
pub const JOG_XLZU: u8 = b'u';
/// Jog -X-Z
pub const JOG_XLZD: u8 = b'x';

/// Mist coolant toggle
pub const KEY_MIST: u8 = b'M';
/// Flood coolant toggle
pub const KEY_FLOOD: u8 = b'C';
/// Select jog mode directly (`'0'` fast, `'1'` slow, `'2'` step)
pub const KEY_JOG_MODE_FAST: u8 = b'0';
pub const KEY_JOG_MODE_SLOW: u8 = b'1';
pub const KEY_JOG_MODE_STEP: u8 = b'2';
/// Cycle jog mode
pub const KEY_JOG_MODE_CYCLE: u8 = b'h';
/// Cycle jog modifier (1, 0.1, 0.01)
pub const KEY_JOG_MODIFIER_CYCLE: u8 = b'm';
/// Cycle work coordinate system
pub const KEY_NEXT_WCS: u8 = b'o';
/// Home all axes (`$H`)
pub const KEY_HOME: u8 = b'H';
/// Clear alarm lock (`$X`)
pub const KEY_UNLOCK: u8 = b'X';
/// Feed override reset
pub const KEY_FEED_RESET: u8 = b'I';
/// Feed override +10%
pub const KEY_FEED_PLUS: u8 = b'i';
/// Feed override -10%
pub const KEY_FEED_MINUS: u8 = b'j';
/// Spindle override reset
pub const KEY_SPINDLE_RESET: u8 = b'K';
/// Spindle override +10%
pub const KEY_SPINDLE_PLUS: u8 = b'k';
/// Spindle override -10%
pub const KEY_SPINDLE_MINUS: u8 = b'z';

/// First macro key code
pub const MACRO_KEY_BASE: u8 = 0xB0;

/// Number of macro key codes
pub const MACRO_KEY_COUNT: u8 = 8;

/// Macro slot bound to a key code, if any
pub fn macro_slot(keycode: u8) -> Option<u8> {
    keycode
        .checked_sub(MACRO_KEY_BASE)
        .filter(|slot| *slot < MACRO_KEY_COUNT)
}

/// Key code bound to a macro slot
pub fn macro_key(slot: u8) -> Option<u8> {
    (slot < MACRO_KEY_COUNT).then(|| MACRO_KEY_BASE + slot)
}

/// Axis words for a jog key, with `?` standing in for the distance
pub fn jog_axes(keycode: u8) -> Option<&'static str> {
    let axes = match keycode {
        JOG_XR => "X?",
        JOG_XL => "X-?",
        JOG_YF => "Y?",
        JOG_YB => "Y-?",
        JOG_ZU => "Z?",
        JOG_ZD => "Z-?",
        JOG_XRYF => "X?Y?",
        JOG_XRYB => "X?Y-?",
        JOG_XLYF => "X-?Y?",
        JOG_XLYB => "X-?Y-?",
        JOG_XRZU => "X?Z?",
        JOG_XRZD => "X?Z-?",
        JOG_XLZU => "X-?Z?",
        JOG_XLZD => "X-?Z-?",
        _ => return None,
    };

    Some(axes)
}
