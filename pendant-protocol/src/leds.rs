//! LED expander register map
//!
//! The pendant LEDs hang off a PCA9654E 8-bit I/O expander. All pins are
//! configured as non-inverted outputs at startup, after which a single write
//! to the output register updates every LED.

/// I2C address of the PCA9654E
pub const PCA9654E_ADDRESS: u8 = 0x20;

/// Input port register (read only)
pub const REG_READ_INPUT: u8 = 0;
/// Output port register
pub const REG_RW_OUTPUT: u8 = 1;
/// Polarity inversion register
pub const REG_RW_INVERSION: u8 = 2;
/// Pin direction register (1 = input)
pub const REG_RW_CONFIG: u8 = 3;

/// LED state, one bit per LED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Leds(u8);

impl Leds {
    pub const RUN: u8 = 1 << 0;
    pub const HOLD: u8 = 1 << 1;
    pub const SPINDLE: u8 = 1 << 2;
    pub const FLOOD: u8 = 1 << 3;
    pub const MIST: u8 = 1 << 4;
    pub const RED: u8 = 1 << 5;
    pub const GREEN: u8 = 1 << 6;
    pub const BLUE: u8 = 1 << 7;

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, led: u8) -> bool {
        self.0 & led == led
    }

    pub fn set(&mut self, led: u8, on: bool) {
        if on {
            self.0 |= led;
        } else {
            self.0 &= !led;
        }
    }

    /// Register write that updates all LEDs
    pub fn output_frame(self) -> [u8; 2] {
        [REG_RW_OUTPUT, self.0]
    }
}

/// Register writes that set up the expander as eight plain outputs
pub const INIT_FRAMES: [[u8; 2]; 2] = [[REG_RW_CONFIG, 0x00], [REG_RW_INVERSION, 0x00]];
