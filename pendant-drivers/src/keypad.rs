//! I2C keypad
//!
//! The keypad pulls its strobe line low while a key is held. The strobe
//! interrupt goes to [`KeypadInput::strobe`]; when that asks for it, the
//! foreground reads the keycode with [`I2cKeypad::fetch_key`].

use pendant_core::keypad::{KeypadInput, KEYPAD_I2C_ADDRESS};
use pendant_hal::I2cBus;

/// Keypad on the I2C bus
pub struct I2cKeypad<B> {
    bus: B,
    address: u8,
}

impl<B: I2cBus> I2cKeypad<B> {
    pub fn new(bus: B) -> Self {
        Self::with_address(bus, KEYPAD_I2C_ADDRESS)
    }

    pub fn with_address(bus: B, address: u8) -> Self {
        Self { bus, address }
    }

    /// Check that the keypad answers
    pub fn probe(&mut self) -> bool {
        self.bus.probe(self.address)
    }

    /// Read the held key and buffer it
    ///
    /// Returns the keycode, or `None` if the buffer was full.
    pub fn fetch_key(&mut self, input: &KeypadInput) -> Result<Option<u8>, B::Error> {
        let mut keycode = [0u8; 1];
        self.bus.read(self.address, &mut keycode)?;

        if input.push_keycode(keycode[0]) {
            Ok(Some(keycode[0]))
        } else {
            Ok(None)
        }
    }

    pub fn release(self) -> B {
        self.bus
    }
}
