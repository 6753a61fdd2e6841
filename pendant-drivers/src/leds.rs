//! PCA9654E LED expander

use pendant_hal::I2cBus;
use pendant_protocol::leds::{INIT_FRAMES, PCA9654E_ADDRESS};
use pendant_protocol::Leds;

/// LED expander on the I2C bus
pub struct Pca9654eLeds<B> {
    bus: B,
    address: u8,
}

impl<B: I2cBus> Pca9654eLeds<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            address: PCA9654E_ADDRESS,
        }
    }

    /// Probe the expander and configure all pins as outputs
    ///
    /// Returns false if no expander answered; the caller reports
    /// [`LEDS_UNAVAILABLE_WARNING`](pendant_core::display::LEDS_UNAVAILABLE_WARNING).
    pub fn init(&mut self) -> Result<bool, B::Error> {
        if !self.bus.probe(self.address) {
            return Ok(false);
        }

        for frame in INIT_FRAMES {
            self.bus.write(self.address, &frame)?;
        }

        Ok(true)
    }

    /// Update all LEDs
    pub fn write(&mut self, leds: Leds) -> Result<(), B::Error> {
        self.bus.write(self.address, &leds.output_frame())
    }

    pub fn release(self) -> B {
        self.bus
    }
}
