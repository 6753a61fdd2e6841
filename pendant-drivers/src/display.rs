//! I2C status display

use pendant_core::config::DisplaySettings;
use pendant_core::display::{LiveStatus, StatusMirror};
use pendant_hal::I2cBus;
use pendant_protocol::MAX_PACKET_LEN;

use crate::DriverError;

/// Status display on the I2C bus
pub struct I2cDisplay<B> {
    bus: B,
    address: u8,
    connected: bool,
}

impl<B: I2cBus> I2cDisplay<B> {
    pub fn new(bus: B, settings: &DisplaySettings) -> Self {
        Self {
            bus,
            address: settings.address,
            connected: false,
        }
    }

    /// Check that the display answers; returns the result
    pub fn probe(&mut self) -> bool {
        self.connected = self.bus.probe(self.address);
        self.connected
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Send the status packet if the mirror has something new
    ///
    /// Returns true if a packet was sent. After a failed write the mirror
    /// keeps its pending changes and the next call retries them.
    pub fn refresh(
        &mut self,
        mirror: &mut StatusMirror,
        live: &LiveStatus,
    ) -> Result<bool, DriverError<B::Error>> {
        let mut buffer = [0u8; MAX_PACKET_LEN];

        let Some(len) = mirror.prepare(live, &mut buffer).map_err(DriverError::Packet)? else {
            return Ok(false);
        };

        self.bus
            .write(self.address, &buffer[..len])
            .map_err(DriverError::Bus)?;
        mirror.commit();

        Ok(true)
    }

    pub fn release(self) -> B {
        self.bus
    }
}
