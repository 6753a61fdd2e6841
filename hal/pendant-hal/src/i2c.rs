//! I2C bus abstractions
//!
//! The keypad, the status display and the LED expander all share the host's
//! I2C master.

/// I2C bus master
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write data to a device at the given 7-bit address
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data from a device at the given 7-bit address
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write then read in a single transaction (repeated start)
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;

    /// Check if a device acknowledges `address`
    ///
    /// The default implementation issues an empty write.
    fn probe(&mut self, address: u8) -> bool {
        self.write(address, &[]).is_ok()
    }
}
