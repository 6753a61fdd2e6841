//! embedded-hal adapter

use embedded_hal::i2c::I2c;
use pendant_hal::I2cBus;

/// [`I2cBus`] on top of any `embedded-hal` 1.0 I2C master
pub struct EhI2c<T> {
    inner: T,
}

impl<T: I2c> EhI2c<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Release the wrapped bus
    pub fn release(self) -> T {
        self.inner
    }
}

impl<T: I2c> I2cBus for EhI2c<T> {
    type Error = T::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.write(address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.inner.read(address, buf)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.inner.write_read(address, write_data, read_buf)
    }
}
