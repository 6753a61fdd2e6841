//! Scripted I2C bus for driver tests

use heapless::Vec;
use pendant_hal::I2cBus;

/// Bus error injected by the tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nack;

/// One recorded write
pub type Frame = (u8, Vec<u8, 192>);

#[derive(Default)]
pub struct MockBus {
    pub writes: Vec<Frame, 8>,
    /// Addresses that do not acknowledge
    pub absent: Vec<u8, 4>,
    /// Fail the next write
    pub fail_next: bool,
    /// Byte returned by reads
    pub key: u8,
}

impl MockBus {
    fn check(&mut self, address: u8) -> Result<(), Nack> {
        if self.absent.contains(&address) || core::mem::take(&mut self.fail_next) {
            Err(Nack)
        } else {
            Ok(())
        }
    }
}

impl I2cBus for MockBus {
    type Error = Nack;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Nack> {
        self.check(address)?;
        let frame = Vec::from_slice(data).map_err(|_| Nack)?;
        self.writes.push((address, frame)).map_err(|_| Nack)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Nack> {
        self.check(address)?;
        buf.fill(self.key);
        Ok(())
    }

    fn write_read(&mut self, address: u8, write_data: &[u8], read_buf: &mut [u8]) -> Result<(), Nack> {
        self.write(address, write_data)?;
        self.read(address, read_buf)
    }
}
