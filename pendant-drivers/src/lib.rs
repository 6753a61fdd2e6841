//! I2C drivers for pendant peripherals
//!
//! The state lives in `pendant-core`; these drivers only move bytes
//! between it and the devices on the host's I2C bus:
//!
//! - [`bus`]: adapter from `embedded-hal` I2C masters to [`I2cBus`]
//! - [`display`]: status packets to the I2C display
//! - [`keypad`]: keycode reads after a keypad strobe
//! - [`leds`]: PCA9654E LED expander
//!
//! [`I2cBus`]: pendant_hal::I2cBus

#![no_std]
#![deny(unsafe_code)]

pub mod bus;
pub mod display;
pub mod keypad;
pub mod leds;

#[cfg(test)]
mod mock;

/// Driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError<E> {
    /// Bus transfer failed
    Bus(E),
    /// Packet could not be encoded
    Packet(pendant_protocol::PacketError),
}
