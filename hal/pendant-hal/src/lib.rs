//! Pendant Hardware Abstraction Layer
//!
//! The plugins in this workspace run inside a host motion controller that
//! already owns the flash, the I2C bus and the auxiliary input ports. This
//! crate describes what the plugins need from those collaborators, so the
//! same plugin logic can sit on top of any controller port.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Plugins (pendant-core, pendant-drivers)│
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pendant-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  Host controller (NVS, I2C, ioports)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::AuxInputs`] - Auxiliary digital input ports (claiming, IRQ)
//! - [`i2c::I2cBus`] - I2C bus operations
//! - [`flash::FlashStorage`] - Persistent settings storage

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod gpio;
pub mod i2c;

// Re-export key traits at crate root for convenience
pub use flash::{FlashError, FlashStorage, StorageKey};
pub use gpio::{AuxInputs, InputConfig, IrqMode, PinCaps, PullMode};
pub use i2c::I2cBus;
