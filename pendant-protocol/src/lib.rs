//! Pendant wire formats
//!
//! Byte-level definitions shared between the controller-side plugins and the
//! devices they talk to:
//!
//! - [`realtime`]: single-byte realtime commands injected into the controller
//!   (cycle start, feed hold, overrides, ...)
//! - [`keycodes`]: key codes produced by the I2C/UART keypad
//! - [`status`]: the machine status packet pushed to the I2C display
//! - [`leds`]: the PCA9654E LED expander register map
//!
//! # Status packet overview
//!
//! ```text
//! ┌──────────────────────────┬─────────┬──────────────────┐
//! │ HEADER (machine status)  │ MSGTYPE │ MESSAGE          │
//! │ 44B, little endian       │ 1B      │ 0–128B           │
//! └──────────────────────────┴─────────┴──────────────────┘
//! ```
//!
//! The message part is only transmitted when a message is pending.

#![no_std]
#![deny(unsafe_code)]

pub mod keycodes;
pub mod leds;
pub mod realtime;
pub mod status;

pub use leds::Leds;
pub use realtime::{RealtimeCommand, ASCII_CAN, ASCII_LF};
pub use status::{
    DisplayState, JogModeByte, MachineModes, MachineStatusPacket, Message, MsgType, Overrides,
    PacketError, MAX_MESSAGE_LEN, MAX_PACKET_LEN, STATUS_HEADER_LEN,
};
