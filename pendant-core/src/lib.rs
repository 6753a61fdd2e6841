//! Board-agnostic plugin logic for CNC pendants
//!
//! This crate contains the plugin logic that sits between a grbl-style
//! motion controller and the pendant hardware:
//!
//! - Host bindings and ordered hook chains ([`hooks`])
//! - Macro store, trigger dispatch and the stream substitution engine
//!   ([`macros`])
//! - Keypad key buffer, jog settings and key decoding ([`keypad`])
//! - Display status mirror and LED indicator state ([`display`])
//! - Typed, persisted plugin settings ([`config`])
//!
//! Everything here runs in the controller's single foreground context,
//! except for the explicitly interrupt-safe entry points which only ever
//! enqueue work.

#![no_std]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod config;
pub mod display;
pub mod hooks;
pub mod keypad;
pub mod macros;
pub mod state;
pub mod traits;
