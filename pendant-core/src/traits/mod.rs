//! Host controller interfaces
//!
//! These traits define what the plugins need from the motion controller
//! they are loaded into.

pub mod host;

pub use host::{Host, KeypadHost, MessageKind, RealtimeSink};
