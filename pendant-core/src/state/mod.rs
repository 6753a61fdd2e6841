//! Host machine state as seen by the plugins
//!
//! The controller owns its state machine; plugins only observe it.

pub mod machine;
pub mod status;

pub use machine::MachineState;
pub use status::StatusCode;
