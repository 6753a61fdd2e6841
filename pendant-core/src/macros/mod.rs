//! Macro plugin
//!
//! Up to eight short G-code macros, triggered by aux input pins, keypad
//! macro keys or the host's macro command. A macro runs by temporarily
//! replacing the host input stream, one block per `|`-separated segment.
//!
//! - [`store`]: slot settings, port claiming, persistence
//! - [`trigger`]: interrupt-side pin handling and the request queue
//! - [`stream`]: the stream substitution engine
//! - [`plugin`]: host-facing entry points

pub mod plugin;
pub mod store;
pub mod stream;
pub mod trigger;

pub use plugin::{Macros, PLUGIN_NAME, PLUGIN_VERSION};
pub use store::{MacroStore, SettingValue};
pub use stream::{MacroEngine, TrapOutcome};
pub use trigger::{MacroQueue, MacroRequest, PinOutcome, TriggerSource, TriggerTable};

use crate::hooks::HookError;

/// Reason a macro start request was dropped
///
/// Rejected requests are never queued or retried, and trigger sources are
/// not told about them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartRejected {
    /// Another macro is running
    Busy,
    /// Slot has no macro text
    Empty,
    /// Machine is not idle
    NotIdle,
    /// Slot number out of range
    InvalidSlot,
    /// Host hook chain has no room
    Hooks(HookError),
}
