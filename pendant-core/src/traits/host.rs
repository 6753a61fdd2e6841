//! Host controller traits

use pendant_protocol::RealtimeCommand;

use crate::hooks::Bindings;
use crate::state::{MachineState, StatusCode};

/// Severity of a message shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageKind {
    /// Bare message line
    Plain,
    Info,
    Warning,
}

/// Realtime command queue, safe to use from interrupt context
pub trait RealtimeSink {
    /// Queue a realtime command
    ///
    /// Returns false if the command was not accepted.
    fn enqueue(&self, cmd: RealtimeCommand) -> bool;
}

/// Foreground services of the host controller
///
/// The host dispatches its hook chains itself; a plugin handler receives
/// the host back so it can rebind entry points while it runs.
pub trait Host {
    /// Current machine state
    fn state(&self) -> MachineState;

    /// Rebindable entry points
    fn bindings(&mut self) -> &mut Bindings;

    /// Queue a realtime command
    fn enqueue_realtime_command(&mut self, cmd: RealtimeCommand) -> bool;

    /// Show a message to the user
    fn report_message(&mut self, message: &str, kind: MessageKind);

    /// Run the macro-finished chain
    ///
    /// Called once when a macro has delivered its last character.
    fn macro_finished(&mut self);
}

/// Additional host services used by the keypad
pub trait KeypadHost: Host {
    /// Queue a G-code block for execution
    ///
    /// Returns false if the block was not accepted (queue full, wrong state).
    fn enqueue_gcode(&mut self, block: &str) -> bool;

    /// Execute a `$` system command immediately
    fn execute_system_command(&mut self, line: &str) -> StatusCode;

    /// Active work coordinate system (0 = G54)
    fn coord_system(&self) -> u8;

    /// G20 (inch) mode active
    fn units_imperial(&self) -> bool;

    /// Switch between MPG and normal input stream
    ///
    /// Returns false if the host has no MPG mode.
    fn toggle_mpg_mode(&mut self) -> bool;
}
