//! Stream substitution engine
//!
//! While a macro runs, the host parser reads from the macro text instead of
//! its input device. The engine swaps the character source, traps error
//! statuses so a failing block aborts the rest of the macro, and restores
//! everything exactly once when the run ends.
//!
//! ```text
//!            start()                    exhausted / error / reset
//!   Idle ──────────────────▶ Running ─────────────────────────────▶ Idle
//!          save stream                  restore stream (if still ours)
//!          install trap + end hook      remove trap + end hook
//! ```

use pendant_protocol::ASCII_LF;

use crate::config::{MacroText, MACRO_DELIMITER};
use crate::hooks::{Bindings, CharSource, MacroCursor, ReturnHandler, StatusHandler};
use crate::state::{MachineState, StatusCode};

use super::StartRejected;

/// State of the macro currently feeding the parser
#[derive(Debug, Clone)]
struct ActiveRun {
    slot: u8,
    /// Private copy; edits to the slot do not affect a running macro
    text: MacroText,
    pos: usize,
    /// Last character emitted was a block terminator
    eol_pending: bool,
    /// Character source to restore at teardown
    saved_stream: CharSource,
}

/// What the trap did with a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrapOutcome {
    /// Not our stream, pass on unchanged
    Forward(StatusCode),
    /// Block of the macro succeeded, stop here
    Swallow(StatusCode),
    /// Block of the macro failed, the run must be aborted
    Abort(StatusCode),
}

/// Macro stream substitution engine
///
/// At most one run exists at a time, and it exists exactly while the host
/// character source is [`CharSource::Macro`].
#[derive(Debug, Default)]
pub struct MacroEngine {
    run: Option<ActiveRun>,
}

impl MacroEngine {
    pub const fn new() -> Self {
        Self { run: None }
    }

    /// Check if a macro is running
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Slot of the running macro
    pub fn active_slot(&self) -> Option<u8> {
        self.run.as_ref().map(|run| run.slot)
    }

    /// Start feeding `text` to the host parser
    ///
    /// Nothing is changed if the start is rejected.
    pub fn start(
        &mut self,
        slot: u8,
        text: &MacroText,
        state: MachineState,
        bindings: &mut Bindings,
    ) -> Result<(), StartRejected> {
        if text.is_empty() {
            return Err(StartRejected::Empty);
        }
        if self.run.is_some() || bindings.stream.is_macro() {
            return Err(StartRejected::Busy);
        }
        if !state.is_idle() {
            return Err(StartRejected::NotIdle);
        }

        bindings
            .status_message
            .install(StatusHandler::MacroTrap)
            .map_err(StartRejected::Hooks)?;

        if let Err(e) = bindings.macro_return.install(ReturnHandler::MacroEnd) {
            bindings.status_message.remove(StatusHandler::MacroTrap);
            return Err(StartRejected::Hooks(e));
        }

        self.run = Some(ActiveRun {
            slot,
            text: text.clone(),
            pos: 0,
            eol_pending: false,
            saved_stream: bindings.stream,
        });
        bindings.stream = CharSource::Macro(MacroCursor { slot });

        Ok(())
    }

    /// Next character for the host parser
    ///
    /// Delimiters come out as line feeds, and a final line feed is added
    /// unless the text already ended with a delimiter. Once everything has
    /// been delivered the run is torn down and `None` is returned.
    pub fn next_char(&mut self, bindings: &mut Bindings) -> Option<u8> {
        let run = self.run.as_mut()?;

        match run.text.as_bytes().get(run.pos).copied() {
            Some(c) => {
                run.pos += 1;
                run.eol_pending = c == MACRO_DELIMITER;
                Some(if run.eol_pending { ASCII_LF } else { c })
            }
            None if !run.eol_pending => {
                run.eol_pending = true;
                Some(ASCII_LF)
            }
            None => {
                self.end(bindings);
                None
            }
        }
    }

    /// Classify a status code reported while the trap is installed
    pub fn trap_status(&self, status: StatusCode, bindings: &Bindings) -> TrapOutcome {
        if !bindings.stream.is_macro() {
            TrapOutcome::Forward(status)
        } else if status.is_ok() {
            TrapOutcome::Swallow(status)
        } else {
            TrapOutcome::Abort(status)
        }
    }

    /// End the run and restore the host bindings
    ///
    /// Safe to call at any time, any number of times. Afterwards no
    /// engine-owned entries remain in the bindings.
    pub fn end(&mut self, bindings: &mut Bindings) {
        let Some(run) = self.run.take() else {
            return;
        };

        if bindings.stream.is_macro() {
            bindings.stream = run.saved_stream;
        }

        bindings.macro_return.remove(ReturnHandler::MacroEnd);
        bindings.status_message.remove(StatusHandler::MacroTrap);
    }
}
