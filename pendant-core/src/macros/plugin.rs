//! Macro plugin entry points
//!
//! The host calls into the plugin from its hook chains; each handler gets
//! the host back so the engine can rebind the character source and hooks.
//!
//! | Host entry point      | Handler                        |
//! |-----------------------|--------------------------------|
//! | character source read | [`Macros::read_char`]          |
//! | status-report chain   | [`Macros::status_message`]     |
//! | macro-finished chain  | [`Macros::macro_return`]       |
//! | driver reset chain    | [`Macros::driver_reset`]       |
//! | keypad preview chain  | [`Macros::keypress_preview`]   |
//! | macro command by id   | [`Macros::execute_macro`]      |
//! | foreground tick       | [`Macros::poll_requests`]      |

use core::fmt::Write;

use heapless::String;
use pendant_protocol::keycodes;

use crate::config::MAX_MACROS;
use crate::hooks::{Bindings, Flow, HookError, PreviewHandler, ResetHandler};
use crate::state::StatusCode;
use crate::traits::{Host, MessageKind};

use super::store::MacroStore;
use super::stream::{MacroEngine, TrapOutcome};
use super::trigger::{MacroQueue, TriggerSource, TriggerTable};
use super::StartRejected;

#[cfg(feature = "serde")]
use pendant_hal::{AuxInputs, FlashStorage};

/// Name shown in the plugin report
pub const PLUGIN_NAME: &str = "Macros";

/// Version shown in the plugin report
pub const PLUGIN_VERSION: &str = "0.15";

/// Startup warning when a trigger port could not be set up
pub const CLAIM_WARNING: &str = "Macro plugin failed to claim all needed ports!";

/// Macro plugin
#[derive(Debug)]
pub struct Macros {
    store: MacroStore,
    engine: MacroEngine,
}

impl Macros {
    pub fn new(store: MacroStore) -> Self {
        Self {
            store,
            engine: MacroEngine::new(),
        }
    }

    /// Hook the plugin into the reset and keypad preview chains
    pub fn install(&self, bindings: &mut Bindings) -> Result<(), HookError> {
        bindings.driver_reset.install(ResetHandler::Macros)?;

        if let Err(e) = bindings.keypress_preview.install(PreviewHandler::Macros) {
            bindings.driver_reset.remove(ResetHandler::Macros);
            return Err(e);
        }

        Ok(())
    }

    /// Load settings and claim the trigger ports
    #[cfg(feature = "serde")]
    pub async fn init<S: FlashStorage, A: AuxInputs>(
        &mut self,
        host: &mut impl Host,
        storage: &mut S,
        aux: &mut A,
    ) {
        self.store.load(storage, aux).await;

        if !self.store.claim_ports(aux) {
            host.report_message(CLAIM_WARNING, MessageKind::Warning);
        }
    }

    pub fn store(&self) -> &MacroStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut MacroStore {
        &mut self.store
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    /// Name and version for the host's plugin report
    pub fn report_options(&self) -> (&'static str, &'static str) {
        (PLUGIN_NAME, PLUGIN_VERSION)
    }

    /// Port bindings for the pin interrupt handler
    pub fn trigger_table(&self) -> TriggerTable {
        self.store.trigger_table()
    }

    /// Start the macro in `slot`
    ///
    /// Single gate for every trigger source. A rejected request changes
    /// nothing and is not retried.
    pub fn request_start(
        &mut self,
        host: &mut impl Host,
        slot: u8,
        source: TriggerSource,
    ) -> Result<(), StartRejected> {
        let content = self
            .store
            .content(slot)
            .map_err(|_| StartRejected::InvalidSlot)?;
        let state = host.state();

        let result = self.engine.start(slot, content, state, host.bindings());

        match result {
            Ok(()) => info!("Macro {} started from {:?}", slot, source),
            Err(e) => debug!("Macro {} from {:?} rejected: {:?}", slot, source, e),
        }

        result
    }

    /// Execute macro `id` (1-based) on behalf of the host
    ///
    /// Returns [`StatusCode::UNHANDLED`] for unknown or empty macros so the
    /// next handler may try. A known macro reports OK even when it could
    /// not be started.
    pub fn execute_macro(&mut self, host: &mut impl Host, id: u8) -> StatusCode {
        let Some(slot) = id.checked_sub(1).filter(|s| (*s as usize) < MAX_MACROS) else {
            return StatusCode::UNHANDLED;
        };

        if self.store.content(slot).map_or(true, |c| c.is_empty()) {
            return StatusCode::UNHANDLED;
        }

        if host.state().is_idle() {
            let _ = self.request_start(host, slot, TriggerSource::Command);
        }

        StatusCode::OK
    }

    /// Keypad preview handler
    ///
    /// Macro keys are consumed whether or not the macro could start.
    pub fn keypress_preview(&mut self, host: &mut impl Host, keycode: u8) -> Flow<bool> {
        match keycodes::macro_slot(keycode).filter(|s| (*s as usize) < MAX_MACROS) {
            Some(slot) => {
                let _ = self.request_start(host, slot, TriggerSource::Key(keycode));
                Flow::Done(true)
            }
            None => Flow::Next(false),
        }
    }

    /// Start macros requested from interrupt context
    ///
    /// Drains the queue; returns the number of macros started.
    pub fn poll_requests(&mut self, host: &mut impl Host, queue: &MacroQueue) -> usize {
        let mut started = 0;

        while let Some(request) = queue.take() {
            if self.request_start(host, request.slot, request.source).is_ok() {
                started += 1;
            }
        }

        started
    }

    /// Character source read while a macro runs
    ///
    /// Returns `None` once the macro is exhausted; the host bindings are
    /// restored and the macro-finished chain is run at that point.
    pub fn read_char(&mut self, host: &mut impl Host) -> Option<u8> {
        let was_running = self.engine.is_running();
        let c = self.engine.next_char(host.bindings());

        if was_running && !self.engine.is_running() {
            debug!("Macro finished");
            host.macro_finished();
        }

        c
    }

    /// Status-report chain handler
    ///
    /// A failing block aborts the macro: a warning naming the status code
    /// is shown, the status is passed on and the rest of the text is
    /// discarded.
    pub fn status_message(&mut self, host: &mut impl Host, status: StatusCode) -> Flow<StatusCode> {
        match self.engine.trap_status(status, host.bindings()) {
            TrapOutcome::Forward(status) => Flow::Next(status),
            TrapOutcome::Swallow(status) => Flow::Done(status),
            TrapOutcome::Abort(status) => {
                let mut message: String<32> = String::new();
                let _ = write!(message, "error {} in macro", status.code());
                host.report_message(&message, MessageKind::Warning);

                warn!("Macro aborted with status {}", status.code());

                self.engine.end(host.bindings());
                Flow::Next(status)
            }
        }
    }

    /// Macro-finished chain handler
    pub fn macro_return(&mut self, host: &mut impl Host) -> Flow<()> {
        self.engine.end(host.bindings());
        Flow::Next(())
    }

    /// Driver reset chain handler
    ///
    /// Ends a running macro without a message, then lets the reset carry on.
    pub fn driver_reset(&mut self, host: &mut impl Host) -> Flow<()> {
        self.engine.end(host.bindings());
        Flow::Next(())
    }
}
