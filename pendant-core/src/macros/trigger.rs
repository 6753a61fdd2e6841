//! Trigger dispatch
//!
//! Pin interrupts arrive in interrupt context. The handler only looks at a
//! copy of the trigger table, issues realtime commands for non-macro
//! actions and queues macro start requests for the foreground loop.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use pendant_protocol::RealtimeCommand;

use crate::config::{TriggerAction, MAX_MACROS};
use crate::state::MachineState;
use crate::traits::RealtimeSink;

/// Pending start requests between interrupt and foreground
pub const MACRO_QUEUE_DEPTH: usize = 4;

/// Where a start request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerSource {
    /// Falling edge on an aux input port
    Pin(u8),
    /// Keypad macro key
    Key(u8),
    /// Host macro command (`G65 P<n>` style execution by id)
    Command,
}

/// Macro start request queued from interrupt context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacroRequest {
    pub slot: u8,
    pub source: TriggerSource,
}

/// Bounded interrupt-to-foreground request queue
///
/// Requests that do not fit are dropped.
pub struct MacroQueue {
    channel: Channel<CriticalSectionRawMutex, MacroRequest, MACRO_QUEUE_DEPTH>,
}

impl Default for MacroQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MacroQueue {
    pub const fn new() -> Self {
        Self { channel: Channel::new() }
    }

    /// Queue a request, returns false if the queue is full
    pub fn request(&self, request: MacroRequest) -> bool {
        self.channel.try_send(request).is_ok()
    }

    /// Take the oldest pending request
    pub fn take(&self) -> Option<MacroRequest> {
        self.channel.try_receive().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

/// Result of a pin interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinOutcome {
    /// Rising edge or a port no slot is bound to
    Ignored,
    /// Realtime command issued for a non-macro action
    Realtime(RealtimeCommand),
    /// Macro start queued for the foreground
    Queued(u8),
    /// Machine not idle, or queue full
    Dropped,
}

/// Port to slot bindings, copied for use from interrupt context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TriggerTable {
    entries: [Option<(u8, TriggerAction)>; MAX_MACROS],
}

impl TriggerTable {
    pub fn new(entries: [Option<(u8, TriggerAction)>; MAX_MACROS]) -> Self {
        Self { entries }
    }

    /// Slot bound to `port`, highest slot first
    pub fn lookup(&self, port: u8) -> Option<(u8, TriggerAction)> {
        self.entries
            .iter()
            .enumerate()
            .rev()
            .find_map(|(slot, entry)| match entry {
                Some((p, action)) if *p == port => Some((slot as u8, *action)),
                _ => None,
            })
    }

    /// Handle a level change on an aux input
    ///
    /// Runs in interrupt context: only a realtime command is issued or a
    /// request queued, the macro engine itself is never touched.
    pub fn on_pin_change(
        &self,
        port: u8,
        is_high: bool,
        state: MachineState,
        realtime: &impl RealtimeSink,
        queue: &MacroQueue,
    ) -> PinOutcome {
        if is_high {
            return PinOutcome::Ignored;
        }

        let Some((slot, action)) = self.lookup(port) else {
            return PinOutcome::Ignored;
        };

        if let Some(cmd) = action.realtime_command() {
            realtime.enqueue(cmd);
            return PinOutcome::Realtime(cmd);
        }

        if state.is_idle()
            && queue.request(MacroRequest {
                slot,
                source: TriggerSource::Pin(port),
            })
        {
            PinOutcome::Queued(slot)
        } else {
            PinOutcome::Dropped
        }
    }
}
