//! Host bindings and hook chains
//!
//! The controller exposes a handful of replaceable entry points: the
//! character source its parser reads from, and chains of handlers for
//! status reports, macro completion, driver reset and keypad previews.
//! Plugins insert themselves at the head of a chain and forward to the
//! entry that was head before them.
//!
//! A chain is an explicit ordered list of handler ids rather than a set of
//! saved function pointers, so removing an entry from the middle never
//! breaks the links of the entries around it.
//!
//! ```text
//!   head                                  root
//!  ┌───────────┐   ┌──────────────┐   ┌────────┐
//!  │ MacroTrap │──▶│ DisplayMirror│──▶│ Report │
//!  └───────────┘   └──────────────┘   └────────┘
//! ```

use heapless::Vec;

/// Maximum handlers per chain
pub const CHAIN_CAPACITY: usize = 6;

/// Hook chain errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HookError {
    /// Chain has no room for another handler
    Full,
    /// Handler is already part of the chain
    AlreadyInstalled,
}

/// Result of a single handler in a dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow<T> {
    /// Pass the value on to the next handler
    Next(T),
    /// Stop the dispatch with this value
    Done(T),
}

/// Ordered list of handler ids, newest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookChain<H, const N: usize = CHAIN_CAPACITY> {
    /// Index 0 is the root (oldest) entry
    handlers: Vec<H, N>,
}

impl<H: Copy + Eq, const N: usize> Default for HookChain<H, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Copy + Eq, const N: usize> HookChain<H, N> {
    /// Create an empty chain
    pub const fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    /// Create a chain ending in `root`
    pub fn with_root(root: H) -> Self {
        let mut chain = Self::new();
        // An empty chain always has room for its root
        let _ = chain.handlers.push(root);
        chain
    }

    /// Install `handler` at the head of the chain
    pub fn install(&mut self, handler: H) -> Result<(), HookError> {
        if self.contains(handler) {
            return Err(HookError::AlreadyInstalled);
        }
        self.handlers.push(handler).map_err(|_| HookError::Full)
    }

    /// Remove `handler` wherever it sits in the chain
    ///
    /// Returns false if it was not installed.
    pub fn remove(&mut self, handler: H) -> bool {
        match self.handlers.iter().position(|h| *h == handler) {
            Some(index) => {
                self.handlers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Handler that receives a dispatch first
    pub fn head(&self) -> Option<H> {
        self.handlers.last().copied()
    }

    pub fn contains(&self, handler: H) -> bool {
        self.handlers.contains(&handler)
    }

    /// Handler that `handler` forwards to
    pub fn next_after(&self, handler: H) -> Option<H> {
        let index = self.handlers.iter().position(|h| *h == handler)?;
        index.checked_sub(1).map(|i| self.handlers[i])
    }

    /// Handlers in dispatch order
    pub fn iter(&self) -> impl Iterator<Item = H> + '_ {
        self.handlers.iter().rev().copied()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run `value` through the chain, head first
    ///
    /// Stops at the first handler returning [`Flow::Done`]. The chain is
    /// borrowed for the whole dispatch; callers whose handlers modify the
    /// chain dispatch over a clone.
    pub fn dispatch<T>(&self, value: T, mut handler: impl FnMut(H, T) -> Flow<T>) -> T {
        let mut value = value;
        for id in self.iter() {
            match handler(id, value) {
                Flow::Next(v) => value = v,
                Flow::Done(v) => return v,
            }
        }
        value
    }
}

/// Handlers in the status-report chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusHandler {
    /// Controller's own status reporter
    Report,
    /// Macro error trap
    MacroTrap,
    /// Display status code observer
    DisplayMirror,
    External(u8),
}

/// Handlers in the macro-finished chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReturnHandler {
    Core,
    MacroEnd,
    External(u8),
}

/// Handlers in the driver reset chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetHandler {
    /// Driver's own reset
    Driver,
    /// Macro reset-safety hook
    Macros,
    External(u8),
}

/// Handlers in the keypad preview chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PreviewHandler {
    Macros,
    Display,
    External(u8),
}

/// Input stream identifier assigned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamId(pub u8);

/// Identifies the macro run feeding the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacroCursor {
    pub slot: u8,
}

/// Where the host parser reads its characters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CharSource {
    /// A real input device (serial, USB, network, SD card)
    Device(StreamId),
    /// The macro engine's substitute stream
    Macro(MacroCursor),
}

impl CharSource {
    pub fn is_macro(&self) -> bool {
        matches!(self, CharSource::Macro(_))
    }
}

/// Host entry points a plugin may rebind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bindings {
    pub stream: CharSource,
    pub status_message: HookChain<StatusHandler>,
    pub macro_return: HookChain<ReturnHandler>,
    pub driver_reset: HookChain<ResetHandler>,
    pub keypress_preview: HookChain<PreviewHandler>,
}

impl Bindings {
    /// Bindings of a host with no plugins installed
    pub fn new(device: StreamId) -> Self {
        Self {
            stream: CharSource::Device(device),
            status_message: HookChain::with_root(StatusHandler::Report),
            macro_return: HookChain::with_root(ReturnHandler::Core),
            driver_reset: HookChain::with_root(ResetHandler::Driver),
            keypress_preview: HookChain::new(),
        }
    }
}
