//! Auxiliary input port abstractions
//!
//! The host maps its spare digital inputs to a table of numbered aux ports.
//! Plugins look ports up by number, claim them so no other plugin can use
//! them, and register for edge interrupts.

/// Edge(s) that raise a pin interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IrqMode {
    /// High to low transition
    Falling,
    /// Low to high transition
    Rising,
    /// Any transition
    Change,
}

/// Input pull resistor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PullMode {
    #[default]
    None,
    Up,
    Down,
}

/// Capabilities of an aux input port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinCaps {
    /// Port can raise an interrupt on a falling edge
    pub irq_falling: bool,
    /// Port has hardware or driver debouncing
    pub debounce: bool,
    /// Port is not yet claimed by the core or another plugin
    pub claimable: bool,
}

/// Runtime configuration applied to a claimed input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputConfig {
    pub debounce: bool,
    pub pull_mode: PullMode,
}

/// Aux digital input ports provided by the host
pub trait AuxInputs {
    /// Number of digital input ports known to the host
    fn available(&self) -> u8;

    /// Capabilities of `port`, or `None` if the port does not exist
    fn caps(&self, port: u8) -> Option<PinCaps>;

    /// Highest-numbered claimable port strictly below `below`
    ///
    /// With `below == None` the search starts from the top of the table.
    fn find_free(&self, below: Option<u8>) -> Option<u8>;

    /// Claim `port` for exclusive use
    ///
    /// Returns false if the port is already claimed or does not exist.
    fn claim(&mut self, port: u8, description: &'static str) -> bool;

    /// Apply input configuration to a claimed port
    fn configure(&mut self, port: u8, config: InputConfig);

    /// Enable the edge interrupt for a claimed port
    fn enable_irq(&mut self, port: u8, mode: IrqMode) -> bool;

    /// Check if `port` exists and can still be claimed
    fn is_claimable(&self, port: u8) -> bool {
        self.caps(port).is_some_and(|caps| caps.claimable)
    }
}
