//! Controller status codes
//!
//! Status codes flow through the status-report chain after every executed
//! block. Only the codes the plugins act on are named here.

/// Status code reported for an executed block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusCode(pub u8);

impl StatusCode {
    pub const OK: Self = Self(0);
    pub const EXPECTED_COMMAND_LETTER: Self = Self(1);
    pub const BAD_NUMBER_FORMAT: Self = Self(2);
    pub const INVALID_STATEMENT: Self = Self(3);
    pub const IDLE_ERROR: Self = Self(8);
    pub const SYSTEM_GC_LOCK: Self = Self(9);
    pub const SOFT_LIMIT_ERROR: Self = Self(10);
    pub const TRAVEL_EXCEEDED: Self = Self(15);
    pub const INVALID_JOG_COMMAND: Self = Self(16);
    pub const AUXILIARY_PORT_UNAVAILABLE: Self = Self(71);
    /// No handler accepted the request; the next one in the chain may try
    pub const UNHANDLED: Self = Self(84);

    pub fn is_ok(self) -> bool {
        self == Self::OK
    }

    pub fn code(self) -> u8 {
        self.0
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        Self::OK
    }
}

impl From<u8> for StatusCode {
    fn from(code: u8) -> Self {
        Self(code)
    }
}
