//! LED indicator state
//!
//! Every method returns the new LED state when the expander has to be
//! rewritten, `None` when nothing visible changed.

use pendant_protocol::Leds;

use crate::state::MachineState;

/// Name shown in the plugin report
pub const LEDS_PLUGIN_NAME: &str = "I2C LEDS";

/// Version shown in the plugin report
pub const LEDS_PLUGIN_VERSION: &str = "0.02";

/// Reported when no expander answers at startup
pub const LEDS_UNAVAILABLE_WARNING: &str = "I2C LEDs not connected!";

/// Run, hold, spindle and coolant indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedIndicator {
    leds: Leds,
    last_state: MachineState,
}

impl Default for LedIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl LedIndicator {
    pub const fn new() -> Self {
        Self {
            leds: Leds::empty(),
            last_state: MachineState::Idle,
        }
    }

    pub fn leds(&self) -> Leds {
        self.leds
    }

    /// Machine state changed; run and hold follow cycle and feed hold
    pub fn on_state_change(&mut self, state: MachineState) -> Option<Leds> {
        if state == self.last_state {
            return None;
        }

        self.last_state = state;
        self.leds.set(Leds::RUN, state == MachineState::Cycle);
        self.leds.set(Leds::HOLD, state == MachineState::Hold);

        Some(self.leds)
    }

    /// Spindle switched on or off
    pub fn on_spindle(&mut self, on: bool) -> Option<Leds> {
        self.update(|leds| leds.set(Leds::SPINDLE, on))
    }

    /// Coolant outputs changed
    pub fn on_coolant(&mut self, flood: bool, mist: bool) -> Option<Leds> {
        self.update(|leds| {
            leds.set(Leds::FLOOD, flood);
            leds.set(Leds::MIST, mist);
        })
    }

    fn update(&mut self, f: impl FnOnce(&mut Leds)) -> Option<Leds> {
        let before = self.leds;
        f(&mut self.leds);
        (self.leds != before).then_some(self.leds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_change_only_writes_on_change() {
        let mut ind = LedIndicator::new();
        assert_eq!(ind.on_state_change(MachineState::Idle), None);

        let leds = ind.on_state_change(MachineState::Cycle).unwrap();
        assert!(leds.contains(Leds::RUN));
        assert!(!leds.contains(Leds::HOLD));

        let leds = ind.on_state_change(MachineState::Hold).unwrap();
        assert!(!leds.contains(Leds::RUN));
        assert!(leds.contains(Leds::HOLD));
        assert_eq!(ind.on_state_change(MachineState::Hold), None);
    }

    #[test]
    fn test_spindle_and_coolant() {
        let mut ind = LedIndicator::new();
        assert_eq!(ind.on_spindle(true).map(Leds::bits), Some(Leds::SPINDLE));
        assert_eq!(ind.on_spindle(true), None);

        let leds = ind.on_coolant(true, false).unwrap();
        assert_eq!(leds.bits(), Leds::SPINDLE | Leds::FLOOD);
        assert_eq!(ind.on_coolant(false, true).unwrap().bits(), Leds::SPINDLE | Leds::MIST);
    }
}
