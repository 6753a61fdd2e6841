//! Keycode buffer shared between interrupt and foreground context

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use pendant_protocol::{RealtimeCommand, ASCII_CAN};

use crate::state::MachineState;
use crate::traits::RealtimeSink;

/// Keycode buffer depth
pub const KEYBUF_SIZE: usize = 8;

/// Keycodes received from the keypad, plus key and jog status
///
/// All methods take `&self` and may be called from interrupt context.
/// Atomics are only loaded and stored, never swapped, so the type also
/// works on cores without compare-and-swap.
pub struct KeypadInput {
    keys: Channel<CriticalSectionRawMutex, u8, KEYBUF_SIZE>,
    /// Last key has been released
    released: AtomicBool,
    /// A jog command issued by the keypad may still be moving the machine
    jogging: AtomicBool,
}

impl Default for KeypadInput {
    fn default() -> Self {
        Self::new()
    }
}

impl KeypadInput {
    pub const fn new() -> Self {
        Self {
            keys: Channel::new(),
            released: AtomicBool::new(true),
            jogging: AtomicBool::new(false),
        }
    }

    /// Keycode received on a serial keypad stream
    ///
    /// Jog cancel, or CAN outside of alarm, acts as a key release: an
    /// active jog is cancelled and pending keys are discarded. Any other
    /// code is buffered; returns false if it was dropped.
    pub fn enqueue_keycode(
        &self,
        keycode: u8,
        state: MachineState,
        realtime: &impl RealtimeSink,
    ) -> bool {
        let cancel = keycode == RealtimeCommand::JogCancel.to_byte()
            || (keycode == ASCII_CAN && !state.is_alarm());

        if cancel {
            self.released.store(true, Ordering::Relaxed);
            self.cancel_jog(realtime);
            self.flush();
            return false;
        }

        if self.keys.try_send(keycode).is_ok() {
            self.released.store(false, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Strobe line change on an I2C keypad
    ///
    /// Returns true on key down, when the caller must read the keycode from
    /// the keypad and hand it to [`push_keycode`](Self::push_keycode).
    /// Releasing the key stops an active jog.
    pub fn strobe(&self, keydown: bool, realtime: &impl RealtimeSink) -> bool {
        self.released.store(!keydown, Ordering::Relaxed);

        if !keydown && self.cancel_jog(realtime) {
            self.flush();
        }

        keydown
    }

    /// Buffer a keycode read from an I2C keypad
    ///
    /// Returns false if the buffer is full and the key was dropped.
    pub fn push_keycode(&self, keycode: u8) -> bool {
        self.keys.try_send(keycode).is_ok()
    }

    /// Oldest buffered keycode
    pub fn next_keycode(&self) -> Option<u8> {
        self.keys.try_receive().ok()
    }

    /// Number of buffered keycodes
    pub fn pending(&self) -> usize {
        self.keys.len()
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Relaxed)
    }

    pub fn is_jogging(&self) -> bool {
        self.jogging.load(Ordering::Relaxed)
    }

    /// Record that a keypad jog command was accepted
    pub fn set_jogging(&self) {
        self.jogging.store(true, Ordering::Relaxed);
    }

    /// Send jog cancel if a keypad jog is active
    fn cancel_jog(&self, realtime: &impl RealtimeSink) -> bool {
        if !self.jogging.load(Ordering::Relaxed) {
            return false;
        }

        self.jogging.store(false, Ordering::Relaxed);
        realtime.enqueue(RealtimeCommand::JogCancel);
        true
    }

    fn flush(&self) {
        while self.keys.try_receive().is_ok() {}
    }
}
