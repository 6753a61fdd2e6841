//! Keypad plugin
//!
//! Key codes arrive from interrupt context, either read over I2C after a
//! strobe or received on a serial stream, and are buffered until the
//! foreground loop processes them.
//!
//! ```text
//!  strobe / serial ISR          foreground
//!  ┌───────────────┐   keys    ┌──────────────────┐   gcode, realtime,
//!  │ KeypadInput   │──────────▶│ Keypad::process  │──▶ $H / $X, jog
//!  └───────────────┘ (8 deep)  └──────────────────┘
//!         │ release while jogging
//!         └──────────────────────▶ jog cancel
//! ```

pub mod input;
pub mod jog;
pub mod process;

pub use input::{KeypadInput, KEYBUF_SIZE};
pub use jog::{JogCommand, JogData, JogMode};
pub use process::{KeyOutcome, Keypad, KEYPAD_I2C_ADDRESS, PLUGIN_NAME, PLUGIN_VERSION};
