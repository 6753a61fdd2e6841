//! Display plugins
//!
//! - [`mirror`]: machine status mirrored to an I2C display
//! - [`leds`]: run/hold/spindle/coolant indicators on an I2C LED expander
//!
//! Both only track state here; the drivers crate moves the bytes.

pub mod leds;
pub mod mirror;

pub use leds::{LedIndicator, LEDS_PLUGIN_NAME, LEDS_PLUGIN_VERSION, LEDS_UNAVAILABLE_WARNING};
pub use mirror::{
    LiveStatus, OverrideReport, ReportUpdate, StatusMirror, DISPLAY_PLUGIN_NAME,
    DISPLAY_PLUGIN_VERSION,
};
