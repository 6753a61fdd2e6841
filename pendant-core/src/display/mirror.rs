//! Status mirror
//!
//! Keeps the machine status packet for the display up to date from host
//! events, and decides when a packet has to be sent:
//!
//! - a message is pending (text, overrides, work offsets or clear), or
//! - the header differs from the last one the display acknowledged.
//!
//! The sender calls [`StatusMirror::prepare`], writes the bytes to the
//! bus and calls [`StatusMirror::commit`] only if the write succeeded, so a
//! failed transfer is retried on the next refresh.

use heapless::String;
use pendant_protocol::{
    DisplayState, MachineStatusPacket, Message, Overrides, PacketError, RealtimeCommand,
    MAX_MESSAGE_LEN, STATUS_HEADER_LEN,
};

use crate::config::DisplaySettings;
use crate::hooks::{Bindings, Flow, HookError, PreviewHandler, StatusHandler};
use crate::keypad::JogData;
use crate::state::{MachineState, StatusCode};

/// Name shown in the plugin report
pub const DISPLAY_PLUGIN_NAME: &str = "I2C Display";

/// Version shown in the plugin report
pub const DISPLAY_PLUGIN_VERSION: &str = "0.13";

const DISPLAY_PLUGIN_VERSION_DISCONNECTED: &str = "0.13 (not connected)";

/// Longest text message, leaving room for the terminator the display expects
const MAX_TEXT_LEN: usize = MAX_MESSAGE_LEN - 1;

type MessageText = String<MAX_TEXT_LEN>;

/// Message waiting to be sent with the next packet
#[derive(Debug, Clone, Default, PartialEq)]
enum Pending {
    #[default]
    None,
    Text(MessageText),
    Overrides(Overrides),
    WorkOffset([f32; 4]),
    Clear,
}

/// Values sampled by the host right before a packet is sent
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LiveStatus {
    /// Position in the active work coordinate system
    pub position: [f32; 4],
    /// Control input signals
    pub signals: u16,
    /// Limit switch mask
    pub limits: u8,
    /// Programmed spindle speed including override
    pub spindle_rpm: i32,
    /// Current feed rate
    pub feed_rate: f32,
}

/// Overrides as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OverrideReport {
    /// Feed override, percent
    pub feed: u16,
    /// Rapid override, percent
    pub rapid: u16,
    /// Spindle speed override, percent
    pub spindle: u16,
    /// Spindle stop override flags
    pub spindle_stop: u8,
}

/// Changed report values; `None` fields are left untouched
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReportUpdate {
    pub coolant: Option<u8>,
    pub spindle: Option<u8>,
    pub overrides: Option<OverrideReport>,
    /// Active work coordinate system (0 = G54)
    pub wcs: Option<u8>,
    /// Homed axes mask and whether every axis requiring homing is homed
    pub homed: Option<(u8, bool)>,
    pub tlo_referenced: Option<bool>,
    pub diameter: Option<bool>,
    pub mpg: Option<bool>,
}

/// Display status mirror
#[derive(Debug, Clone)]
pub struct StatusMirror {
    settings: DisplaySettings,
    packet: MachineStatusPacket,
    /// Header last acknowledged by the display
    sent: Option<[u8; STATUS_HEADER_LEN]>,
    pending: Pending,
    update_now: bool,
}

impl StatusMirror {
    pub fn new(settings: DisplaySettings) -> Self {
        Self {
            settings,
            packet: MachineStatusPacket::default(),
            sent: None,
            pending: Pending::None,
            update_now: false,
        }
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    pub fn packet(&self) -> &MachineStatusPacket {
        &self.packet
    }

    /// Hook the mirror into the status-report and keypad preview chains
    pub fn install(&self, bindings: &mut Bindings) -> Result<(), HookError> {
        bindings.status_message.install(StatusHandler::DisplayMirror)?;

        if let Err(e) = bindings.keypress_preview.install(PreviewHandler::Display) {
            bindings.status_message.remove(StatusHandler::DisplayMirror);
            return Err(e);
        }

        Ok(())
    }

    /// Setup is complete and packets are being sent
    pub fn is_active(&self) -> bool {
        self.packet.address != 0
    }

    /// Name and version for the host's plugin report
    pub fn report_options(&self, connected: bool) -> (&'static str, &'static str) {
        let version = if connected {
            DISPLAY_PLUGIN_VERSION
        } else {
            DISPLAY_PLUGIN_VERSION_DISCONNECTED
        };

        (DISPLAY_PLUGIN_NAME, version)
    }

    /// Fill in the initial state once the host is up
    pub fn complete_setup(
        &mut self,
        state: MachineState,
        substate: u8,
        report: &ReportUpdate,
        machine_mode: u8,
    ) {
        self.set_state(state, substate, None);
        self.add_reports(report);

        self.packet.address = 0x01;
        self.packet.status_code = StatusCode::OK.code();
        self.packet.machine_modes.mode = machine_mode;
        self.pending = Pending::None;
        self.update_now = false;
    }

    /// Machine state changed
    ///
    /// In alarm the alarm description is shown, cut after its first
    /// sentence.
    pub fn set_state(&mut self, state: MachineState, substate: u8, alarm: Option<&str>) {
        self.packet.machine_substate = substate;
        self.packet.machine_state = state.display_state();

        if self.packet.machine_state == DisplayState::Alarm {
            if let Some(description) = alarm {
                let end = description.find('.').map_or(description.len(), |i| i + 1);
                self.pending = Pending::Text(truncated(&description[..end]));
            }
        }

        self.request_update();
    }

    /// Jog mode, modifier or settings changed on the keypad
    pub fn jog_data_changed(&mut self, jog: &JogData) {
        self.packet.jog_mode = jog.mode_byte();
        self.packet.jog_stepsize = jog.stepsize();
        self.request_update();
    }

    /// Work coordinate offsets changed
    pub fn wco_changed(&mut self, offsets: [f32; 4]) {
        self.pending = Pending::WorkOffset(offsets);
        self.request_update();
    }

    /// Message from a G-code comment; empty clears the display message
    pub fn gcode_message(&mut self, message: &str) {
        self.pending = if message.is_empty() {
            Pending::Clear
        } else {
            Pending::Text(truncated(message))
        };
        self.request_update();
    }

    /// Status-report chain handler; records the code and passes it on
    pub fn status_message(&mut self, status: StatusCode) -> Flow<StatusCode> {
        self.packet.status_code = status.code();
        Flow::Next(status)
    }

    /// Realtime report values changed
    pub fn add_reports(&mut self, report: &ReportUpdate) {
        let p = &mut self.packet;

        if let Some(coolant) = report.coolant {
            p.coolant_state = coolant;
        }
        if let Some(spindle) = report.spindle {
            p.spindle_state = spindle;
        }
        if let Some(o) = report.overrides {
            p.feed_override = o.feed.min(255) as u8;
            p.spindle_override = o.spindle.min(255) as u8;
            p.spindle_stop = o.spindle_stop;
            self.pending = Pending::Overrides(Overrides {
                feed_rate: o.feed,
                rapid_rate: o.rapid,
                spindle_rpm: o.spindle,
                spindle_stop: o.spindle_stop,
            });
        }
        if let Some(wcs) = report.wcs {
            p.current_wcs = wcs;
        }
        if let Some((mask, all_homed)) = report.homed {
            p.home_state = mask;
            p.machine_modes.homed = all_homed;
        }
        if let Some(tlo) = report.tlo_referenced {
            p.machine_modes.tlo_referenced = tlo;
        }
        if let Some(diameter) = report.diameter {
            p.machine_modes.diameter = diameter;
        }
        if let Some(mpg) = report.mpg {
            p.machine_modes.mpg = mpg;
        }
    }

    /// Keypad preview chain handler
    ///
    /// Keys that change what the display shows trigger a quick refresh.
    /// Never consumes the key.
    pub fn keypress_preview(&mut self, keycode: u8) -> Flow<bool> {
        let refresh = matches!(
            RealtimeCommand::from_byte(keycode),
            Some(
                RealtimeCommand::StatusReport
                    | RealtimeCommand::SafetyDoor
                    | RealtimeCommand::OptionalStopToggle
                    | RealtimeCommand::SingleBlockToggle
                    | RealtimeCommand::ProbeConnectedToggle
            )
        );

        if refresh {
            self.request_update();
        }

        Flow::Next(false)
    }

    /// Ask for a refresh after the short event delay
    pub fn request_update(&mut self) {
        if self.is_active() {
            self.update_now = true;
        }
    }

    /// Delay until the next refresh (ms)
    ///
    /// Consumes a pending refresh request.
    pub fn next_delay(&mut self, state: MachineState) -> u32 {
        if core::mem::take(&mut self.update_now) {
            self.settings.update_now_ms
        } else if state == MachineState::Jog {
            self.settings.jog_refresh_ms
        } else {
            self.settings.refresh_ms
        }
    }

    /// Encode the packet to send, if any
    ///
    /// Returns `Ok(None)` when nothing changed since the last acknowledged
    /// packet and no message is pending.
    pub fn prepare(
        &mut self,
        live: &LiveStatus,
        buffer: &mut [u8],
    ) -> Result<Option<usize>, PacketError> {
        let p = &mut self.packet;
        p.coordinate = live.position;
        p.signals = live.signals;
        p.limits = live.limits;
        p.spindle_rpm = live.spindle_rpm;
        p.feed_rate = live.feed_rate;

        let unchanged = self.sent == Some(self.packet.encode_header());
        if unchanged && self.pending == Pending::None {
            return Ok(None);
        }

        let message = match &self.pending {
            Pending::None => Message::None,
            Pending::Text(text) => Message::Text(text.as_str()),
            Pending::Overrides(o) => Message::Overrides(*o),
            Pending::WorkOffset(offsets) => Message::WorkOffset(*offsets),
            Pending::Clear => Message::ClearMessage,
        };

        self.packet.encode(&message, buffer).map(Some)
    }

    /// The packet from the last [`prepare`](Self::prepare) was delivered
    pub fn commit(&mut self) {
        self.sent = Some(self.packet.encode_header());
        self.pending = Pending::None;
    }
}

/// Cut `text` to the display's message size on a character boundary
fn truncated(text: &str) -> MessageText {
    let mut end = text.len().min(MAX_TEXT_LEN);
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    let mut s = MessageText::new();
    // Cannot fail: `end` is within capacity
    let _ = s.push_str(&text[..end]);
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JogSettings;
    use crate::keypad::JogMode;
    use pendant_protocol::MAX_PACKET_LEN;

    fn active() -> StatusMirror {
        let mut mirror = StatusMirror::new(DisplaySettings::default());
        mirror.complete_setup(MachineState::Idle, 0, &ReportUpdate::default(), 0);
        mirror
    }

    fn send(mirror: &mut StatusMirror, live: &LiveStatus) -> Option<usize> {
        let mut buffer = [0u8; MAX_PACKET_LEN];
        let len = mirror.prepare(live, &mut buffer).unwrap();
        if len.is_some() {
            mirror.commit();
        }
        len
    }

    #[test]
    fn test_report_options() {
        let mirror = active();
        assert_eq!(mirror.report_options(true), ("I2C Display", "0.13"));
        assert_eq!(mirror.report_options(false), ("I2C Display", "0.13 (not connected)"));
    }

    #[test]
    fn test_sends_only_on_change() {
        let mut mirror = active();
        let live = LiveStatus::default();

        assert_eq!(send(&mut mirror, &live), Some(STATUS_HEADER_LEN));
        assert_eq!(send(&mut mirror, &live), None);

        let moved = LiveStatus {
            position: [1.0, 0.0, 0.0, 0.0],
            ..live
        };
        assert_eq!(send(&mut mirror, &moved), Some(STATUS_HEADER_LEN));
    }

    #[test]
    fn test_failed_send_is_retried() {
        let mut mirror = active();
        let mut buffer = [0u8; MAX_PACKET_LEN];

        mirror.gcode_message("Tool 3");
        assert_eq!(mirror.prepare(&LiveStatus::default(), &mut buffer), Ok(Some(STATUS_HEADER_LEN + 7)));
        // no commit
        assert_eq!(mirror.prepare(&LiveStatus::default(), &mut buffer), Ok(Some(STATUS_HEADER_LEN + 7)));
        assert_eq!(buffer[STATUS_HEADER_LEN], 6);
        assert_eq!(&buffer[STATUS_HEADER_LEN + 1..STATUS_HEADER_LEN + 7], b"Tool 3");
    }

    #[test]
    fn test_message_sent_once() {
        let mut mirror = active();
        let live = LiveStatus::default();
        send(&mut mirror, &live);

        mirror.wco_changed([1.0, 2.0, 3.0, 4.0]);
        assert_eq!(send(&mut mirror, &live), Some(STATUS_HEADER_LEN + 1 + 16));
        assert_eq!(send(&mut mirror, &live), None);
    }

    #[test]
    fn test_empty_gcode_message_clears() {
        let mut mirror = active();
        let mut buffer = [0u8; MAX_PACKET_LEN];

        mirror.gcode_message("");
        assert_eq!(mirror.prepare(&LiveStatus::default(), &mut buffer), Ok(Some(STATUS_HEADER_LEN + 1)));
        assert_eq!(buffer[STATUS_HEADER_LEN], 255);
    }

    #[test]
    fn test_alarm_description_cut_after_first_sentence() {
        let mut mirror = active();
        let mut buffer = [0u8; MAX_PACKET_LEN];

        mirror.set_state(MachineState::Alarm, 1, Some("Hard limit triggered. Position lost."));
        assert_eq!(mirror.packet().machine_state, DisplayState::Alarm);
        assert_eq!(mirror.packet().machine_substate, 1);

        let len = mirror.prepare(&LiveStatus::default(), &mut buffer).unwrap().unwrap();
        assert_eq!(&buffer[STATUS_HEADER_LEN + 1..len], b"Hard limit triggered.");
    }

    #[test]
    fn test_long_message_truncated() {
        let mut mirror = active();
        let mut buffer = [0u8; MAX_PACKET_LEN];
        let long = [b'x'; 200];

        mirror.gcode_message(core::str::from_utf8(&long).unwrap());
        let len = mirror.prepare(&LiveStatus::default(), &mut buffer).unwrap().unwrap();
        assert_eq!(buffer[STATUS_HEADER_LEN], 127);
        assert_eq!(len, STATUS_HEADER_LEN + 1 + 127);
    }

    #[test]
    fn test_overrides_report() {
        let mut mirror = active();
        let mut buffer = [0u8; MAX_PACKET_LEN];

        mirror.add_reports(&ReportUpdate {
            overrides: Some(OverrideReport {
                feed: 300,
                rapid: 50,
                spindle: 120,
                spindle_stop: 0,
            }),
            ..Default::default()
        });
        assert_eq!(mirror.packet().feed_override, 255);
        assert_eq!(mirror.packet().spindle_override, 120);

        let len = mirror.prepare(&LiveStatus::default(), &mut buffer).unwrap().unwrap();
        assert_eq!(buffer[STATUS_HEADER_LEN], 253);
        assert_eq!(&buffer[STATUS_HEADER_LEN + 1..len], &[44, 1, 50, 0, 120, 0, 0]);
    }

    #[test]
    fn test_status_observer_passes_code_on() {
        let mut mirror = active();
        assert_eq!(
            mirror.status_message(StatusCode::SOFT_LIMIT_ERROR),
            Flow::Next(StatusCode::SOFT_LIMIT_ERROR)
        );
        assert_eq!(mirror.packet().status_code, 10);
    }

    #[test]
    fn test_refresh_delays() {
        let mut mirror = StatusMirror::new(DisplaySettings::default());

        // Not active yet, events do not shorten the delay
        mirror.gcode_message("hi");
        assert_eq!(mirror.next_delay(MachineState::Idle), 300);

        let mut mirror = active();
        assert_eq!(mirror.next_delay(MachineState::Jog), 100);

        let mut jog = JogData::new(JogSettings::default());
        jog.mode = JogMode::Slow;
        mirror.jog_data_changed(&jog);
        assert_eq!(mirror.packet().jog_stepsize, 600.0);
        assert_eq!(mirror.next_delay(MachineState::Jog), 20);
        assert_eq!(mirror.next_delay(MachineState::Idle), 300);
    }

    #[test]
    fn test_preview_never_consumes() {
        let mut mirror = active();
        assert_eq!(mirror.keypress_preview(b'?'), Flow::Next(false));
        assert_eq!(mirror.next_delay(MachineState::Idle), 20);
        assert_eq!(mirror.keypress_preview(b'R'), Flow::Next(false));
        assert_eq!(mirror.next_delay(MachineState::Idle), 300);
    }
}
