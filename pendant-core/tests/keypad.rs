//! Keypad processing against a mock host

mod common;

use common::{MockSink, Rig};
use pendant_core::keypad::{JogMode, KeyOutcome, Keypad, KeypadInput};
use pendant_core::state::{MachineState, StatusCode};
use pendant_protocol::keycodes::{self, macro_key};
use pendant_protocol::{RealtimeCommand, ASCII_CAN};

struct Pad {
    rig: Rig,
    keypad: Keypad,
    input: KeypadInput,
    sink: MockSink,
}

impl Pad {
    fn new() -> Self {
        Self {
            rig: Rig::new(&[(0, "G0X0Y0")]),
            keypad: Keypad::default(),
            input: KeypadInput::new(),
            sink: MockSink::default(),
        }
    }

    /// Key arrives on the serial stream and is processed while still held
    fn press(&mut self, keycode: u8) -> KeyOutcome {
        self.input.enqueue_keycode(keycode, self.rig.host.state, &self.sink);
        self.rig.process_key(&mut self.keypad, &self.input)
    }
}

#[test]
fn test_no_key_pending() {
    let mut pad = Pad::new();
    assert_eq!(pad.rig.process_key(&mut pad.keypad, &pad.input), KeyOutcome::Idle);
}

#[test]
fn test_jog_while_held_then_cancel_on_release() {
    let mut pad = Pad::new();

    assert_eq!(pad.press(keycodes::JOG_XR), KeyOutcome::Jog(true));
    assert_eq!(pad.rig.host.gcode, vec!["$J=G91G21X3000F3000"]);
    assert!(pad.input.is_jogging());

    pad.input.enqueue_keycode(ASCII_CAN, MachineState::Jog, &pad.sink);
    assert_eq!(*pad.sink.sent.borrow(), vec![RealtimeCommand::JogCancel]);
    assert!(!pad.input.is_jogging());
}

#[test]
fn test_jog_skipped_after_release() {
    let mut pad = Pad::new();

    pad.input.strobe(true, &pad.sink);
    pad.input.push_keycode(keycodes::JOG_YB);
    pad.input.strobe(false, &pad.sink);

    assert_eq!(pad.rig.process_key(&mut pad.keypad, &pad.input), KeyOutcome::JogSkipped);
    assert!(pad.rig.host.gcode.is_empty());
    assert!(!pad.input.is_jogging());
}

#[test]
fn test_rejected_jog_does_not_set_jogging() {
    let mut pad = Pad::new();
    pad.rig.host.accept_gcode = false;

    assert_eq!(pad.press(keycodes::JOG_ZD), KeyOutcome::Jog(false));
    assert!(!pad.input.is_jogging());
}

#[test]
fn test_step_mode_jog() {
    let mut pad = Pad::new();

    assert_eq!(pad.press(b'2'), KeyOutcome::JogModeChanged(JogMode::Step));
    assert_eq!(pad.press(keycodes::JOG_XLYF), KeyOutcome::Jog(true));
    assert_eq!(pad.press(b'm'), KeyOutcome::JogDataChanged);
    pad.rig.host.imperial = true;
    assert_eq!(pad.press(keycodes::JOG_ZU), KeyOutcome::Jog(true));

    assert_eq!(
        pad.rig.host.gcode,
        vec!["$J=G91G21X-0.250Y0.250F100", "$J=G91G21Z0.0250F100"]
    );
}

#[test]
fn test_mode_cycle_key() {
    let mut pad = Pad::new();

    assert_eq!(pad.press(b'h'), KeyOutcome::JogModeChanged(JogMode::Slow));
    assert_eq!(pad.press(keycodes::JOG_XRZD), KeyOutcome::Jog(true));
    assert_eq!(pad.rig.host.gcode, vec!["$J=G91G21X500Z-500F600"]);
}

#[test]
fn test_jog_data_reaches_display() {
    let mut pad = Pad::new();

    pad.press(b'1');
    pad.press(b'm');
    pad.rig.mirror.jog_data_changed(pad.keypad.jog_data());

    let packet = pad.rig.mirror.packet();
    assert_eq!(packet.jog_mode.mode, 1);
    assert_eq!(packet.jog_mode.modifier, 1);
    assert!((packet.jog_stepsize - 60.0).abs() < 1e-3);
}

#[test]
fn test_alarm_allows_only_recovery_keys() {
    let mut pad = Pad::new();
    pad.rig.host.state = MachineState::Alarm;

    assert_eq!(pad.press(b'M'), KeyOutcome::Blocked(b'M'));
    assert_eq!(pad.press(keycodes::JOG_XR), KeyOutcome::Blocked(keycodes::JOG_XR));
    assert_eq!(pad.press(macro_key(0).unwrap()), KeyOutcome::Blocked(0xB0));
    assert!(pad.rig.host.realtime.is_empty());

    assert_eq!(pad.press(b'X'), KeyOutcome::System(StatusCode::OK));
    assert_eq!(pad.press(b'H'), KeyOutcome::System(StatusCode::OK));
    assert_eq!(pad.rig.host.system, vec!["$X", "$H"]);

    assert_eq!(pad.press(b'?'), KeyOutcome::Realtime(RealtimeCommand::StatusReport));
    assert_eq!(pad.press(ASCII_CAN), KeyOutcome::Realtime(RealtimeCommand::Reset));
}

#[test]
fn test_macro_key_goes_to_preview_chain() {
    let mut pad = Pad::new();

    assert_eq!(pad.press(macro_key(0).unwrap()), KeyOutcome::Previewed(0xB0));
    assert!(pad.rig.macros.is_running());
    assert_eq!(pad.rig.drain(), b"G0X0Y0\n");
}

#[test]
fn test_coolant_and_override_keys() {
    let mut pad = Pad::new();

    pad.press(b'M');
    pad.press(b'C');
    pad.press(b'i');
    pad.press(b'j');
    pad.press(b'I');
    pad.press(b'k');
    pad.press(b'z');
    pad.press(b'K');

    assert_eq!(
        pad.rig.host.realtime,
        vec![
            RealtimeCommand::CoolantMistToggle,
            RealtimeCommand::CoolantFloodToggle,
            RealtimeCommand::FeedCoarsePlus,
            RealtimeCommand::FeedCoarseMinus,
            RealtimeCommand::FeedReset,
            RealtimeCommand::SpindleCoarsePlus,
            RealtimeCommand::SpindleCoarseMinus,
            RealtimeCommand::SpindleReset,
        ]
    );
}

#[test]
fn test_realtime_passthrough() {
    let mut pad = Pad::new();

    assert_eq!(pad.press(b'!'), KeyOutcome::Realtime(RealtimeCommand::FeedHold));
    assert_eq!(pad.press(b'~'), KeyOutcome::Realtime(RealtimeCommand::CycleStart));
    assert_eq!(pad.press(0x93), KeyOutcome::Realtime(RealtimeCommand::FeedFinePlus));
    assert_eq!(pad.press(0x97), KeyOutcome::Realtime(RealtimeCommand::RapidLow));
    assert_eq!(pad.press(0x9E), KeyOutcome::Realtime(RealtimeCommand::SpindleStop));
    assert_eq!(pad.press(0x8A), KeyOutcome::Realtime(RealtimeCommand::Fan0Toggle));
    assert_eq!(pad.press(0x84), KeyOutcome::Realtime(RealtimeCommand::SafetyDoor));
    assert_eq!(pad.press(0x89), KeyOutcome::Realtime(RealtimeCommand::SingleBlockToggle));

    // Reports are not passed on
    assert_eq!(pad.press(0x83), KeyOutcome::Unknown(0x83));
    assert_eq!(pad.press(0x87), KeyOutcome::Unknown(0x87));
    assert_eq!(pad.press(b'Q'), KeyOutcome::Unknown(b'Q'));
}

#[test]
fn test_mpg_toggle() {
    let mut pad = Pad::new();

    assert_eq!(pad.press(0x8B), KeyOutcome::MpgToggled(true));
    assert!(pad.rig.host.mpg);

    pad.rig.host.mpg_capable = false;
    assert_eq!(pad.press(0x8B), KeyOutcome::MpgToggled(false));
}

#[test]
fn test_next_work_coordinate_system() {
    let mut pad = Pad::new();

    assert_eq!(pad.press(b'o'), KeyOutcome::Gcode(true));
    pad.rig.host.coord_system = 5;
    pad.press(b'o');
    pad.rig.host.coord_system = 8;
    pad.press(b'o');

    assert_eq!(pad.rig.host.gcode, vec!["G55", "G59.1", "G54"]);
}

#[test]
fn test_status_key_refreshes_display() {
    let mut pad = Pad::new();
    pad.rig
        .mirror
        .complete_setup(MachineState::Idle, 0, &Default::default(), 0);

    pad.press(b'?');
    assert_eq!(pad.rig.mirror.next_delay(MachineState::Idle), 20);
}

#[test]
fn test_report_options() {
    let keypad = Keypad::default();
    assert_eq!(keypad.report_options(true), ("Keypad", "1.42"));
    assert_eq!(keypad.report_options(false), ("Keypad", "1.42 (not connected)"));
}
