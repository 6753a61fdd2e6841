//! Mock host controller and collaborators for integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use pendant_core::config::DisplaySettings;
use pendant_core::display::StatusMirror;
use pendant_core::hooks::{
    Bindings, CharSource, Flow, PreviewHandler, ResetHandler, ReturnHandler, StatusHandler, StreamId,
};
use pendant_core::keypad::{KeyOutcome, Keypad, KeypadInput};
use pendant_core::macros::{MacroStore, Macros};
use pendant_core::state::{MachineState, StatusCode};
use pendant_core::traits::{Host, KeypadHost, MessageKind, RealtimeSink};
use pendant_hal::{AuxInputs, FlashError, FlashStorage, InputConfig, IrqMode, PinCaps, StorageKey};
use pendant_protocol::RealtimeCommand;

/// Stream id of the mock serial port
pub const SERIAL: StreamId = StreamId(1);

/// Host controller recording everything the plugins ask of it
pub struct MockHost {
    pub state: MachineState,
    pub bindings: Bindings,
    pub realtime: Vec<RealtimeCommand>,
    pub messages: Vec<(String, MessageKind)>,
    pub gcode: Vec<String>,
    pub system: Vec<String>,
    pub accept_gcode: bool,
    pub coord_system: u8,
    pub imperial: bool,
    pub mpg_capable: bool,
    pub mpg: bool,
    /// Handlers visited by each macro-finished dispatch
    pub finished_runs: Vec<Vec<ReturnHandler>>,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            state: MachineState::Idle,
            bindings: Bindings::new(SERIAL),
            realtime: Vec::new(),
            messages: Vec::new(),
            gcode: Vec::new(),
            system: Vec::new(),
            accept_gcode: true,
            coord_system: 0,
            imperial: false,
            mpg_capable: true,
            mpg: false,
            finished_runs: Vec::new(),
        }
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(_, kind)| *kind == MessageKind::Warning)
            .map(|(text, _)| text.as_str())
            .collect()
    }
}

impl Host for MockHost {
    fn state(&self) -> MachineState {
        self.state
    }

    fn bindings(&mut self) -> &mut Bindings {
        &mut self.bindings
    }

    fn enqueue_realtime_command(&mut self, cmd: RealtimeCommand) -> bool {
        self.realtime.push(cmd);
        true
    }

    fn report_message(&mut self, message: &str, kind: MessageKind) {
        self.messages.push((message.to_string(), kind));
    }

    fn macro_finished(&mut self) {
        let chain = self.bindings.macro_return.clone();
        let mut seen = Vec::new();
        chain.dispatch((), |handler, ()| {
            seen.push(handler);
            Flow::Next(())
        });
        self.finished_runs.push(seen);
    }
}

impl KeypadHost for MockHost {
    fn enqueue_gcode(&mut self, block: &str) -> bool {
        if self.accept_gcode {
            self.gcode.push(block.to_string());
        }
        self.accept_gcode
    }

    fn execute_system_command(&mut self, line: &str) -> StatusCode {
        self.system.push(line.to_string());
        StatusCode::OK
    }

    fn coord_system(&self) -> u8 {
        self.coord_system
    }

    fn units_imperial(&self) -> bool {
        self.imperial
    }

    fn toggle_mpg_mode(&mut self) -> bool {
        if self.mpg_capable {
            self.mpg = !self.mpg;
        }
        self.mpg_capable
    }
}

/// Realtime queue usable from "interrupt" context
#[derive(Default)]
pub struct MockSink {
    pub sent: RefCell<Vec<RealtimeCommand>>,
}

impl RealtimeSink for MockSink {
    fn enqueue(&self, cmd: RealtimeCommand) -> bool {
        self.sent.borrow_mut().push(cmd);
        true
    }
}

/// Key-value settings storage
#[derive(Default)]
pub struct MockFlash {
    pub blocks: HashMap<u8, Vec<u8>>,
    pub writes: usize,
    pub fail_writes: bool,
    /// Length reported by reads instead of the stored length
    pub read_len: Option<usize>,
}

impl MockFlash {
    pub fn erased(key: StorageKey) -> Self {
        let mut flash = Self::default();
        flash.blocks.insert(key.as_u8(), vec![0xFF; 64]);
        flash
    }
}

impl FlashStorage for MockFlash {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let data = self.blocks.get(&key.as_u8()).ok_or(FlashError::NotFound)?;
        let target = buffer
            .get_mut(..data.len())
            .ok_or(FlashError::BufferTooSmall)?;
        target.copy_from_slice(data);
        Ok(self.read_len.unwrap_or(data.len()))
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        if self.fail_writes {
            return Err(FlashError::Flash);
        }
        self.writes += 1;
        self.blocks.insert(key.as_u8(), data.to_vec());
        Ok(())
    }

    async fn exists(&mut self, key: StorageKey) -> bool {
        self.blocks.contains_key(&key.as_u8())
    }
}

/// Aux input ports, all interrupt capable unless told otherwise
pub struct MockAux {
    pub count: u8,
    pub caps: Vec<PinCaps>,
    pub claimed: Vec<(u8, &'static str)>,
    pub configured: Vec<(u8, InputConfig)>,
    pub irqs: Vec<(u8, IrqMode)>,
    pub refuse_irq: Vec<u8>,
}

impl MockAux {
    pub fn new(count: u8) -> Self {
        let caps = PinCaps {
            irq_falling: true,
            debounce: true,
            claimable: true,
        };

        Self {
            count,
            caps: vec![caps; count as usize],
            claimed: Vec::new(),
            configured: Vec::new(),
            irqs: Vec::new(),
            refuse_irq: Vec::new(),
        }
    }

    fn is_claimed(&self, port: u8) -> bool {
        self.claimed.iter().any(|(p, _)| *p == port)
    }
}

impl AuxInputs for MockAux {
    fn available(&self) -> u8 {
        self.count
    }

    fn caps(&self, port: u8) -> Option<PinCaps> {
        let mut caps = *self.caps.get(port as usize)?;
        caps.claimable &= !self.is_claimed(port);
        Some(caps)
    }

    fn find_free(&self, below: Option<u8>) -> Option<u8> {
        let top = below.unwrap_or(self.count).min(self.count);
        (0..top).rev().find(|port| self.is_claimable(*port))
    }

    fn claim(&mut self, port: u8, description: &'static str) -> bool {
        if !self.is_claimable(port) {
            return false;
        }
        self.claimed.push((port, description));
        true
    }

    fn configure(&mut self, port: u8, config: InputConfig) {
        self.configured.push((port, config));
    }

    fn enable_irq(&mut self, port: u8, mode: IrqMode) -> bool {
        if self.refuse_irq.contains(&port) {
            return false;
        }
        self.irqs.push((port, mode));
        true
    }
}

/// Host with the macro plugin and display mirror installed
///
/// Dispatches the host chains the way the controller does: over a clone,
/// so handlers may rebind entries while the dispatch runs.
pub struct Rig {
    pub host: MockHost,
    pub macros: Macros,
    pub mirror: StatusMirror,
    /// Statuses that reached the controller's own reporter
    pub reported: Vec<StatusCode>,
    /// Character source seen by each run of the driver's own reset
    pub resets: Vec<CharSource>,
}

impl Rig {
    /// Rig without port mapping and with the given macro texts
    pub fn new(slots: &[(u8, &str)]) -> Self {
        let aux = MockAux::new(0);
        let mut store = MacroStore::new(&aux);
        for (slot, text) in slots {
            store.set(*slot, text).unwrap();
        }

        let mut host = MockHost::new();
        let mirror = StatusMirror::new(DisplaySettings::default());
        mirror.install(&mut host.bindings).unwrap();

        let macros = Macros::new(store);
        macros.install(&mut host.bindings).unwrap();

        Self {
            host,
            macros,
            mirror,
            reported: Vec::new(),
            resets: Vec::new(),
        }
    }

    /// Bindings with plugins installed and no macro running
    pub fn baseline(&self) -> Bindings {
        let mut bindings = Bindings::new(SERIAL);
        self.mirror.install(&mut bindings).unwrap();
        self.macros.install(&mut bindings).unwrap();
        bindings
    }

    /// Parser reads one character from the current source
    pub fn read_char(&mut self) -> Option<u8> {
        match self.host.bindings.stream {
            CharSource::Macro(_) => self.macros.read_char(&mut self.host),
            CharSource::Device(_) => None,
        }
    }

    /// Everything the parser reads until the macro stream ends
    pub fn drain(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(c) = self.read_char() {
            out.push(c);
        }
        out
    }

    /// Read up to and including the next line feed
    pub fn read_block(&mut self) -> String {
        let mut block = String::new();
        while let Some(c) = self.read_char() {
            if c == b'\n' {
                break;
            }
            block.push(c as char);
        }
        block
    }

    /// Parser reports the status of the last block
    pub fn report_status(&mut self, status: StatusCode) -> StatusCode {
        let chain = self.host.bindings.status_message.clone();
        chain.dispatch(status, |handler, status| match handler {
            StatusHandler::MacroTrap => self.macros.status_message(&mut self.host, status),
            StatusHandler::DisplayMirror => self.mirror.status_message(status),
            StatusHandler::Report => {
                self.reported.push(status);
                Flow::Done(status)
            }
            StatusHandler::External(_) => Flow::Next(status),
        })
    }

    /// Driver reset (soft reset, e-stop)
    pub fn driver_reset(&mut self) {
        let chain = self.host.bindings.driver_reset.clone();
        chain.dispatch((), |handler, ()| match handler {
            ResetHandler::Macros => self.macros.driver_reset(&mut self.host),
            ResetHandler::Driver => {
                self.resets.push(self.host.bindings.stream);
                Flow::Next(())
            }
            ResetHandler::External(_) => Flow::Next(()),
        });
    }

    /// Host runs the macro-finished chain on its own, e.g. on M99
    pub fn macro_return(&mut self) {
        let chain = self.host.bindings.macro_return.clone();
        chain.dispatch((), |handler, ()| match handler {
            ReturnHandler::MacroEnd => self.macros.macro_return(&mut self.host),
            _ => Flow::Next(()),
        });
    }

    /// Keypad preview chain
    pub fn preview(&mut self, keycode: u8) -> bool {
        preview(&mut self.host, &mut self.macros, &mut self.mirror, keycode)
    }

    /// Process one buffered key with the preview chain wired up
    pub fn process_key(&mut self, keypad: &mut Keypad, input: &KeypadInput) -> KeyOutcome {
        let macros = &mut self.macros;
        let mirror = &mut self.mirror;
        keypad.process_keypress(&mut self.host, input, |host, keycode| {
            preview(host, macros, mirror, keycode)
        })
    }
}

fn preview(host: &mut MockHost, macros: &mut Macros, mirror: &mut StatusMirror, keycode: u8) -> bool {
    let chain = host.bindings.keypress_preview.clone();
    chain.dispatch(false, |handler, consumed| match handler {
        PreviewHandler::Macros => macros.keypress_preview(host, keycode),
        PreviewHandler::Display => mirror.keypress_preview(keycode),
        PreviewHandler::External(_) => Flow::Next(consumed),
    })
}
