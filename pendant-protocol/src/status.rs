//! Machine status packet for the I2C display
//!
//! Packet format (all multi-byte fields little endian, no padding):
//!
//! | Offset | Size | Field                                   |
//! |--------|------|-----------------------------------------|
//! | 0      | 1    | address (0 until setup completes)       |
//! | 1      | 1    | machine state ([`DisplayState`])        |
//! | 2      | 1    | machine substate                        |
//! | 3      | 1    | homed axes mask                         |
//! | 4      | 1    | feed override %                         |
//! | 5      | 1    | spindle override %                      |
//! | 6      | 1    | spindle stop override                   |
//! | 7      | 1    | spindle state bits                      |
//! | 8      | 4    | spindle RPM (i32)                       |
//! | 12     | 4    | feed rate (f32)                         |
//! | 16     | 1    | coolant state bits                      |
//! | 17     | 1    | jog mode ([`JogModeByte`])              |
//! | 18     | 2    | control signals (u16)                   |
//! | 20     | 4    | jog step size (f32)                     |
//! | 24     | 1    | active work coordinate system           |
//! | 25     | 1    | limit switch mask                       |
//! | 26     | 1    | last status code                        |
//! | 27     | 1    | machine modes ([`MachineModes`])        |
//! | 28     | 16   | X, Y, Z, A work coordinates (f32)       |
//! | 44     | 1    | message type ([`MsgType`]), optional    |
//! | 45     | n    | message payload, optional               |

use heapless::Vec;

/// Length of the fixed status header
pub const STATUS_HEADER_LEN: usize = 44;

/// Maximum message payload size
pub const MAX_MESSAGE_LEN: usize = 128;

/// Maximum complete packet size
pub const MAX_PACKET_LEN: usize = STATUS_HEADER_LEN + 1 + MAX_MESSAGE_LEN;

/// Encoded size of [`Overrides`]
pub const OVERRIDES_LEN: usize = 7;

/// Encoded size of a work offset message
pub const WORK_OFFSET_LEN: usize = 16;

/// Errors from packet encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// Output buffer cannot hold the packet
    BufferTooSmall,
    /// Text message longer than the display accepts
    MessageTooLong,
}

/// Machine state as understood by the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DisplayState {
    Alarm = 1,
    Cycle = 2,
    Hold = 3,
    ToolChange = 4,
    #[default]
    Idle = 5,
    Homing = 6,
    Jog = 7,
    Other = 254,
}

/// Message type byte
///
/// Values 1-127 announce a text message of that length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MsgType {
    #[default]
    None,
    Text(u8),
    Overrides,
    WorkOffset,
    ClearMessage,
}

impl MsgType {
    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            MsgType::None => 0,
            MsgType::Text(len) => len,
            MsgType::Overrides => 253,
            MsgType::WorkOffset => 254,
            MsgType::ClearMessage => 255,
        }
    }
}

/// Jog mode and modifier packed into one byte (modifier in the low nibble)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JogModeByte {
    pub mode: u8,
    pub modifier: u8,
}

impl JogModeByte {
    pub fn to_byte(self) -> u8 {
        (self.modifier & 0x0F) | ((self.mode & 0x0F) << 4)
    }
}

/// Machine mode flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MachineModes {
    /// Lathe diameter mode active
    pub diameter: bool,
    /// Controller is in MPG mode
    pub mpg: bool,
    /// All axes that require homing are homed
    pub homed: bool,
    /// Tool length offset reference set
    pub tlo_referenced: bool,
    /// Machine mode setting (mill, laser, lathe)
    pub mode: u8,
}

impl MachineModes {
    pub fn to_byte(self) -> u8 {
        (self.diameter as u8)
            | (self.mpg as u8) << 1
            | (self.homed as u8) << 2
            | (self.tlo_referenced as u8) << 3
            | (self.mode & 0x07) << 4
    }
}

/// Override values sent with [`MsgType::Overrides`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Overrides {
    pub feed_rate: u16,
    pub rapid_rate: u16,
    pub spindle_rpm: u16,
    pub spindle_stop: u8,
}

/// Optional message appended to a status packet
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message<'a> {
    None,
    Text(&'a str),
    Overrides(Overrides),
    WorkOffset([f32; 4]),
    ClearMessage,
}

impl Message<'_> {
    /// Message type byte announcing this message
    pub fn msg_type(&self) -> Result<MsgType, PacketError> {
        Ok(match self {
            Message::None => MsgType::None,
            Message::Text(text) if text.is_empty() => MsgType::ClearMessage,
            Message::Text(text) => {
                if text.len() >= MAX_MESSAGE_LEN {
                    return Err(PacketError::MessageTooLong);
                }
                MsgType::Text(text.len() as u8)
            }
            Message::Overrides(_) => MsgType::Overrides,
            Message::WorkOffset(_) => MsgType::WorkOffset,
            Message::ClearMessage => MsgType::ClearMessage,
        })
    }
}

/// Machine status mirrored to the display
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MachineStatusPacket {
    pub address: u8,
    pub machine_state: DisplayState,
    pub machine_substate: u8,
    pub home_state: u8,
    pub feed_override: u8,
    pub spindle_override: u8,
    pub spindle_stop: u8,
    pub spindle_state: u8,
    pub spindle_rpm: i32,
    pub feed_rate: f32,
    pub coolant_state: u8,
    pub jog_mode: JogModeByte,
    pub signals: u16,
    pub jog_stepsize: f32,
    pub current_wcs: u8,
    pub limits: u8,
    pub status_code: u8,
    pub machine_modes: MachineModes,
    pub coordinate: [f32; 4],
}

/// Little endian cursor over an output buffer
struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn bytes(&mut self, data: &[u8]) -> Result<(), PacketError> {
        let end = self.pos + data.len();
        self.buf
            .get_mut(self.pos..end)
            .ok_or(PacketError::BufferTooSmall)?
            .copy_from_slice(data);
        self.pos = end;
        Ok(())
    }

    fn u8(&mut self, value: u8) -> Result<(), PacketError> {
        self.bytes(&[value])
    }

    fn f32(&mut self, value: f32) -> Result<(), PacketError> {
        self.bytes(&value.to_le_bytes())
    }
}

impl MachineStatusPacket {
    /// Encode the fixed header
    ///
    /// Two packets with equal headers produce no visible change on the
    /// display, so the encoded header doubles as the change detector.
    pub fn encode_header(&self) -> [u8; STATUS_HEADER_LEN] {
        let mut header = [0u8; STATUS_HEADER_LEN];
        // Cannot fail: the header buffer has exactly the required size
        let _ = self.write_header(&mut Writer::new(&mut header));
        header
    }

    fn write_header(&self, w: &mut Writer<'_>) -> Result<(), PacketError> {
        w.u8(self.address)?;
        w.u8(self.machine_state as u8)?;
        w.u8(self.machine_substate)?;
        w.u8(self.home_state)?;
        w.u8(self.feed_override)?;
        w.u8(self.spindle_override)?;
        w.u8(self.spindle_stop)?;
        w.u8(self.spindle_state)?;
        w.bytes(&self.spindle_rpm.to_le_bytes())?;
        w.f32(self.feed_rate)?;
        w.u8(self.coolant_state)?;
        w.u8(self.jog_mode.to_byte())?;
        w.bytes(&self.signals.to_le_bytes())?;
        w.f32(self.jog_stepsize)?;
        w.u8(self.current_wcs)?;
        w.u8(self.limits)?;
        w.u8(self.status_code)?;
        w.u8(self.machine_modes.to_byte())?;
        for value in self.coordinate {
            w.f32(value)?;
        }
        Ok(())
    }

    /// Encode a complete packet into `buffer`
    ///
    /// Returns the number of bytes to transmit. Without a message the
    /// message type byte is left off.
    pub fn encode(&self, message: &Message<'_>, buffer: &mut [u8]) -> Result<usize, PacketError> {
        let msg_type = message.msg_type()?;
        let mut w = Writer::new(buffer);

        self.write_header(&mut w)?;

        if msg_type == MsgType::None {
            return Ok(w.pos);
        }

        w.u8(msg_type.to_byte())?;

        match message {
            Message::Text(text) => w.bytes(text.as_bytes())?,
            Message::Overrides(o) => {
                w.bytes(&o.feed_rate.to_le_bytes())?;
                w.bytes(&o.rapid_rate.to_le_bytes())?;
                w.bytes(&o.spindle_rpm.to_le_bytes())?;
                w.u8(o.spindle_stop)?;
            }
            Message::WorkOffset(offsets) => {
                for value in offsets {
                    w.f32(*value)?;
                }
            }
            Message::None | Message::ClearMessage => {}
        }

        Ok(w.pos)
    }

    /// Encode a complete packet into a heapless Vec
    pub fn encode_to_vec(&self, message: &Message<'_>) -> Result<Vec<u8, MAX_PACKET_LEN>, PacketError> {
        let mut buffer = [0u8; MAX_PACKET_LEN];
        let len = self.encode(message, &mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| PacketError::BufferTooSmall)?;
        Ok(vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MachineStatusPacket {
        MachineStatusPacket {
            address: 1,
            machine_state: DisplayState::Jog,
            spindle_rpm: 12000,
            feed_rate: 250.0,
            jog_mode: JogModeByte { mode: 1, modifier: 2 },
            signals: 0x0102,
            coordinate: [1.0, -2.0, 3.5, f32::NAN],
            ..Default::default()
        }
    }

    #[test]
    fn test_header_layout() {
        let header = sample().encode_header();

        assert_eq!(header[0], 1);
        assert_eq!(header[1], 7); // Jog
        assert_eq!(&header[8..12], &12000i32.to_le_bytes());
        assert_eq!(&header[12..16], &250.0f32.to_le_bytes());
        assert_eq!(header[17], 0x12); // mode 1, modifier 2
        assert_eq!(&header[18..20], &[0x02, 0x01]);
        assert_eq!(&header[28..32], &1.0f32.to_le_bytes());
        assert_eq!(&header[32..36], &(-2.0f32).to_le_bytes());
    }

    #[test]
    fn test_no_message_omits_type_byte() {
        let packet = sample();
        let mut buf = [0u8; MAX_PACKET_LEN];
        let len = packet.encode(&Message::None, &mut buf).unwrap();
        assert_eq!(len, STATUS_HEADER_LEN);
    }

    #[test]
    fn test_text_message() {
        let packet = sample();
        let encoded = packet.encode_to_vec(&Message::Text("Probe")).unwrap();

        assert_eq!(encoded.len(), STATUS_HEADER_LEN + 1 + 5);
        assert_eq!(encoded[STATUS_HEADER_LEN], 5);
        assert_eq!(&encoded[STATUS_HEADER_LEN + 1..], b"Probe");
    }

    #[test]
    fn test_empty_text_clears_message() {
        let packet = sample();
        let encoded = packet.encode_to_vec(&Message::Text("")).unwrap();

        assert_eq!(encoded.len(), STATUS_HEADER_LEN + 1);
        assert_eq!(encoded[STATUS_HEADER_LEN], 255);
    }

    #[test]
    fn test_overrides_and_work_offset_sizes() {
        let packet = sample();

        let overrides = Overrides { feed_rate: 120, rapid_rate: 100, spindle_rpm: 90, spindle_stop: 0 };
        let encoded = packet.encode_to_vec(&Message::Overrides(overrides)).unwrap();
        assert_eq!(encoded.len(), STATUS_HEADER_LEN + 1 + OVERRIDES_LEN);
        assert_eq!(encoded[STATUS_HEADER_LEN], 253);

        let encoded = packet.encode_to_vec(&Message::WorkOffset([0.0; 4])).unwrap();
        assert_eq!(encoded.len(), STATUS_HEADER_LEN + 1 + WORK_OFFSET_LEN);
        assert_eq!(encoded[STATUS_HEADER_LEN], 254);
    }

    #[test]
    fn test_message_too_long() {
        let long = core::str::from_utf8(&[b'a'; MAX_MESSAGE_LEN]).unwrap();
        assert_eq!(
            sample().encode_to_vec(&Message::Text(long)),
            Err(PacketError::MessageTooLong)
        );
    }

    #[test]
    fn test_buffer_too_small() {
        let mut buf = [0u8; 10];
        assert_eq!(
            sample().encode(&Message::None, &mut buf),
            Err(PacketError::BufferTooSmall)
        );
    }

    #[test]
    fn test_modes_byte() {
        let modes = MachineModes { diameter: true, mpg: false, homed: true, tlo_referenced: true, mode: 2 };
        assert_eq!(modes.to_byte(), 0b0010_1101);
    }
}
