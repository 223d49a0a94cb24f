//! Packet kinds, code tables and the in-memory packet.
//!
//! Kinds and codes are single bytes on the wire. Command codes are only
//! meaningful in COMMAND packets; response codes are shared by RESPONSE and
//! ERROR packets.

/// Number of numeric parameters carried by every packet.
pub const PARAM_COUNT: usize = 10;

/// Capacity of the text field in bytes.
pub const TEXT_CAPACITY: usize = 32;

/// What a packet is, and therefore how `code` and `params` are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    Command,
    Response,
    Error,
    Message,
    Hello,
    /// A kind byte outside the table. Preserved so decoding stays total.
    Unknown(u8),
}

impl PacketKind {
    pub const COMMAND: u8 = 0;
    pub const RESPONSE: u8 = 1;
    pub const ERROR: u8 = 2;
    pub const MESSAGE: u8 = 3;
    pub const HELLO: u8 = 4;

    pub fn from_u8(value: u8) -> Self {
        match value {
            Self::COMMAND => Self::Command,
            Self::RESPONSE => Self::Response,
            Self::ERROR => Self::Error,
            Self::MESSAGE => Self::Message,
            Self::HELLO => Self::Hello,
            other => Self::Unknown(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Command => Self::COMMAND,
            Self::Response => Self::RESPONSE,
            Self::Error => Self::ERROR,
            Self::Message => Self::MESSAGE,
            Self::Hello => Self::HELLO,
            Self::Unknown(other) => other,
        }
    }

    /// Human-readable name for logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Command => "COMMAND",
            Self::Response => "RESPONSE",
            Self::Error => "ERROR",
            Self::Message => "MESSAGE",
            Self::Hello => "HELLO",
            Self::Unknown(_) => "UNKNOWN",
        }
    }
}

/// Command identifiers understood by the robot firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandCode {
    Forward = 0,
    Reverse = 1,
    TurnLeft = 2,
    TurnRight = 3,
    Stop = 4,
    GetStats = 5,
    ClearStats = 6,
    Open = 7,
    Close = 8,
    Scan = 9,
    Drop = 10,
}

impl TryFrom<u8> for CommandCode {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, u8> {
        Ok(match value {
            0 => Self::Forward,
            1 => Self::Reverse,
            2 => Self::TurnLeft,
            3 => Self::TurnRight,
            4 => Self::Stop,
            5 => Self::GetStats,
            6 => Self::ClearStats,
            7 => Self::Open,
            8 => Self::Close,
            9 => Self::Scan,
            10 => Self::Drop,
            other => return Err(other),
        })
    }
}

/// Response and error identifiers sent back by the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResponseCode {
    Ok = 0,
    Status = 1,
    BadPacket = 2,
    BadChecksum = 3,
    BadCommand = 4,
    BadResponse = 5,
    Color = 6,
}

impl TryFrom<u8> for ResponseCode {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, u8> {
        Ok(match value {
            0 => Self::Ok,
            1 => Self::Status,
            2 => Self::BadPacket,
            3 => Self::BadChecksum,
            4 => Self::BadCommand,
            5 => Self::BadResponse,
            6 => Self::Color,
            other => return Err(other),
        })
    }
}

/// One unit of exchange with the robot.
///
/// Every field is always present on the wire; fields a given kind does
/// not use are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    pub kind: PacketKind,
    pub code: u8,
    pub params: [u32; PARAM_COUNT],
    pub text: [u8; TEXT_CAPACITY],
}

impl Packet {
    /// A packet with zeroed params and text.
    pub fn new(kind: PacketKind, code: u8) -> Self {
        Self {
            kind,
            code,
            params: [0; PARAM_COUNT],
            text: [0; TEXT_CAPACITY],
        }
    }

    /// A COMMAND packet. Extra params beyond [`PARAM_COUNT`] are ignored.
    pub fn command(code: CommandCode, params: &[u32]) -> Self {
        Self::new(PacketKind::Command, code as u8).with_params(params)
    }

    /// A HELLO packet announcing the host.
    pub fn hello() -> Self {
        Self::new(PacketKind::Hello, 0)
    }

    /// A RESPONSE packet.
    pub fn response(code: ResponseCode, params: &[u32]) -> Self {
        Self::new(PacketKind::Response, code as u8).with_params(params)
    }

    /// An ERROR packet.
    pub fn error(code: ResponseCode) -> Self {
        Self::new(PacketKind::Error, code as u8)
    }

    /// A MESSAGE packet. Text longer than [`TEXT_CAPACITY`] is truncated.
    pub fn message(text: &str) -> Self {
        Self::new(PacketKind::Message, 0).with_text(text.as_bytes())
    }

    /// Copy `params` into the leading slots; remaining slots stay zero.
    pub fn with_params(mut self, params: &[u32]) -> Self {
        self.params = [0; PARAM_COUNT];
        let n = params.len().min(PARAM_COUNT);
        self.params[..n].copy_from_slice(&params[..n]);
        self
    }

    /// Copy `text` into the text field; remaining bytes stay zero.
    pub fn with_text(mut self, text: &[u8]) -> Self {
        self.text = [0; TEXT_CAPACITY];
        let n = text.len().min(TEXT_CAPACITY);
        self.text[..n].copy_from_slice(&text[..n]);
        self
    }

    /// The text field up to the first NUL, decoded lossily.
    pub fn text_lossy(&self) -> String {
        let end = self
            .text
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(TEXT_CAPACITY);
        String::from_utf8_lossy(&self.text[..end]).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_bytes_roundtrip() {
        for value in 0..=u8::MAX {
            assert_eq!(PacketKind::from_u8(value).as_u8(), value);
        }
        assert_eq!(PacketKind::from_u8(3), PacketKind::Message);
        assert_eq!(PacketKind::from_u8(9), PacketKind::Unknown(9));
    }

    #[test]
    fn command_codes_match_firmware_table() {
        assert_eq!(CommandCode::Forward as u8, 0);
        assert_eq!(CommandCode::Stop as u8, 4);
        assert_eq!(CommandCode::Drop as u8, 10);
        assert_eq!(CommandCode::try_from(7), Ok(CommandCode::Open));
        assert_eq!(CommandCode::try_from(11), Err(11));
    }

    #[test]
    fn response_codes_match_firmware_table() {
        assert_eq!(ResponseCode::try_from(0), Ok(ResponseCode::Ok));
        assert_eq!(ResponseCode::try_from(6), Ok(ResponseCode::Color));
        assert_eq!(ResponseCode::try_from(42), Err(42));
    }

    #[test]
    fn command_zero_pads_unused_params() {
        let packet = Packet::command(CommandCode::Forward, &[25, 70]);
        assert_eq!(packet.kind, PacketKind::Command);
        assert_eq!(packet.code, 0);
        assert_eq!(packet.params, [25, 70, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(packet.text, [0; TEXT_CAPACITY]);
    }

    #[test]
    fn with_params_ignores_overflow() {
        let many: Vec<u32> = (1..=12).collect();
        let packet = Packet::new(PacketKind::Response, 1).with_params(&many);
        assert_eq!(packet.params, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn message_text_truncates_and_stops_at_nul() {
        let long = "x".repeat(40);
        let packet = Packet::message(&long);
        assert_eq!(packet.text_lossy().len(), TEXT_CAPACITY);

        let short = Packet::message("battery low");
        assert_eq!(short.text_lossy(), "battery low");
        assert!(short.text[11..].iter().all(|&b| b == 0));
    }
}
