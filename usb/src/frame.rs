use crate::error::CommandError;
use std::fmt;

/// Every transfer in either direction is exactly this long.
pub const FRAME_SIZE: usize = 64;

/// First byte of every command and of every reply the device produces.
pub const COMMAND_CLASS: u8 = 0x5a;

/// Opcode the device uses to acknowledge a state change.
pub const OPCODE_ACK: u8 = 0x02;

const HEADER_SIZE: usize = 3;

#[derive(Clone, PartialEq, Eq)]
pub struct Frame([u8; FRAME_SIZE]);

impl Frame {
    pub fn as_bytes(&self) -> &[u8; FRAME_SIZE] {
        &self.0
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({:02x?})", &self.0[..12])
    }
}

/// Places `command` at the start of a zeroed frame.
pub fn encode(command: &[u8]) -> Result<Frame, CommandError> {
    if command.len() > FRAME_SIZE {
        return Err(CommandError::FrameTooLong {
            length: command.len(),
            max: FRAME_SIZE,
        });
    }

    let mut frame = [0; FRAME_SIZE];
    frame[..command.len()].copy_from_slice(command);
    Ok(Frame(frame))
}

/// A read-only view of a frame received from the device.
///
/// Replies carry no schema: `[class, opcode, length, ...]` is common to all of
/// them, but where the interesting bytes start depends entirely on which
/// command was sent. The accessors here never fail, interpreting the payload
/// is left to whoever issued the command.
#[derive(Clone, PartialEq, Eq)]
pub struct Response {
    data: [u8; FRAME_SIZE],
}

impl Response {
    /// Copies up to `FRAME_SIZE` bytes, anything missing stays zeroed.
    pub fn from_bytes(raw: &[u8]) -> Self {
        let mut data = [0; FRAME_SIZE];
        let length = raw.len().min(FRAME_SIZE);
        data[..length].copy_from_slice(&raw[..length]);
        Self { data }
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_SIZE] {
        &self.data
    }

    pub fn class(&self) -> u8 {
        self.data[0]
    }

    pub fn opcode(&self) -> u8 {
        self.data[1]
    }

    /// The payload length the device declared in byte 2.
    pub fn length(&self) -> u8 {
        self.data[2]
    }

    /// The raw header (class, opcode, length). Nothing is known about failure
    /// reporting in the firmware, so this is handed back untouched.
    pub fn status(&self) -> [u8; HEADER_SIZE] {
        [self.data[0], self.data[1], self.data[2]]
    }

    pub fn byte(&self, offset: usize) -> Option<u8> {
        self.data.get(offset).copied()
    }

    pub fn payload(&self, offset: usize) -> &[u8] {
        &self.data[offset.min(FRAME_SIZE)..]
    }

    /// `length()` bytes starting at `start`, clamped to the frame.
    pub fn length_prefixed(&self, start: usize) -> &[u8] {
        let start = start.min(FRAME_SIZE);
        let end = (start + self.length() as usize).min(FRAME_SIZE);
        &self.data[start..end]
    }

    pub fn is_ack(&self) -> bool {
        self.class() == COMMAND_CLASS && self.opcode() == OPCODE_ACK
    }

    pub fn acked_opcode(&self) -> Option<u8> {
        if self.is_ack() {
            Some(self.data[3])
        } else {
            None
        }
    }

    /// Whether this looks like the reply to `command` (same class and opcode).
    pub fn echoes(&self, command: &[u8]) -> bool {
        command.len() >= 2 && self.class() == command[0] && self.opcode() == command[1]
    }
}

impl From<Frame> for Response {
    fn from(frame: Frame) -> Self {
        Self { data: frame.0 }
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Response({:02x?})", &self.data[..12])
    }
}
