use crate::error::CommandError;
use byteorder::{ByteOrder, LittleEndian};

pub fn encode_float(value: f32) -> [u8; 4] {
    let mut out = [0; 4];
    LittleEndian::write_f32(&mut out, value);
    out
}

/// Reads a little-endian f32 at `offset`. The offset differs between command
/// families, so it always comes from the command that produced `bytes`.
pub fn decode_float(bytes: &[u8], offset: usize) -> Result<f32, CommandError> {
    let end = offset.checked_add(4).filter(|end| *end <= bytes.len());
    match end {
        Some(end) => Ok(LittleEndian::read_f32(&bytes[offset..end])),
        None => Err(CommandError::PayloadOutOfRange {
            offset,
            length: bytes.len(),
        }),
    }
}

pub fn encode_toggle(enabled: bool) -> f32 {
    if enabled {
        1.0
    } else {
        0.0
    }
}

pub fn decode_toggle(value: f32) -> bool {
    value != 0.0
}
