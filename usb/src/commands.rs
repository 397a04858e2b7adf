use crate::frame::COMMAND_CLASS;
use crate::value::encode_float;
use blasterx_types::OutputMode;

/// Start of the answer in replies to the id, serial and version queries.
pub const INFO_OFFSET: usize = 3;
pub const OUTPUT_MODE_OFFSET: usize = 4;
pub const PROFILE_MASK_OFFSET: usize = 6;
pub const FEATURE_VALUE_OFFSET: usize = 7;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Command {
    Identify,
    Ping,
    GetSerial,
    GetHardwareId,
    GetDspVersion,
    GetFirmwareString,
    ReadGlobalProfile,
    SetGlobalProfile { group: u8, enabled: bool },
    ReadFeature { family: u8, id: u8 },
    WriteFeature { family: u8, id: u8, value: f32 },
    ReadOutput,
    SetOutput(OutputMode),
}

impl Command {
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = vec![COMMAND_CLASS, self.opcode()];
        match self {
            Command::Identify
            | Command::GetSerial
            | Command::GetHardwareId
            | Command::GetDspVersion => out.push(0x00),
            Command::Ping => out.extend([0x01, 0x01]),
            Command::GetFirmwareString => out.extend([0x01, 0x02]),
            Command::ReadGlobalProfile => out.extend([0x03, 0x08, 0xff, 0xff]),
            Command::SetGlobalProfile { group, enabled } => {
                out.extend([0x05, 0x07, *group, 0x00, u8::from(*enabled), 0x00])
            }
            Command::ReadFeature { family, id } => out.extend([0x03, 0x01, *family, *id]),
            Command::WriteFeature { family, id, value } => {
                out.extend([0x07, 0x01, *family, *id, 0x00]);
                out.extend(encode_float(*value));
            }
            Command::ReadOutput => out.extend([0x01, 0x01]),
            Command::SetOutput(mode) => out.extend([0x05, 0x00, mode.mode(), 0x00, 0x00, 0x00]),
        }
        out
    }

    pub fn opcode(&self) -> u8 {
        match self {
            Command::Identify => 0x05,
            Command::Ping => 0x06,
            Command::GetFirmwareString => 0x07,
            Command::GetSerial => 0x10,
            Command::ReadFeature { .. } => 0x11,
            Command::WriteFeature { .. } => 0x12,
            Command::GetHardwareId => 0x20,
            Command::ReadGlobalProfile | Command::SetGlobalProfile { .. } => 0x26,
            Command::ReadOutput | Command::SetOutput(_) => 0x2c,
            Command::GetDspVersion => 0x30,
        }
    }

    /// Where the answer sits in the reply. These are firmware facts and differ
    /// per command, so don't fold them together.
    pub fn value_offset(&self) -> Option<usize> {
        match self {
            Command::ReadFeature { .. } => Some(FEATURE_VALUE_OFFSET),
            Command::ReadGlobalProfile => Some(PROFILE_MASK_OFFSET),
            Command::ReadOutput => Some(OUTPUT_MODE_OFFSET),
            Command::Identify
            | Command::GetHardwareId
            | Command::GetSerial
            | Command::GetDspVersion
            | Command::GetFirmwareString => Some(INFO_OFFSET),
            _ => None,
        }
    }
}
