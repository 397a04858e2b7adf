pub use rusb;
pub mod client;
pub mod commands;
pub mod device;
pub mod drain;
pub mod error;
pub mod features;
pub mod frame;
pub mod session;
pub mod transport;
pub mod value;

pub const VID_CREATIVE: u16 = 0x041e;
pub const PID_BLASTERX_G6: u16 = 0x3256;

/// The HID interface carrying the control protocol.
pub const INTERFACE: u8 = 4;
pub const ENDPOINT_IN: u8 = 0x85;
