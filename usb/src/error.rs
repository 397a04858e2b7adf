use blasterx_types::{DspFeature, GlobalProfileFlag};

#[derive(thiserror::Error, Debug)]
pub enum ConnectError {
    #[error("No Sound BlasterX G6 was found")]
    DeviceNotFound,

    #[error("USB error: {0}")]
    UsbError(#[from] rusb::Error),

    #[error("Unable to Claim Interface {0}")]
    DeviceNotClaimed(u8),

    #[error("Endpoint {0:#04x} is not present on the claimed interface")]
    EndpointNotFound(u8),
}

#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("Command is {length} bytes, frames hold at most {max}")]
    FrameTooLong { length: usize, max: usize },

    #[error("Feature {id:#04x} is not known in family {family:#04x}")]
    FeatureNotFound { family: u8, id: u8 },

    #[error("Cannot read 4 bytes at offset {offset} of a {length} byte response")]
    PayloadOutOfRange { offset: usize, length: usize },

    #[error("{0} can be read, but not written")]
    ReadOnlyFlag(GlobalProfileFlag),

    #[error("{0} is a level, it can't be toggled")]
    NotAToggle(DspFeature),

    #[error("Transport fault: {0}")]
    TransportFault(#[from] rusb::Error),
}
