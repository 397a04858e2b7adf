// Acquiring and releasing the device. The protocol modules never touch this,
// they only see the `Transport` it produces.
mod libusb;

pub use self::libusb::{open, LibUsbTransport};
