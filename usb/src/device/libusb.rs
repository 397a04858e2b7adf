use crate::error::ConnectError;
use crate::session::SessionConfig;
use crate::transport::Transport;
use crate::{PID_BLASTERX_G6, VID_CREATIVE};
use log::{debug, info, warn};
use rusb::{Device, DeviceHandle, GlobalContext, TransferType, UsbContext};
use std::thread::sleep;
use std::time::Duration;

pub struct LibUsbTransport<T: UsbContext> {
    handle: DeviceHandle<T>,
    interface: u8,
    in_transfer: TransferType,
    timeout: Duration,
    reattach_kernel_driver: bool,
}

/// Opens the G6, resets it, and claims the control interface.
///
/// A freshly reset device spits out a burst of state we don't care about, so
/// the caller should drain once before relying on replies.
pub fn open(config: &SessionConfig) -> Result<LibUsbTransport<GlobalContext>, ConnectError> {
    let mut handle = rusb::open_device_with_vid_pid(VID_CREATIVE, PID_BLASTERX_G6)
        .ok_or(ConnectError::DeviceNotFound)?;

    info!("Resetting device at {:?}", handle.device());
    match handle.reset() {
        // The device re-enumerates during a reset, libusb may lose it mid-call.
        Ok(()) | Err(rusb::Error::NotFound) => {}
        Err(error) => return Err(ConnectError::UsbError(error)),
    }
    drop(handle);

    // Give the kernel time to re-enumerate before grabbing it again..
    sleep(Duration::from_secs(2));

    let handle = rusb::open_device_with_vid_pid(VID_CREATIVE, PID_BLASTERX_G6)
        .ok_or(ConnectError::DeviceNotFound)?;
    info!("Device reset complete, connected to {:?}", handle.device());

    LibUsbTransport::claim(handle, config)
}

impl<T: UsbContext> LibUsbTransport<T> {
    /// Takes an open handle, detaches any kernel driver and claims the interface.
    pub fn claim(
        mut handle: DeviceHandle<T>,
        config: &SessionConfig,
    ) -> Result<Self, ConnectError> {
        let interface = config.interface;

        let mut reattach_kernel_driver = false;
        if handle.kernel_driver_active(interface).unwrap_or(false) {
            debug!("Detaching kernel driver from interface {}", interface);
            handle.detach_kernel_driver(interface)?;
            reattach_kernel_driver = true;
        }

        if handle.claim_interface(interface).is_err() {
            give_back(&mut handle, interface, false, reattach_kernel_driver);
            return Err(ConnectError::DeviceNotClaimed(interface));
        }

        let device = handle.device();
        let in_transfer = match endpoint_transfer_type(&device, interface, config.endpoint_in) {
            Some(transfer_type) => transfer_type,
            None => {
                give_back(&mut handle, interface, true, reattach_kernel_driver);
                return Err(ConnectError::EndpointNotFound(config.endpoint_in));
            }
        };
        debug!(
            "Endpoint {:#04x} uses {:?} transfers",
            config.endpoint_in, in_transfer
        );

        Ok(Self {
            handle,
            interface,
            in_transfer,
            timeout: Duration::from_secs(1),
            reattach_kernel_driver,
        })
    }
}

fn endpoint_transfer_type<T: UsbContext>(
    device: &Device<T>,
    interface: u8,
    endpoint: u8,
) -> Option<TransferType> {
    let config = device.active_config_descriptor().ok()?;
    for candidate in config.interfaces() {
        if candidate.number() != interface {
            continue;
        }
        for descriptor in candidate.descriptors() {
            for endpoint_descriptor in descriptor.endpoint_descriptors() {
                if endpoint_descriptor.address() == endpoint {
                    return Some(endpoint_descriptor.transfer_type());
                }
            }
        }
    }
    None
}

impl<T: UsbContext> Transport for LibUsbTransport<T> {
    fn write_control(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        data: &[u8],
    ) -> Result<usize, rusb::Error> {
        self.handle
            .write_control(request_type, request, value, index, data, self.timeout)
    }

    fn read_in(
        &mut self,
        endpoint: u8,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, rusb::Error> {
        match self.in_transfer {
            TransferType::Bulk => self.handle.read_bulk(endpoint, buf, timeout),
            _ => self.handle.read_interrupt(endpoint, buf, timeout),
        }
    }
}

impl<T: UsbContext> Drop for LibUsbTransport<T> {
    fn drop(&mut self) {
        give_back(
            &mut self.handle,
            self.interface,
            true,
            self.reattach_kernel_driver,
        );
    }
}

/// The parts of a handle needed to hand an interface back to the system.
trait InterfaceOwner {
    fn release(&mut self, interface: u8) -> Result<(), rusb::Error>;
    fn reattach(&mut self, interface: u8) -> Result<(), rusb::Error>;
}

impl<T: UsbContext> InterfaceOwner for DeviceHandle<T> {
    fn release(&mut self, interface: u8) -> Result<(), rusb::Error> {
        self.release_interface(interface)
    }

    fn reattach(&mut self, interface: u8) -> Result<(), rusb::Error> {
        self.attach_kernel_driver(interface)
    }
}

/// Undoes `claim`, whether it got all the way through or not.
fn give_back<H: InterfaceOwner>(handle: &mut H, interface: u8, claimed: bool, reattach: bool) {
    if claimed {
        debug!("Releasing interface {}", interface);
        if let Err(error) = handle.release(interface) {
            warn!("Unable to release interface {}: {}", interface, error);
        }
    }
    if reattach {
        if let Err(error) = handle.reattach(interface) {
            warn!("Unable to reattach kernel driver: {}", error);
        }
    }
}
