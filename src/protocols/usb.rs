// SPDX-License-Identifier: GPL-3.0-only
//! libusb transport
//!
//! The monitor's control channel is a USB billboard device, so reports go
//! out as vendor control transfers rather than HID feature reports.

use std::time::Duration;

use rusb::{Device, DeviceHandle, Direction, GlobalContext, Recipient, RequestType};

use crate::config::SessionConfig;
use crate::devices::DeviceSpec;
use crate::error::{ControlError, Result};

use super::{Connector, Transport};

/// Opens the monitor through the global libusb context
#[derive(Debug, Default)]
pub struct UsbConnector;

/// Open libusb handle to the monitor
#[derive(Debug)]
pub struct UsbTransport {
    handle: DeviceHandle<GlobalContext>,
    interface: u8,
    /// Set when a kernel driver was detached on open
    reattach_driver: bool,
    timeout: Duration,
}

impl UsbConnector {
    fn find_device(spec: &DeviceSpec) -> Result<Device<GlobalContext>> {
        for device in rusb::devices()?.iter() {
            let desc = match device.device_descriptor() {
                Ok(desc) => desc,
                Err(e) => {
                    trace!("Skipping device without descriptor: {}", e);
                    continue;
                }
            };

            if desc.vendor_id() == spec.vendor_id && desc.product_id() == spec.product_id {
                debug!(
                    "Found {} on bus {} address {}",
                    spec.name,
                    device.bus_number(),
                    device.address()
                );
                return Ok(device);
            }
        }

        Err(ControlError::DeviceNotFound {
            vendor_id: spec.vendor_id,
            product_id: spec.product_id,
        })
    }
}

/// Map a libusb open failure onto the session's error kinds
fn open_error(e: rusb::Error, spec: &DeviceSpec) -> ControlError {
    match e {
        rusb::Error::Access => ControlError::PermissionDenied {
            vendor_id: spec.vendor_id,
            product_id: spec.product_id,
        },
        // Unplugged between enumeration and open
        rusb::Error::NoDevice | rusb::Error::NotFound => ControlError::DeviceNotFound {
            vendor_id: spec.vendor_id,
            product_id: spec.product_id,
        },
        other => ControlError::Usb(other),
    }
}

impl Connector for UsbConnector {
    type Transport = UsbTransport;

    fn connect(&mut self, spec: &DeviceSpec, config: &SessionConfig) -> Result<UsbTransport> {
        let device = Self::find_device(spec)?;

        let handle = device.open().map_err(|e| open_error(e, spec))?;

        let mut reattach_driver = false;
        if config.detach_kernel_driver
            && rusb::supports_detach_kernel_driver()
            && handle.kernel_driver_active(spec.interface)?
        {
            handle.detach_kernel_driver(spec.interface)?;
            reattach_driver = true;
            debug!("Detached kernel driver from interface {}", spec.interface);
        }

        if let Err(e) = handle.set_active_configuration(spec.configuration) {
            if reattach_driver {
                let _ = handle.attach_kernel_driver(spec.interface);
            }
            return Err(e.into());
        }

        Ok(UsbTransport {
            handle,
            interface: spec.interface,
            reattach_driver,
            timeout: config.timeout(),
        })
    }
}

impl Transport for UsbTransport {
    fn write_control(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        data: &[u8],
    ) -> rusb::Result<usize> {
        let request_type = rusb::request_type(Direction::Out, RequestType::Vendor, Recipient::Device);
        self.handle
            .write_control(request_type, request, value, index, data, self.timeout)
    }

    fn read_control(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
    ) -> rusb::Result<usize> {
        let request_type = rusb::request_type(Direction::In, RequestType::Vendor, Recipient::Device);
        self.handle
            .read_control(request_type, request, value, index, buf, self.timeout)
    }

    fn release(self) {
        if self.reattach_driver {
            match self.handle.attach_kernel_driver(self.interface) {
                Ok(()) => debug!("Re-attached kernel driver to interface {}", self.interface),
                Err(e) => debug!("Failed to re-attach kernel driver: {}", e),
            }
        }
        // Dropping the handle closes it
    }
}
