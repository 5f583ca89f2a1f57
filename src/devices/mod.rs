// SPDX-License-Identifier: GPL-3.0-only
//! Device-specific configurations organized by manufacturer

pub mod gigabyte;

/// USB identity and interface layout of a controllable monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSpec {
    /// USB Vendor ID of the control interface (not necessarily the panel maker)
    pub vendor_id: u16,

    /// USB Product ID of the control interface
    pub product_id: u16,

    /// Human-readable device name
    pub name: &'static str,

    /// Interface the kernel driver may be bound to
    pub interface: u8,

    /// USB configuration selected after opening
    pub configuration: u8,
}

impl DeviceSpec {
    /// udev rule granting every user read/write access to the device
    pub fn udev_rule(&self) -> String {
        format!(
            "SUBSYSTEM==\"usb\", ATTRS{{idVendor}}==\"{:04x}\", ATTRS{{idProduct}}==\"{:04x}\", MODE=\"0666\"",
            self.vendor_id, self.product_id
        )
    }
}
