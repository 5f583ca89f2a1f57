// SPDX-License-Identifier: GPL-3.0-only
//! Gigabyte M27Q specifications

use crate::devices::DeviceSpec;

/// VIA Labs, Inc. (the hub controller inside the monitor)
pub const VENDOR_ID: u16 = 0x2109;

/// USB Billboard Device exposed by the built-in KVM hub
pub const PRODUCT_ID: u16 = 0x8883;

/// Device specification for the Gigabyte M27Q
///
/// OSD settings are reached through vendor control transfers on the
/// billboard device, not through a HID interface. The built-in KVM
/// moves the hub's upstream port between the USB-C and USB-B hosts.
pub const SPEC: DeviceSpec = DeviceSpec {
    vendor_id: VENDOR_ID,
    product_id: PRODUCT_ID,
    name: "Gigabyte M27Q",
    interface: 0,
    configuration: 1,
};
