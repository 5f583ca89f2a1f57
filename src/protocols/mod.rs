// SPDX-License-Identifier: GPL-3.0-only
//! Monitor control transport
//!
//! The session talks to the monitor through two seams: a [`Connector`] that
//! opens the device, and the [`Transport`] it hands back for control
//! transfers. The USB implementation lives in [`usb`]; tests swap in a mock.

pub mod osd;
pub mod usb;

#[cfg(test)]
pub(crate) mod mock;

use crate::config::SessionConfig;
use crate::devices::DeviceSpec;
use crate::error::Result;

/// An open control channel to the monitor
pub trait Transport: std::fmt::Debug {
    /// Vendor OUT control transfer, returns the number of bytes written
    fn write_control(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        data: &[u8],
    ) -> rusb::Result<usize>;

    /// Vendor IN control transfer, returns the number of bytes read
    fn read_control(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
    ) -> rusb::Result<usize>;

    /// Give the device back to the OS. Must not fail.
    fn release(self);
}

/// Opens a [`Transport`] for a device
pub trait Connector {
    type Transport: Transport;

    fn connect(&mut self, spec: &DeviceSpec, config: &SessionConfig) -> Result<Self::Transport>;
}
