// SPDX-License-Identifier: GPL-3.0-only
//! Monitor session
//!
//! A [`MonitorSession`] owns at most one open transport. It goes from closed
//! to open and back, and every setter is a single blocking write against the
//! open handle (getters add one read). The handle is released on
//! [`MonitorSession::close`], at the end of [`MonitorSession::scoped`], or
//! when the session is dropped.
//!
//! # Usage
//!
//! ```no_run
//! use m27q_control::MonitorSession;
//!
//! # fn example() -> m27q_control::Result<()> {
//! let mut monitor = MonitorSession::new();
//! monitor.scoped(|m| {
//!     m.set_brightness(50)?;
//!     m.toggle_kvm()?;
//!     Ok(())
//! })?;
//! # Ok(())
//! # }
//! ```

use std::thread;

use crate::config::{KvmToggleMode, SessionConfig};
use crate::devices::{gigabyte, DeviceSpec};
use crate::error::{ControlError, Result};
use crate::properties::{self, InputSource, Property};
use crate::protocols::osd::{self, GET_INDEX, GET_REQUEST, REPLY_LEN, SET_REQUEST};
use crate::protocols::usb::UsbConnector;
use crate::protocols::{Connector, Transport};

/// Control session for a single monitor
pub struct MonitorSession<C: Connector = UsbConnector> {
    connector: C,
    spec: DeviceSpec,
    config: SessionConfig,
    transport: Option<C::Transport>,
}

impl MonitorSession<UsbConnector> {
    /// Session for the Gigabyte M27Q with default settings
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self::with_connector(UsbConnector, gigabyte::m27q::SPEC, config)
    }
}

impl Default for MonitorSession<UsbConnector> {
    fn default() -> Self {
        Self::new()
    }
}

/// Closes the session when dropped, including during unwinding
struct CloseGuard<'a, C: Connector>(&'a mut MonitorSession<C>);

impl<C: Connector> Drop for CloseGuard<'_, C> {
    fn drop(&mut self) {
        self.0.close();
    }
}

impl<C: Connector> MonitorSession<C> {
    /// Create a closed session that will open `spec` through `connector`
    pub fn with_connector(connector: C, spec: DeviceSpec, config: SessionConfig) -> Self {
        Self {
            connector,
            spec,
            config,
            transport: None,
        }
    }

    pub fn spec(&self) -> &DeviceSpec {
        &self.spec
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// Find the device and take the handle
    ///
    /// Fails with `AlreadyOpen` if a handle is already held. On failure no
    /// handle is kept.
    pub fn open(&mut self) -> Result<()> {
        if self.transport.is_some() {
            return Err(ControlError::AlreadyOpen);
        }

        let transport = self.connector.connect(&self.spec, &self.config)?;
        self.transport = Some(transport);

        debug!(
            "Opened {} ({:04x}:{:04x})",
            self.spec.name, self.spec.vendor_id, self.spec.product_id
        );
        Ok(())
    }

    /// Release the handle. Safe to call any number of times.
    pub fn close(&mut self) {
        if let Some(transport) = self.transport.take() {
            transport.release();
            debug!("Closed {}", self.spec.name);
        }
    }

    /// Open, run `f`, then close on every exit path
    ///
    /// The session is closed before `f`'s error is returned, and also when
    /// `f` panics.
    pub fn scoped<R, F>(&mut self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Self) -> Result<R>,
    {
        self.open()?;
        let guard = CloseGuard(self);
        f(&mut *guard.0)
    }

    fn transport(&mut self) -> Result<&mut C::Transport> {
        self.transport.as_mut().ok_or(ControlError::NotOpen)
    }

    fn settle(&self) {
        let delay = self.config.settle_delay();
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    fn write_report(&mut self, report: &[u8]) -> Result<()> {
        let written = self
            .transport()?
            .write_control(SET_REQUEST, 0, 0, report)
            .map_err(ControlError::DeviceWrite)?;
        trace!("Wrote report {:02x?}", report);

        if written != report.len() {
            return Err(ControlError::ShortWrite {
                expected: report.len(),
                actual: written,
            });
        }

        self.settle();
        Ok(())
    }

    /// Validate `value` and write it to `property`
    ///
    /// Nothing is written when the value is rejected.
    pub fn send_command(&mut self, property: &Property, value: u8) -> Result<()> {
        let value = property.validate(value)?;
        self.write_report(&osd::set_report(property, value))?;

        debug!("Set {} {} to {}", self.spec.name, property.name, value);
        Ok(())
    }

    /// Ask the monitor for the current value of `property`
    pub fn query(&mut self, property: &Property) -> Result<u8> {
        self.write_report(&osd::get_report(property))?;

        let mut reply = [0u8; REPLY_LEN];
        let read = self
            .transport()?
            .read_control(GET_REQUEST, 0, GET_INDEX, &mut reply)
            .map_err(ControlError::DeviceRead)?;
        trace!("Read reply {:02x?}", &reply[..read]);
        self.settle();

        let value = osd::decode_reply(&reply[..read])?;
        debug!("{} {}: {}", self.spec.name, property.name, value);
        Ok(value)
    }

    /// Set a property looked up by name
    pub fn set_by_name(&mut self, name: &str, value: u8) -> Result<()> {
        let property = properties::lookup(name)?;
        self.send_command(&property, value)
    }

    /// Query a property looked up by name
    pub fn get_by_name(&mut self, name: &str) -> Result<u8> {
        let property = properties::lookup(name)?;
        self.query(&property)
    }

    /// Move `property` towards `target` in increments of `step`
    ///
    /// Every intermediate value is written, then `target` itself if the
    /// last step did not land on it. Allow-list properties have no
    /// in-between values and are set directly.
    pub fn transition(&mut self, property: &Property, target: u8, step: u8) -> Result<()> {
        let target = property.validate(target)?;

        let Some((min, max)) = property.bounds() else {
            return self.send_command(property, target);
        };
        if step == 0 {
            return Err(ControlError::InvalidValue {
                property: property.name,
                value: step,
                allowed: "step of at least 1".to_string(),
            });
        }

        // Clamp so every intermediate write passes validation
        let mut current = self.query(property)?.clamp(min, max);

        while current.abs_diff(target) >= step {
            current = if current < target {
                current + step
            } else {
                current - step
            };
            self.send_command(property, current)?;
        }

        if current != target {
            self.send_command(property, target)?;
        }
        Ok(())
    }

    pub fn set_brightness(&mut self, brightness: u8) -> Result<()> {
        self.send_command(&Property::BRIGHTNESS, brightness)
    }

    pub fn brightness(&mut self) -> Result<u8> {
        self.query(&Property::BRIGHTNESS)
    }

    pub fn transition_brightness(&mut self, target: u8, step: u8) -> Result<()> {
        self.transition(&Property::BRIGHTNESS, target, step)
    }

    pub fn set_contrast(&mut self, contrast: u8) -> Result<()> {
        self.send_command(&Property::CONTRAST, contrast)
    }

    pub fn contrast(&mut self) -> Result<u8> {
        self.query(&Property::CONTRAST)
    }

    pub fn set_sharpness(&mut self, sharpness: u8) -> Result<()> {
        self.send_command(&Property::SHARPNESS, sharpness)
    }

    pub fn sharpness(&mut self) -> Result<u8> {
        self.query(&Property::SHARPNESS)
    }

    pub fn set_volume(&mut self, volume: u8) -> Result<()> {
        self.send_command(&Property::VOLUME, volume)
    }

    pub fn volume(&mut self) -> Result<u8> {
        self.query(&Property::VOLUME)
    }

    pub fn set_blue_light_reduction(&mut self, level: u8) -> Result<()> {
        self.send_command(&Property::BLUE_LIGHT_REDUCTION, level)
    }

    pub fn set_black_equalizer(&mut self, level: u8) -> Result<()> {
        self.send_command(&Property::BLACK_EQUALIZER, level)
    }

    /// OSD timeout in seconds, one of 5, 10, 15, 20, 25 or 30
    pub fn set_osd_timeout(&mut self, seconds: u8) -> Result<()> {
        self.send_command(&Property::OSD_TIMEOUT, seconds)
    }

    pub fn set_input_source(&mut self, source: InputSource) -> Result<()> {
        self.send_command(&Property::INPUT_SOURCE, source as u8)
    }

    pub fn input_source(&mut self) -> Result<InputSource> {
        InputSource::try_from(self.query(&Property::INPUT_SOURCE)?)
    }

    /// KVM upstream: 0 or 1
    pub fn kvm_status(&mut self) -> Result<u8> {
        self.query(&Property::KVM_STATUS)
    }

    pub fn set_kvm_status(&mut self, status: u8) -> Result<()> {
        self.send_command(&Property::KVM_STATUS, status)
    }

    /// Switch the KVM to the other upstream
    ///
    /// With [`KvmToggleMode::ReadBack`] the current status is read and its
    /// complement written; with [`KvmToggleMode::Fixed`] the configured code
    /// is written as is. Returns the value written.
    pub fn toggle_kvm(&mut self) -> Result<u8> {
        match self.config.kvm_toggle {
            KvmToggleMode::ReadBack => {
                let next = if self.kvm_status()? == 0 { 1 } else { 0 };
                self.set_kvm_status(next)?;
                Ok(next)
            }
            KvmToggleMode::Fixed(code) => {
                // Firmware opcode rather than a status, so no range check
                self.write_report(&osd::set_report(&Property::KVM_STATUS, code))?;
                debug!("Sent KVM toggle code {} to {}", code, self.spec.name);
                Ok(code)
            }
        }
    }
}

impl<C: Connector> Drop for MonitorSession<C> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<C: Connector> std::fmt::Debug for MonitorSession<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MonitorSession(device: {}, open: {})", self.spec.name, self.is_open())
    }
}
