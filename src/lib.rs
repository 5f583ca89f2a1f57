// SPDX-License-Identifier: GPL-3.0-only
//! OSD and KVM control for the Gigabyte M27Q
//!
//! The monitor exposes its on-screen-display settings through the VIA Labs
//! billboard device of its built-in USB hub. A [`MonitorSession`] opens that
//! device, writes one report per setting and releases the handle when done.
//!
//! On Linux a udev rule must grant the user access to the device; see
//! [`devices::DeviceSpec::udev_rule`].

#[macro_use]
extern crate tracing;

pub mod config;
pub mod devices;
pub mod error;
mod monitor;
#[cfg(all(target_os = "linux", feature = "permissions-check"))]
pub mod permissions;
pub mod properties;
pub mod protocols;

pub use config::{KvmToggleMode, SessionConfig};
pub use error::{ControlError, Result};
pub use monitor::MonitorSession;
pub use properties::{InputSource, Property};
