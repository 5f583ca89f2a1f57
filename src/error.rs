// SPDX-License-Identifier: GPL-3.0-only
//! Error types for monitor control
//!
//! Every failure a session can hit is surfaced to the caller as a
//! [`ControlError`]. Nothing is retried internally.

use thiserror::Error;

/// Main control error type
#[derive(Error, Debug)]
pub enum ControlError {
    /// No USB device with the expected identifiers is attached
    #[error("Device VID_{vendor_id:04x}&PID_{product_id:04x} not found")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    /// The device exists but the OS refused to open it
    #[error(
        "Permission denied opening VID_{vendor_id:04x}&PID_{product_id:04x}. \
         On Linux, ensure a udev rule grants access to the device"
    )]
    PermissionDenied { vendor_id: u16, product_id: u16 },

    /// Caller-supplied value is outside what the property accepts
    #[error("Invalid value {value} for {property}: allowed {allowed}")]
    InvalidValue {
        property: &'static str,
        value: u8,
        allowed: String,
    },

    /// Property name not present in the command table
    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    /// Control OUT transfer failed
    #[error("USB write failed: {0}")]
    DeviceWrite(#[source] rusb::Error),

    /// Control OUT transfer moved fewer bytes than the report holds
    #[error("Transferred message length mismatch: expected {expected}, wrote {actual}")]
    ShortWrite { expected: usize, actual: usize },

    /// Control IN transfer failed
    #[error("USB read failed: {0}")]
    DeviceRead(#[source] rusb::Error),

    /// Reply too short to carry the value byte
    #[error("Reply too short: expected at least {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    /// Any other libusb failure while opening or configuring the device
    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),

    /// Operation issued on a session that holds no handle
    #[error("Session is not open")]
    NotOpen,

    /// `open()` issued on a session that already holds a handle
    #[error("Session is already open")]
    AlreadyOpen,
}

/// Result type alias for ControlError
pub type Result<T> = std::result::Result<T, ControlError>;
