// SPDX-License-Identifier: GPL-3.0-only
//! OSD report framing
//!
//! Reports use DDC/CI style framing: destination and source address, a
//! length byte (`0x80 | n` where `n` counts the opcode and payload), the
//! opcode, then the property's message bytes and value.

use crate::error::{ControlError, Result};
use crate::properties::Property;

/// bRequest for writing a report
pub const SET_REQUEST: u8 = 178;

/// bRequest for fetching the reply to a get report
pub const GET_REQUEST: u8 = 162;

/// wIndex for fetching the reply
pub const GET_INDEX: u16 = 111;

/// Bytes requested when reading a reply
pub const REPLY_LEN: usize = 12;

/// Offset of the current value inside a reply
pub const VALUE_OFFSET: usize = 10;

pub const SET_REPORT_LEN: usize = 7;
pub const GET_REPORT_LEN: usize = 6;

const DESTINATION: u8 = 0x6e;
const SOURCE: u8 = 0x51;
const LENGTH_FLAG: u8 = 0x80;
const OP_GET: u8 = 0x01;
const OP_SET: u8 = 0x03;

/// Build the report that sets `property` to `value`
///
/// The value is not validated here; callers go through
/// [`Property::validate`] first.
pub fn set_report(property: &Property, value: u8) -> [u8; SET_REPORT_LEN] {
    [
        DESTINATION,
        SOURCE,
        LENGTH_FLAG | (SET_REPORT_LEN - 3) as u8,
        OP_SET,
        property.message_a,
        property.message_b,
        value,
    ]
}

/// Build the report that asks for the current value of `property`
pub fn get_report(property: &Property) -> [u8; GET_REPORT_LEN] {
    [
        DESTINATION,
        SOURCE,
        LENGTH_FLAG | (GET_REPORT_LEN - 3) as u8,
        OP_GET,
        property.message_a,
        property.message_b,
    ]
}

/// Pull the value byte out of a reply
pub fn decode_reply(reply: &[u8]) -> Result<u8> {
    reply
        .get(VALUE_OFFSET)
        .copied()
        .ok_or(ControlError::ShortRead {
            expected: VALUE_OFFSET + 1,
            actual: reply.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brightness_set_report() {
        assert_eq!(
            set_report(&Property::BRIGHTNESS, 50),
            [0x6e, 0x51, 0x84, 0x03, 0x10, 0x00, 50]
        );
    }

    #[test]
    fn test_vendor_property_set_report() {
        assert_eq!(
            set_report(&Property::KVM_STATUS, 1),
            [0x6e, 0x51, 0x84, 0x03, 0xe0, 0x69, 0x01]
        );
    }

    #[test]
    fn test_get_report() {
        assert_eq!(
            get_report(&Property::CONTRAST),
            [0x6e, 0x51, 0x83, 0x01, 0x12, 0x00]
        );
    }

    #[test]
    fn test_encoding_is_deterministic() {
        for property in Property::ALL {
            assert_eq!(set_report(&property, 5), set_report(&property, 5));
            assert_eq!(get_report(&property), get_report(&property));
        }
    }

    #[test]
    fn test_decode_reply() {
        let mut reply = [0u8; REPLY_LEN];
        reply[VALUE_OFFSET] = 42;
        assert_eq!(decode_reply(&reply).unwrap(), 42);

        assert!(matches!(
            decode_reply(&reply[..10]),
            Err(ControlError::ShortRead { expected: 11, actual: 10 })
        ));
    }
}
