// SPDX-License-Identifier: GPL-3.0-only
//! OSD property table
//!
//! Every adjustable setting is addressed by a two byte message code and
//! accepts either an inclusive range or a fixed set of values. The table is
//! built once on first use and never mutated.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

use crate::error::{ControlError, Result};

/// Values a property accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Inclusive range
    Range { min: u8, max: u8 },
    /// Explicit allow-list
    OneOf(&'static [u8]),
}

impl Constraint {
    pub fn contains(&self, value: u8) -> bool {
        match self {
            Constraint::Range { min, max } => (*min..=*max).contains(&value),
            Constraint::OneOf(allowed) => allowed.contains(&value),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Range { min, max } => write!(f, "{}..={}", min, max),
            Constraint::OneOf(allowed) => write!(f, "{:?}", allowed),
        }
    }
}

/// A single OSD setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Property {
    pub name: &'static str,
    pub message_a: u8,
    pub message_b: u8,
    pub constraint: Constraint,
}

const OSD_TIMEOUTS: &[u8] = &[5, 10, 15, 20, 25, 30];
const INPUT_SOURCES: &[u8] = &[
    InputSource::DisplayPort as u8,
    InputSource::Hdmi1 as u8,
    InputSource::Hdmi2 as u8,
];

impl Property {
    pub const BRIGHTNESS: Property = Property::range("brightness", 0x10, 0x00, 0, 100);
    pub const CONTRAST: Property = Property::range("contrast", 0x12, 0x00, 0, 100);
    pub const SHARPNESS: Property = Property::range("sharpness", 0x87, 0x00, 0, 100);
    pub const VOLUME: Property = Property::range("volume", 0x62, 0x00, 0, 100);
    pub const INPUT_SOURCE: Property = Property {
        name: "input_source",
        message_a: 0x60,
        message_b: 0x00,
        constraint: Constraint::OneOf(INPUT_SOURCES),
    };
    pub const BLUE_LIGHT_REDUCTION: Property =
        Property::range("blue_light_reduction", 0xe0, 0x0b, 0, 10);
    pub const KVM_STATUS: Property = Property::range("kvm_status", 0xe0, 0x69, 0, 1);
    pub const BLACK_EQUALIZER: Property = Property::range("black_equalizer", 0xe0, 0x02, 0, 10);
    pub const OSD_TIMEOUT: Property = Property {
        name: "osd_timeout",
        message_a: 0xe0,
        message_b: 0x30,
        constraint: Constraint::OneOf(OSD_TIMEOUTS),
    };

    /// Every property the monitor exposes
    pub const ALL: [Property; 9] = [
        Property::BRIGHTNESS,
        Property::CONTRAST,
        Property::SHARPNESS,
        Property::VOLUME,
        Property::INPUT_SOURCE,
        Property::BLUE_LIGHT_REDUCTION,
        Property::KVM_STATUS,
        Property::BLACK_EQUALIZER,
        Property::OSD_TIMEOUT,
    ];

    const fn range(name: &'static str, message_a: u8, message_b: u8, min: u8, max: u8) -> Self {
        Self {
            name,
            message_a,
            message_b,
            constraint: Constraint::Range { min, max },
        }
    }

    /// Check `value` against this property's constraint
    pub fn validate(&self, value: u8) -> Result<u8> {
        if self.constraint.contains(value) {
            Ok(value)
        } else {
            Err(ControlError::InvalidValue {
                property: self.name,
                value,
                allowed: self.constraint.to_string(),
            })
        }
    }

    /// Bounds of a range property, `None` for allow-lists
    pub fn bounds(&self) -> Option<(u8, u8)> {
        match self.constraint {
            Constraint::Range { min, max } => Some((min, max)),
            Constraint::OneOf(_) => None,
        }
    }
}

static PROPERTIES: Lazy<HashMap<&'static str, Property>> =
    Lazy::new(|| Property::ALL.iter().map(|p| (p.name, *p)).collect());

/// The property table, keyed by name
pub fn table() -> &'static HashMap<&'static str, Property> {
    &PROPERTIES
}

/// Find a property by name
pub fn lookup(name: &str) -> Result<Property> {
    PROPERTIES
        .get(name)
        .copied()
        .ok_or_else(|| ControlError::UnknownProperty(name.to_string()))
}

/// Video input, using the MCCS input-select codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InputSource {
    DisplayPort = 0x0f,
    Hdmi1 = 0x11,
    Hdmi2 = 0x12,
}

impl TryFrom<u8> for InputSource {
    type Error = ControlError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x0f => Ok(InputSource::DisplayPort),
            0x11 => Ok(InputSource::Hdmi1),
            0x12 => Ok(InputSource::Hdmi2),
            _ => Err(ControlError::InvalidValue {
                property: Property::INPUT_SOURCE.name,
                value,
                allowed: Property::INPUT_SOURCE.constraint.to_string(),
            }),
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::DisplayPort => write!(f, "DisplayPort"),
            InputSource::Hdmi1 => write!(f, "HDMI 1"),
            InputSource::Hdmi2 => write!(f, "HDMI 2"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_contains_every_property() {
        assert_eq!(table().len(), Property::ALL.len());
        for property in Property::ALL {
            assert_eq!(lookup(property.name).unwrap(), property);
        }
    }

    #[test]
    fn test_unknown_property() {
        assert!(matches!(
            lookup("gamma"),
            Err(ControlError::UnknownProperty(name)) if name == "gamma"
        ));
    }

    #[test]
    fn test_range_validation() {
        let p = Property::BLUE_LIGHT_REDUCTION;
        assert_eq!(p.validate(0).unwrap(), 0);
        assert_eq!(p.validate(10).unwrap(), 10);
        assert!(matches!(
            p.validate(11),
            Err(ControlError::InvalidValue { property: "blue_light_reduction", value: 11, .. })
        ));
    }

    #[test]
    fn test_allow_list_validation() {
        let p = Property::OSD_TIMEOUT;
        for v in [5, 10, 15, 20, 25, 30] {
            assert!(p.validate(v).is_ok());
        }
        assert!(p.validate(0).is_err());
        assert!(p.validate(12).is_err());
        assert_eq!(p.bounds(), None);
    }

    #[test]
    fn test_kvm_status_codes() {
        let p = Property::KVM_STATUS;
        assert_eq!((p.message_a, p.message_b), (0xe0, 0x69));
        assert_eq!(p.bounds(), Some((0, 1)));
    }

    #[test]
    fn test_input_source_conversion() {
        assert_eq!(InputSource::try_from(0x11).unwrap(), InputSource::Hdmi1);
        assert!(InputSource::try_from(0x01).is_err());
        for source in [InputSource::DisplayPort, InputSource::Hdmi1, InputSource::Hdmi2] {
            assert!(Property::INPUT_SOURCE.validate(source as u8).is_ok());
        }
    }
}
