// SPDX-License-Identifier: GPL-3.0-only
//! In-memory monitor used by the session tests
//!
//! Emulates the OSD registers behind the control transfers and records
//! everything the session does, so tests can assert on the exact bytes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::SessionConfig;
use crate::devices::DeviceSpec;
use crate::error::{ControlError, Result};
use crate::properties::Property;

use super::osd::{GET_INDEX, GET_REQUEST, REPLY_LEN, SET_REQUEST, VALUE_OFFSET};
use super::{Connector, Transport};

#[derive(Debug, Default)]
pub struct MockState {
    pub present: bool,
    pub deny_access: bool,
    pub fail_writes: bool,
    pub fail_reads: bool,
    pub short_write: bool,
    /// Writing this code to the KVM message flips the status
    pub firmware_toggle: Option<u8>,
    pub connects: usize,
    pub releases: usize,
    pub reads: usize,
    pub writes: Vec<Vec<u8>>,
    pub registers: HashMap<(u8, u8), u8>,
    pending: Option<(u8, u8)>,
}

impl MockState {
    pub fn register(&self, property: &Property) -> u8 {
        self.registers
            .get(&(property.message_a, property.message_b))
            .copied()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct MockConnector {
    pub state: Rc<RefCell<MockState>>,
}

impl MockConnector {
    /// A connector whose monitor is plugged in
    pub fn present() -> Self {
        Self {
            state: Rc::new(RefCell::new(MockState {
                present: true,
                ..Default::default()
            })),
        }
    }

    pub fn absent() -> Self {
        Self {
            state: Rc::new(RefCell::new(MockState::default())),
        }
    }
}

#[derive(Debug)]
pub struct MockTransport {
    state: Rc<RefCell<MockState>>,
}

impl Connector for MockConnector {
    type Transport = MockTransport;

    fn connect(&mut self, spec: &DeviceSpec, _config: &SessionConfig) -> Result<MockTransport> {
        let mut state = self.state.borrow_mut();
        if !state.present {
            return Err(ControlError::DeviceNotFound {
                vendor_id: spec.vendor_id,
                product_id: spec.product_id,
            });
        }
        if state.deny_access {
            return Err(ControlError::PermissionDenied {
                vendor_id: spec.vendor_id,
                product_id: spec.product_id,
            });
        }
        state.connects += 1;
        Ok(MockTransport {
            state: self.state.clone(),
        })
    }
}

impl Transport for MockTransport {
    fn write_control(
        &mut self,
        request: u8,
        _value: u16,
        _index: u16,
        data: &[u8],
    ) -> rusb::Result<usize> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            return Err(rusb::Error::Pipe);
        }
        assert_eq!(request, SET_REQUEST);
        state.writes.push(data.to_vec());

        let key = (data[4], data[5]);
        match data[3] {
            0x01 => state.pending = Some(key),
            0x03 => {
                let kvm = (Property::KVM_STATUS.message_a, Property::KVM_STATUS.message_b);
                if key == kvm && state.firmware_toggle == Some(data[6]) {
                    let current = state.registers.get(&kvm).copied().unwrap_or(0);
                    state.registers.insert(kvm, 1 - current);
                } else {
                    state.registers.insert(key, data[6]);
                }
            }
            op => panic!("unexpected opcode {op:#04x}"),
        }

        if state.short_write {
            Ok(data.len() - 1)
        } else {
            Ok(data.len())
        }
    }

    fn read_control(
        &mut self,
        request: u8,
        _value: u16,
        index: u16,
        buf: &mut [u8],
    ) -> rusb::Result<usize> {
        let mut state = self.state.borrow_mut();
        if state.fail_reads {
            return Err(rusb::Error::Timeout);
        }
        assert_eq!(request, GET_REQUEST);
        assert_eq!(index, GET_INDEX);
        state.reads += 1;

        let mut reply = [0u8; REPLY_LEN];
        if let Some(key) = state.pending.take() {
            reply[VALUE_OFFSET] = state.registers.get(&key).copied().unwrap_or(0);
        }
        let n = buf.len().min(REPLY_LEN);
        buf[..n].copy_from_slice(&reply[..n]);
        Ok(n)
    }

    fn release(self) {
        self.state.borrow_mut().releases += 1;
    }
}
