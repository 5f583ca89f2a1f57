use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How `toggle_kvm` switches the KVM upstream
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KvmToggleMode {
    /// Read the current status and write its complement
    #[default]
    ReadBack,
    /// Write a fixed code and let the firmware flip the upstream
    Fixed(u8),
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Pause after every USB transfer; the scaler drops reports sent back to back
    pub settle_delay_ms: u64,
    /// Timeout handed to each control transfer
    pub timeout_ms: u64,
    /// Detach a bound kernel driver on open and re-attach it on close
    pub detach_kernel_driver: bool,
    pub kvm_toggle: KvmToggleMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 50,
            timeout_ms: 1000,
            detach_kernel_driver: true,
            kvm_toggle: KvmToggleMode::ReadBack,
        }
    }
}

impl SessionConfig {
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_kvm_toggle(mut self, mode: KvmToggleMode) -> Self {
        self.kvm_toggle = mode;
        self
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
