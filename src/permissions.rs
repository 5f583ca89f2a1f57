//! Access diagnostics for the monitor's USB device node
//!
//! Opening the device as a regular user needs a udev rule. Nothing here
//! installs one; it only reports what is missing and renders the rule.

use std::fs;
use std::path::{Path, PathBuf};

use crate::devices::DeviceSpec;

const RULES_DIRS: &[&str] = &["/etc/udev/rules.d", "/usr/lib/udev/rules.d", "/lib/udev/rules.d"];

#[derive(Debug, Clone)]
pub struct PermissionCheckResult {
    pub requirements: Vec<PermissionRequirement>,
}

#[derive(Debug, Clone)]
pub struct PermissionRequirement {
    pub name: String,
    pub description: String,
    pub status: RequirementStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequirementStatus {
    Met,
    NotMet,
    NotApplicable,
}

impl PermissionCheckResult {
    pub fn has_issues(&self) -> bool {
        self.requirements.iter().any(|r| r.status == RequirementStatus::NotMet)
    }

    pub fn summary(&self) -> String {
        let not_met = self
            .requirements
            .iter()
            .filter(|r| r.status == RequirementStatus::NotMet)
            .count();

        if not_met == 0 {
            let met_count = self
                .requirements
                .iter()
                .filter(|r| r.status == RequirementStatus::Met)
                .count();
            format!("All {} requirements met", met_count)
        } else {
            format!("{} requirement(s) not met", not_met)
        }
    }
}

/// Whether a rules file has an active line matching the device
pub fn rule_matches(contents: &str, spec: &DeviceSpec) -> bool {
    let vendor = format!("\"{:04x}\"", spec.vendor_id);
    let product = format!("\"{:04x}\"", spec.product_id);

    contents.lines().any(|line| {
        let line = line.trim().to_ascii_lowercase();
        !line.starts_with('#')
            && line.contains("idvendor")
            && line.contains(&vendor)
            && line.contains("idproduct")
            && line.contains(&product)
    })
}

/// Rules files under the standard udev directories that match the device
fn find_matching_rules(spec: &DeviceSpec) -> Vec<PathBuf> {
    let mut found = Vec::new();

    for dir in RULES_DIRS {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Cannot read {}: {}", dir, e);
                continue;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "rules")
                && fs::read_to_string(&path).is_ok_and(|c| rule_matches(&c, spec))
            {
                debug!("Found udev rule for device in {}", path.display());
                found.push(path);
            }
        }
    }

    found
}

/// Device nodes of every attached USB device with the spec's identifiers
fn find_device_nodes(spec: &DeviceSpec) -> Vec<PathBuf> {
    let scan = || -> std::io::Result<Vec<PathBuf>> {
        let mut enumerator = udev::Enumerator::new()?;
        enumerator.match_subsystem("usb")?;
        enumerator.match_attribute("idVendor", format!("{:04x}", spec.vendor_id))?;
        enumerator.match_attribute("idProduct", format!("{:04x}", spec.product_id))?;

        Ok(enumerator
            .scan_devices()?
            .filter_map(|device| device.devnode().map(Path::to_path_buf))
            .collect())
    };

    scan().unwrap_or_else(|e| {
        debug!("udev enumeration failed: {}", e);
        Vec::new()
    })
}

/// Check if the current user can read and write `path`
fn can_access(path: &Path) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: c_path is a valid NUL-terminated string for the duration of the call
    unsafe { libc::access(c_path.as_ptr(), libc::R_OK | libc::W_OK) == 0 }
}

/// Check whether the current user can open the monitor's control device
pub fn check_usb_permissions(spec: &DeviceSpec) -> PermissionCheckResult {
    let mut requirements = Vec::new();

    // 1. Device attached
    let nodes = find_device_nodes(spec);
    requirements.push(PermissionRequirement {
        name: "USB device".to_string(),
        description: match nodes.first() {
            Some(node) => format!("{} at {}", spec.name, node.display()),
            None => format!("No {:04x}:{:04x} device found", spec.vendor_id, spec.product_id),
        },
        status: if nodes.is_empty() {
            RequirementStatus::NotMet
        } else {
            RequirementStatus::Met
        },
    });

    // 2. Device node read/write access
    let accessible = nodes.iter().any(|n| can_access(n));
    requirements.push(PermissionRequirement {
        name: "USB read/write access".to_string(),
        description: if nodes.is_empty() {
            "N/A".to_string()
        } else if accessible {
            "Device node is accessible".to_string()
        } else {
            "Cannot access device node".to_string()
        },
        status: if nodes.is_empty() {
            RequirementStatus::NotApplicable
        } else if accessible {
            RequirementStatus::Met
        } else {
            RequirementStatus::NotMet
        },
    });

    // 3. udev rule installed
    let rules = find_matching_rules(spec);
    requirements.push(PermissionRequirement {
        name: "udev rules".to_string(),
        description: match rules.first() {
            Some(path) => format!("Rule installed in {}", path.display()),
            None => format!("No rule found; install: {}", spec.udev_rule()),
        },
        status: if !rules.is_empty() {
            RequirementStatus::Met
        } else if accessible {
            // Running as root or access granted some other way
            RequirementStatus::NotApplicable
        } else {
            RequirementStatus::NotMet
        },
    });

    PermissionCheckResult { requirements }
}
