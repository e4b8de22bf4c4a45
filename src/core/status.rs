//! Device status board.
//!
//! Reduces maintenance entries to one health state per device. Only open
//! faults count: routine records and resolved faults never affect a device.
//! The result is the worst open fault, so the order of entries does not matter.

use crate::entities::maintenance_log::{self, Severity};
use serde::Serialize;

/// Health of a device as shown on the dashboard. Variants are ordered from
/// best to worst.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    /// No open faults
    Normal,
    /// Open faults, none urgent or critical
    Warning,
    Urgent,
    Critical,
}

impl From<Severity> for DeviceStatus {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Normal => Self::Warning,
            Severity::Urgent => Self::Urgent,
            Severity::Critical => Self::Critical,
        }
    }
}

/// One row of the status board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeviceStatusReport {
    pub device: String,
    pub status: DeviceStatus,
}

/// Health of `device` given the maintenance entries on hand.
#[must_use]
pub fn device_status(device: &str, entries: &[maintenance_log::Model]) -> DeviceStatus {
    entries
        .iter()
        .filter(|entry| entry.device == device)
        .filter_map(|entry| entry.kind().open_severity())
        .map(DeviceStatus::from)
        .max()
        .unwrap_or(DeviceStatus::Normal)
}

/// Status of every device in `devices`, in the given order.
#[must_use]
pub fn device_statuses(
    devices: &[String],
    entries: &[maintenance_log::Model],
) -> Vec<DeviceStatusReport> {
    devices
        .iter()
        .map(|device| DeviceStatusReport {
            device: device.clone(),
            status: device_status(device, entries),
        })
        .collect()
}

/// Number of faults still open across all devices.
#[must_use]
pub fn open_fault_count(entries: &[maintenance_log::Model]) -> usize {
    entries
        .iter()
        .filter(|entry| entry.kind().open_severity().is_some())
        .count()
}
