//! Maintenance log entity - Routine upkeep and equipment fault reports.
//!
//! On disk an entry is a flat `type` / `status` column pair, both plain text.
//! Code that needs to reason about an entry
//! goes through [`Model::kind`], which projects that pair into a
//! [`MaintenanceKind`]: routine entries carry no status, faults carry either an
//! open [`Severity`] or the resolved marker.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Maintenance log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_logs")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Routine upkeep or fault report
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Device tag (e.g., `"CT"`, `"3T MR"`); free text, not a reference
    pub device: String,
    /// Description, with resolution notes appended over time
    pub content: String,
    /// Raw status column; see [`Model::kind`]
    pub status: EntryStatus,
    /// Name of the staff member who filed the entry
    pub reporter: String,
    /// Server-assigned creation time
    pub created_at: DateTimeUtc,
    /// When the fault was marked resolved
    pub resolved_at: Option<DateTimeUtc>,
}

/// Maintenance logs have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Value of the `type` column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Scheduled upkeep, filed as already done
    #[sea_orm(string_value = "routine")]
    Routine,
    /// Equipment malfunction report
    #[sea_orm(string_value = "fault")]
    Fault,
}

/// Value of the `status` column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[sea_orm(string_value = "normal")]
    Normal,
    #[sea_orm(string_value = "urgent")]
    Urgent,
    #[sea_orm(string_value = "critical")]
    Critical,
    #[sea_orm(string_value = "done")]
    Done,
    #[sea_orm(string_value = "resolved")]
    Resolved,
}

/// How badly an open fault affects the device.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Device usable, needs attention
    Normal,
    /// Degraded, fix soon
    Urgent,
    /// Device down
    Critical,
}

/// Lifecycle of a fault report.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FaultState {
    Open(Severity),
    Resolved,
}

/// Typed view of an entry's `type` / `status` pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MaintenanceKind {
    Routine,
    Fault(FaultState),
}

impl MaintenanceKind {
    /// Column values that store this kind. Routine entries are always `done`.
    #[must_use]
    pub const fn columns(self) -> (EntryType, EntryStatus) {
        match self {
            Self::Routine => (EntryType::Routine, EntryStatus::Done),
            Self::Fault(FaultState::Resolved) => (EntryType::Fault, EntryStatus::Resolved),
            Self::Fault(FaultState::Open(severity)) => (
                EntryType::Fault,
                match severity {
                    Severity::Normal => EntryStatus::Normal,
                    Severity::Urgent => EntryStatus::Urgent,
                    Severity::Critical => EntryStatus::Critical,
                },
            ),
        }
    }

    /// Reads a stored column pair. A routine row ignores its status; a fault
    /// row carrying `done` is treated as an open, normal-severity fault.
    #[must_use]
    pub const fn from_columns(entry_type: EntryType, status: EntryStatus) -> Self {
        match (entry_type, status) {
            (EntryType::Routine, _) => Self::Routine,
            (EntryType::Fault, EntryStatus::Resolved) => Self::Fault(FaultState::Resolved),
            (EntryType::Fault, EntryStatus::Urgent) => {
                Self::Fault(FaultState::Open(Severity::Urgent))
            }
            (EntryType::Fault, EntryStatus::Critical) => {
                Self::Fault(FaultState::Open(Severity::Critical))
            }
            (EntryType::Fault, EntryStatus::Normal | EntryStatus::Done) => {
                Self::Fault(FaultState::Open(Severity::Normal))
            }
        }
    }

    /// Severity of the fault if it is still open.
    #[must_use]
    pub const fn open_severity(self) -> Option<Severity> {
        match self {
            Self::Fault(FaultState::Open(severity)) => Some(severity),
            Self::Routine | Self::Fault(FaultState::Resolved) => None,
        }
    }
}

impl Model {
    /// Typed view of this entry's `type` / `status` columns.
    #[must_use]
    pub const fn kind(&self) -> MaintenanceKind {
        MaintenanceKind::from_columns(self.entry_type, self.status)
    }
}
