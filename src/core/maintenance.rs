//! Maintenance log business logic
//!
//! Handles routine upkeep records and equipment fault reports. Routine entries
//! are filed as already done. Faults are filed with a severity and stay open
//! until someone resolves them; resolving appends a note to the entry's content
//! and stamps `resolved_at`. A fault can be resolved once. Entries are never
//! deleted.

use crate::{
    entities::{
        MaintenanceLog,
        maintenance_log::{self, EntryStatus, EntryType, FaultState, MaintenanceKind, Severity},
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

use super::work_log::LIST_LIMIT;

/// Separator placed between the original content and a resolution note.
pub const RESOLUTION_MARKER: &str = "\n[修復紀錄] ";

/// Fields for a new maintenance entry.
#[derive(Debug, Clone)]
pub struct NewMaintenanceEntry {
    pub kind: MaintenanceKind,
    pub device: String,
    pub content: String,
    pub reporter: String,
}

/// Interprets the `type` / `status` strings of an incoming request.
///
/// Routine entries ignore the status. Faults accept `normal`, `urgent` or
/// `critical` and default to `normal` when no status is given.
///
/// # Errors
/// Returns `Error::Validation` for an unknown type or an invalid fault status.
pub fn kind_from_request(entry_type: &str, status: Option<&str>) -> Result<MaintenanceKind> {
    match entry_type.trim() {
        "routine" => Ok(MaintenanceKind::Routine),
        "fault" => {
            let severity = match status.map(str::trim) {
                None | Some("" | "normal") => Severity::Normal,
                Some("urgent") => Severity::Urgent,
                Some("critical") => Severity::Critical,
                Some(other) => {
                    return Err(Error::validation(
                        "status",
                        format!("Invalid fault status: {other}"),
                    ));
                }
            };
            Ok(MaintenanceKind::Fault(FaultState::Open(severity)))
        }
        "" => Err(Error::validation("type", "Type required")),
        other => Err(Error::validation(
            "type",
            format!("Invalid maintenance type: {other}"),
        )),
    }
}

/// Resolution note appended to a fault's content.
#[must_use]
pub fn resolution_note(reporter: Option<&str>) -> String {
    match reporter.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => format!("由 {name} 回報修復"),
        None => "已修復".to_string(),
    }
}

/// Returns the 50 most recent maintenance entries, newest first.
#[instrument(skip(db))]
pub async fn list_maintenance_entries(
    db: &DatabaseConnection,
) -> Result<Vec<maintenance_log::Model>> {
    MaintenanceLog::find()
        .order_by_desc(maintenance_log::Column::CreatedAt)
        .order_by_desc(maintenance_log::Column::Id)
        .limit(LIST_LIMIT)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns every fault that has not been resolved, regardless of age.
#[instrument(skip(db))]
pub async fn list_open_faults(db: &DatabaseConnection) -> Result<Vec<maintenance_log::Model>> {
    MaintenanceLog::find()
        .filter(maintenance_log::Column::EntryType.eq(EntryType::Fault))
        .filter(maintenance_log::Column::Status.ne(EntryStatus::Resolved))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Files a routine record or a fault report.
///
/// # Errors
/// Returns `Error::Validation` if the device, content or reporter is blank, or
/// if the entry is a fault that is already resolved.
#[instrument(skip(db, entry), fields(device = %entry.device))]
pub async fn create_maintenance_entry(
    db: &DatabaseConnection,
    entry: NewMaintenanceEntry,
) -> Result<maintenance_log::Model> {
    if entry.device.trim().is_empty() {
        return Err(Error::validation("device", "Device required"));
    }
    if entry.content.trim().is_empty() {
        return Err(Error::validation("content", "Content required"));
    }
    if entry.reporter.trim().is_empty() {
        return Err(Error::validation("reporter", "Reporter required"));
    }
    if entry.kind == MaintenanceKind::Fault(FaultState::Resolved) {
        return Err(Error::validation(
            "status",
            "A new fault report cannot start resolved",
        ));
    }

    let (entry_type, status) = entry.kind.columns();
    let row = maintenance_log::ActiveModel {
        entry_type: Set(entry_type),
        device: Set(entry.device.trim().to_string()),
        content: Set(entry.content),
        status: Set(status),
        reporter: Set(entry.reporter.trim().to_string()),
        created_at: Set(Utc::now()),
        resolved_at: Set(None),
        ..Default::default()
    };

    let created = row.insert(db).await?;
    if let Some(severity) = created.kind().open_severity() {
        warn!(
            "Fault {} reported on {} with severity {:?}",
            created.id, created.device, severity
        );
    } else {
        info!("Routine maintenance {} recorded on {}", created.id, created.device);
    }
    Ok(created)
}

/// Marks an open fault as resolved.
///
/// In one transaction: sets the status to resolved, stamps `resolved_at` and
/// appends [`RESOLUTION_MARKER`] plus [`resolution_note`] to the content.
///
/// # Errors
/// - `Error::MaintenanceNotFound` if no entry has this id
/// - `Error::NotAFault` if the entry is a routine record
/// - `Error::AlreadyResolved` if the fault was resolved before; the row is left
///   untouched
#[instrument(skip(db))]
pub async fn resolve_maintenance_entry(
    db: &DatabaseConnection,
    id: i64,
    reporter: Option<&str>,
) -> Result<maintenance_log::Model> {
    let txn = db.begin().await?;

    let entry = MaintenanceLog::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(Error::MaintenanceNotFound { id })?;

    match entry.kind() {
        MaintenanceKind::Routine => return Err(Error::NotAFault { id }),
        MaintenanceKind::Fault(FaultState::Resolved) => {
            return Err(Error::AlreadyResolved { id });
        }
        MaintenanceKind::Fault(FaultState::Open(_)) => {}
    }

    let content = format!(
        "{}{RESOLUTION_MARKER}{}",
        entry.content,
        resolution_note(reporter)
    );

    let mut active_model: maintenance_log::ActiveModel = entry.into();
    active_model.status = Set(EntryStatus::Resolved);
    active_model.resolved_at = Set(Some(Utc::now()));
    active_model.content = Set(content);
    let updated = active_model.update(&txn).await?;

    txn.commit().await?;

    info!("Fault {} on {} resolved", updated.id, updated.device);
    Ok(updated)
}
