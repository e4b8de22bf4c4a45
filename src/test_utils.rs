//! Shared test utilities for the portal.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        guideline::{self, GuidelineInput},
        maintenance::{self, NewMaintenanceEntry},
        work_log,
    },
    entities::{
        self,
        maintenance_log::{FaultState, MaintenanceKind, Severity},
    },
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a work log entry with the given content.
pub async fn create_test_work_log(
    db: &DatabaseConnection,
    content: &str,
) -> Result<entities::work_log::Model> {
    work_log::create_work_log(db, content.to_string()).await
}

/// Files an open fault on `device`.
///
/// # Defaults
/// * `content`: `"Test fault"`
/// * `reporter`: `"Alice"`
pub async fn create_test_fault(
    db: &DatabaseConnection,
    device: &str,
    severity: Severity,
) -> Result<entities::maintenance_log::Model> {
    maintenance::create_maintenance_entry(
        db,
        NewMaintenanceEntry {
            kind: MaintenanceKind::Fault(FaultState::Open(severity)),
            device: device.to_string(),
            content: "Test fault".to_string(),
            reporter: "Alice".to_string(),
        },
    )
    .await
}

/// Files a routine maintenance record on `device`.
pub async fn create_test_routine(
    db: &DatabaseConnection,
    device: &str,
) -> Result<entities::maintenance_log::Model> {
    maintenance::create_maintenance_entry(
        db,
        NewMaintenanceEntry {
            kind: MaintenanceKind::Routine,
            device: device.to_string(),
            content: "Routine check".to_string(),
            reporter: "Alice".to_string(),
        },
    )
    .await
}

/// Creates a guideline without image or case references.
///
/// # Defaults
/// * `content`: `"Test content"`
/// * `keywords`: `"test"`
pub async fn create_test_guideline(
    db: &DatabaseConnection,
    category: &str,
    title: &str,
) -> Result<entities::guideline::Model> {
    guideline::upsert_guideline(
        db,
        GuidelineInput {
            category: category.to_string(),
            title: title.to_string(),
            content: "Test content".to_string(),
            keywords: "test".to_string(),
            ..Default::default()
        },
    )
    .await
}
