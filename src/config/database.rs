//! Database configuration module for the portal.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, guarded by `IF NOT EXISTS` so startup
//! against an existing portal database leaves its rows alone.

use crate::entities::{Guideline, MaintenanceLog, Setting, WorkLog};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info};

/// Default database location, created on first connect.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://radportal.db?mode=rwc";

/// Resolves the database URL: `DATABASE_URL` wins over the configured value.
#[must_use]
pub fn resolve_database_url(configured: Option<&str>) -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| {
        configured.map_or_else(|| DEFAULT_DATABASE_URL.to_string(), ToString::to_string)
    })
}

/// Establishes a connection to the `SQLite` database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    info!("Connecting to database at {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

async fn create_table_for<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    debug!("Ensuring table {}", entity.table_name());
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates the settings, work log, maintenance log and guideline tables if missing.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table_for(db, &schema, Setting).await?;
    create_table_for(db, &schema, WorkLog).await?;
    create_table_for(db, &schema, MaintenanceLog).await?;
    create_table_for(db, &schema, Guideline).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{GuidelineModel, MaintenanceLogModel, SettingModel, WorkLogModel};
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<SettingModel> = Setting::find().limit(1).all(&db).await?;
        let _: Vec<WorkLogModel> = WorkLog::find().limit(1).all(&db).await?;
        let _: Vec<MaintenanceLogModel> = MaintenanceLog::find().limit(1).all(&db).await?;
        let _: Vec<GuidelineModel> = Guideline::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_twice_is_harmless() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
