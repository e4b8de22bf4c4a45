//! Work log business logic
//!
//! Shift notes are append-only: there is a create and a newest-first listing,
//! nothing else.

use crate::{
    entities::{WorkLog, work_log},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use tracing::{info, instrument};

/// Most rows any listing returns.
pub const LIST_LIMIT: u64 = 50;

/// Returns the 50 most recent work log entries, newest first.
#[instrument(skip(db))]
pub async fn list_work_logs(db: &DatabaseConnection) -> Result<Vec<work_log::Model>> {
    WorkLog::find()
        .order_by_desc(work_log::Column::CreatedAt)
        .order_by_desc(work_log::Column::Id)
        .limit(LIST_LIMIT)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Records a new work log entry stamped with the current time.
///
/// # Errors
/// Returns `Error::Validation` if the content is empty or whitespace-only.
#[instrument(skip(db, content))]
pub async fn create_work_log(db: &DatabaseConnection, content: String) -> Result<work_log::Model> {
    if content.trim().is_empty() {
        return Err(Error::validation("content", "Content required"));
    }

    let entry = work_log::ActiveModel {
        content: Set(content),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let entry = entry.insert(db).await?;
    info!("Created work log {}", entry.id);
    Ok(entry)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_work_log_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_work_log(&db, String::new()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "content", .. }
        ));

        let result = create_work_log(&db, "  \n ".to_string()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "content", .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_work_log_writes_nothing() -> Result<()> {
        let db = setup_test_db().await?;

        assert!(create_work_log(&db, String::new()).await.is_err());
        assert_eq!(WorkLog::find().count(&db).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_work_log_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let entry = create_work_log(&db, "CT 顯影劑補貨完成".to_string()).await?;
        assert!(entry.id > 0);
        assert_eq!(entry.content, "CT 顯影劑補貨完成");

        let listed = list_work_logs(&db).await?;
        assert_eq!(listed, vec![entry]);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_work_logs_caps_and_orders() -> Result<()> {
        let db = setup_test_db().await?;

        for i in 0..55 {
            create_test_work_log(&db, &format!("note {i}")).await?;
        }

        let listed = list_work_logs(&db).await?;
        assert_eq!(listed.len(), 50);
        assert!(
            listed
                .windows(2)
                .all(|pair| pair[0].created_at >= pair[1].created_at)
        );
        assert_eq!(listed[0].content, "note 54");
        assert_eq!(listed[49].content, "note 5");

        Ok(())
    }
}
