//! Startup seeding of a fresh portal database.
//!
//! Writes the configured guideline catalog and default announcement. Guidelines
//! are keyed by title and the announcement by its setting key, so running the
//! seed against a populated database adds nothing and overwrites nothing.

use crate::{
    config::app::SeedConfig,
    core::{guideline::get_guideline_by_title, settings},
    entities::{SettingKey, guideline},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument};

/// What a seeding run wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Guidelines inserted because no row had their title
    pub guidelines_inserted: usize,
    /// Whether the default announcement was written
    pub announcement_written: bool,
}

/// Seeds missing guidelines and the default announcement in one transaction.
#[instrument(skip_all)]
pub async fn seed_defaults(db: &DatabaseConnection, seed: &SeedConfig) -> Result<SeedReport> {
    let txn = db.begin().await?;
    let mut report = SeedReport::default();

    for entry in &seed.guidelines {
        if get_guideline_by_title(&txn, &entry.title).await?.is_some() {
            debug!("Guideline {:?} already present", entry.title);
            continue;
        }

        guideline::ActiveModel {
            category: Set(entry.category.clone()),
            title: Set(entry.title.clone()),
            content: Set(entry.content.clone()),
            keywords: Set(entry.keywords.clone()),
            image_url: Set(None),
            reference_cases: Set(None),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        report.guidelines_inserted += 1;
    }

    if let Some(announcement) = &seed.announcement {
        if settings::get_setting(&txn, SettingKey::Announcement)
            .await?
            .is_none()
        {
            settings::set_setting(&txn, SettingKey::Announcement, announcement).await?;
            report.announcement_written = true;
        }
    }

    txn.commit().await?;

    info!(
        "Seeded {} guidelines (announcement written: {})",
        report.guidelines_inserted, report.announcement_written
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::app::{DEFAULT_CONFIG, GuidelineSeed, parse_config};
    use crate::core::{guideline::list_guidelines, settings::get_announcement};
    use crate::entities::Guideline;
    use crate::test_utils::*;

    fn sample_seed() -> SeedConfig {
        SeedConfig {
            announcement: Some("預設公告".to_string()),
            guidelines: vec![
                GuidelineSeed {
                    category: "肝膽系統".to_string(),
                    title: "膽結石 (Gallstone)".to_string(),
                    content: "強回音伴隨聲影".to_string(),
                    keywords: "stone".to_string(),
                },
                GuidelineSeed {
                    category: "攝護腺".to_string(),
                    title: "攝護腺肥大 (BPH)".to_string(),
                    content: "體積增大".to_string(),
                    keywords: "BPH".to_string(),
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_seed_fresh_database() -> Result<()> {
        let db = setup_test_db().await?;

        let report = seed_defaults(&db, &sample_seed()).await?;
        assert_eq!(
            report,
            SeedReport {
                guidelines_inserted: 2,
                announcement_written: true,
            }
        );
        assert_eq!(get_announcement(&db).await?, "預設公告");
        assert!(
            list_guidelines(&db)
                .await?
                .iter()
                .all(|g| g.image_url.is_none())
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;

        seed_defaults(&db, &sample_seed()).await?;
        let report = seed_defaults(&db, &sample_seed()).await?;

        assert_eq!(report, SeedReport::default());
        assert_eq!(Guideline::find().count(&db).await?, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_skips_existing_title_and_announcement() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_guideline(&db, "自訂", "膽結石 (Gallstone)").await?;
        settings::set_announcement(&db, "已有公告").await?;

        let report = seed_defaults(&db, &sample_seed()).await?;

        assert_eq!(report.guidelines_inserted, 1);
        assert!(!report.announcement_written);
        assert_eq!(get_announcement(&db).await?, "已有公告");

        let existing = get_guideline_by_title(&db, "膽結石 (Gallstone)")
            .await?
            .map(|g| g.category);
        assert_eq!(existing.as_deref(), Some("自訂"));

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_builtin_catalog() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_config(DEFAULT_CONFIG)?;

        let report = seed_defaults(&db, &config.seed).await?;
        assert_eq!(report.guidelines_inserted, 8);
        assert_eq!(list_guidelines(&db).await?.len(), 8);

        Ok(())
    }
}
