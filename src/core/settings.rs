//! Settings and announcement business logic
//!
//! Reads and writes the `settings` table. Writes are a single
//! `INSERT .. ON CONFLICT(key) DO UPDATE` statement, so a concurrent reader
//! sees either the old value or the new one.

use crate::{
    entities::{Setting, SettingKey, setting},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{Set, prelude::*, sea_query::OnConflict};
use tracing::{debug, instrument};

/// Reads a setting, returning `None` when the key has never been written.
#[instrument(skip(db))]
pub async fn get_setting<C>(db: &C, key: SettingKey) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let value = Setting::find_by_id(key.as_str().to_string())
        .one(db)
        .await?
        .map(|row| row.value);
    debug!("Setting {:?} = {:?}", key, value);
    Ok(value)
}

/// Inserts or replaces the value stored under `key`.
#[instrument(skip(db, value))]
pub async fn set_setting<C>(db: &C, key: SettingKey, value: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let row = setting::ActiveModel {
        key: Set(key.as_str().to_string()),
        value: Set(value.to_string()),
        updated_at: Set(Utc::now()),
    };

    Setting::insert(row)
        .on_conflict(
            OnConflict::column(setting::Column::Key)
                .update_columns([setting::Column::Value, setting::Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(())
}

/// Current announcement text, empty when none has been set.
pub async fn get_announcement(db: &DatabaseConnection) -> Result<String> {
    Ok(get_setting(db, SettingKey::Announcement)
        .await?
        .unwrap_or_default())
}

/// Replaces the announcement text.
pub async fn set_announcement(db: &DatabaseConnection, text: &str) -> Result<()> {
    set_setting(db, SettingKey::Announcement, text).await
}

/// Splits announcement text into ticker items.
///
/// Items are separated by `|` or newlines; surrounding whitespace is trimmed
/// and empty items are dropped.
#[must_use]
pub fn ticker_items(text: &str) -> Vec<String> {
    text.split(['|', '\n'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}
