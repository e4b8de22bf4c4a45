//! Setting entity - Stores portal-wide values keyed by a fixed set of names.
//!
//! The table is a small key/value store. Keys are not free-form: every key the
//! portal reads or writes is a [`SettingKey`] variant.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Setting database model - one row per key
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    /// Setting key (e.g., `"announcement"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// Setting value stored as text
    pub value: String,
    /// When this setting was last written
    pub updated_at: DateTimeUtc,
}

/// Settings have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// The keys the portal stores in the `settings` table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// Ticker text shown at the top of the dashboard
    Announcement,
}

impl SettingKey {
    /// Column value used for this key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Announcement => "announcement",
        }
    }
}
