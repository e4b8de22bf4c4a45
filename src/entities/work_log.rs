//! Work log entity - Free-text shift notes, immutable once written.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Work log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "worklogs")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Note text
    pub content: String,
    /// Server-assigned creation time
    pub created_at: DateTimeUtc,
}

/// Work logs have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
