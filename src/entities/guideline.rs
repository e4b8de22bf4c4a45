//! Guideline entity - Knowledge-base articles on imaging findings.
//!
//! Each article belongs to a free-text category, may carry an illustration
//! (stored as a served path, not the bytes) and free-text cross references to
//! internal cases. Titles double as the dedup key when seeding.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Guideline database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "disease_guidelines")]
pub struct Model {
    /// Unique identifier for the article
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Organ-system grouping (e.g., `"肝膽系統"`)
    pub category: String,
    /// Condition name
    pub title: String,
    /// Article body
    pub content: String,
    /// Comma-separated search tokens
    pub keywords: String,
    /// Served path of the attached image, if any
    pub image_url: Option<String>,
    /// Internal case references
    pub reference_cases: Option<String>,
    /// Refreshed on every write
    pub updated_at: DateTimeUtc,
}

/// Guidelines have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
