//! Guideline business logic - the imaging knowledge base.
//!
//! Articles are created or replaced whole. An update only touches
//! `image_url` when a new image came with it, so editing the text of an
//! illustrated article keeps its picture.

use crate::{
    entities::{Guideline, guideline},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Fields for creating or replacing a guideline.
#[derive(Debug, Clone, Default)]
pub struct GuidelineInput {
    /// Existing article to replace; `None` creates a new one
    pub id: Option<i64>,
    pub category: String,
    pub title: String,
    pub content: String,
    pub keywords: String,
    pub reference_cases: Option<String>,
    /// Served path of a freshly stored image
    pub image_url: Option<String>,
}

/// Returns every guideline ordered by category, then title.
#[instrument(skip(db))]
pub async fn list_guidelines(db: &DatabaseConnection) -> Result<Vec<guideline::Model>> {
    Guideline::find()
        .order_by_asc(guideline::Column::Category)
        .order_by_asc(guideline::Column::Title)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Whether a guideline matches a search box query.
///
/// Title and keywords match case-insensitively; category matches verbatim.
/// A blank query matches everything.
#[must_use]
pub fn matches_query(entry: &guideline::Model, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    entry.title.to_lowercase().contains(&needle)
        || entry.keywords.to_lowercase().contains(&needle)
        || entry.category.contains(query)
}

/// Lists guidelines, filtered by `query` when one is given.
pub async fn search_guidelines(
    db: &DatabaseConnection,
    query: Option<&str>,
) -> Result<Vec<guideline::Model>> {
    let mut entries = list_guidelines(db).await?;
    if let Some(query) = query {
        entries.retain(|entry| matches_query(entry, query));
    }
    Ok(entries)
}

/// Finds a guideline by its exact title.
pub async fn get_guideline_by_title<C>(db: &C, title: &str) -> Result<Option<guideline::Model>>
where
    C: ConnectionTrait,
{
    Guideline::find()
        .filter(guideline::Column::Title.eq(title))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a guideline by id.
pub async fn get_guideline_by_id(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Option<guideline::Model>> {
    Guideline::find_by_id(id).one(db).await.map_err(Into::into)
}

fn normalize_reference_cases(reference_cases: Option<String>) -> Option<String> {
    reference_cases.filter(|cases| !cases.trim().is_empty())
}

/// Creates a guideline, or replaces every field of an existing one.
///
/// On update `image_url` is kept unless the input carries a new one, and
/// `updated_at` is refreshed either way.
///
/// # Errors
/// - `Error::Validation` if the title or content is blank
/// - `Error::GuidelineNotFound` if `input.id` names no article
#[instrument(skip(db, input), fields(id = ?input.id, title = %input.title))]
pub async fn upsert_guideline(
    db: &DatabaseConnection,
    input: GuidelineInput,
) -> Result<guideline::Model> {
    if input.title.trim().is_empty() {
        return Err(Error::validation("title", "Title required"));
    }
    if input.content.trim().is_empty() {
        return Err(Error::validation("content", "Content required"));
    }

    let now = Utc::now();
    let reference_cases = normalize_reference_cases(input.reference_cases);

    let Some(id) = input.id else {
        let row = guideline::ActiveModel {
            category: Set(input.category.trim().to_string()),
            title: Set(input.title.trim().to_string()),
            content: Set(input.content),
            keywords: Set(input.keywords),
            image_url: Set(input.image_url),
            reference_cases: Set(reference_cases),
            updated_at: Set(now),
            ..Default::default()
        };
        let created = row.insert(db).await?;
        info!("Created guideline {} ({})", created.id, created.title);
        return Ok(created);
    };

    let mut active_model: guideline::ActiveModel = Guideline::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::GuidelineNotFound { id })?
        .into();

    active_model.category = Set(input.category.trim().to_string());
    active_model.title = Set(input.title.trim().to_string());
    active_model.content = Set(input.content);
    active_model.keywords = Set(input.keywords);
    active_model.reference_cases = Set(reference_cases);
    active_model.updated_at = Set(now);
    if let Some(image_url) = input.image_url {
        active_model.image_url = Set(Some(image_url));
    }

    let updated = active_model.update(db).await?;
    info!("Updated guideline {} ({})", updated.id, updated.title);
    Ok(updated)
}
