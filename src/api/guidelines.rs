use super::AppState;
use super::error::ApiError;
use crate::core::guideline::{self, GuidelineInput};
use crate::entities::guideline as guideline_entity;
use crate::errors::Error;
use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

pub async fn list_guidelines(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<guideline_entity::Model>>> {
    Ok(Json(
        guideline::search_guidelines(&state.db, params.q.as_deref()).await?,
    ))
}

/// Parses the optional `id` form field; blank means a new article.
fn parse_id(raw: &str) -> crate::errors::Result<Option<i64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| Error::validation("id", format!("Invalid guideline id: {raw}")))
}

/// Accepts the guideline form. The optional `image` part is stored first and
/// its served path attached to the record; if the record is then rejected the
/// stored file is deleted again.
pub async fn upsert_guideline(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<Value>> {
    let mut multipart = multipart?;
    let mut input = GuidelineInput::default();
    let mut image: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().map(ToString::to_string);
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    image = Some((file_name, bytes.to_vec()));
                }
            }
            "id" => input.id = parse_id(&field.text().await?)?,
            "category" => input.category = field.text().await?,
            "title" => input.title = field.text().await?,
            "content" => input.content = field.text().await?,
            "keywords" => input.keywords = field.text().await?,
            "reference_cases" => input.reference_cases = Some(field.text().await?),
            other => debug!("Ignoring unknown guideline field {:?}", other),
        }
    }

    if let Some((file_name, bytes)) = image {
        input.image_url = Some(state.images.save(file_name.as_deref(), &bytes).await?);
    }
    let stored_image = input.image_url.clone();

    match guideline::upsert_guideline(&state.db, input).await {
        Ok(saved) => Ok(Json(json!({ "id": saved.id, "success": true }))),
        Err(err) => {
            if let Some(served_path) = stored_image {
                if let Err(e) = state.images.remove(&served_path).await {
                    warn!("Failed to remove orphaned image {}: {}", served_path, e);
                }
            }
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert!(matches!(parse_id(""), Ok(None)));
        assert!(matches!(parse_id(" 7 "), Ok(Some(7))));
        assert!(matches!(
            parse_id("seven"),
            Err(Error::Validation { field: "id", .. })
        ));
    }
}
