use super::AppState;
use super::error::ApiError;
use crate::assistant::{AskOutcome, AssistantContext, Turn, sop_question};
use crate::errors::Error;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Device key the conversation is about; absent or blank means general.
#[derive(Debug, Default, Deserialize)]
pub struct ContextRequest {
    #[serde(default)]
    pub context: Option<String>,
}

impl ContextRequest {
    fn into_context(self) -> AssistantContext {
        AssistantContext::from_device(self.context.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SopRequest {
    #[serde(default)]
    pub device: String,
}

pub async fn open_session(
    State(state): State<AppState>,
    payload: Option<Json<ContextRequest>>,
) -> Json<Value> {
    let context = payload.map(|Json(request)| request).unwrap_or_default();
    let (id, transcript) = state.assistant.open(context.into_context()).await;
    Json(json!({ "id": id, "transcript": transcript }))
}

pub async fn get_transcript(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Vec<Turn>>> {
    let Path(id) = id?;
    Ok(Json(state.assistant.transcript(id).await?))
}

pub async fn reset_session(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Option<Json<ContextRequest>>,
) -> ApiResult<Json<Vec<Turn>>> {
    let Path(id) = id?;
    let context = payload.map(|Json(request)| request).unwrap_or_default();
    Ok(Json(state.assistant.reset(id, context.into_context()).await?))
}

pub async fn ask(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> ApiResult<Json<AskOutcome>> {
    let Path(id) = id?;
    let Json(request) = payload?;
    Ok(Json(state.assistant.ask(id, &request.question).await?))
}

/// Asks the canned SOP question for `device`.
pub async fn ask_sop(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<SopRequest>, JsonRejection>,
) -> ApiResult<Json<AskOutcome>> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let device = request.device.trim();
    if device.is_empty() {
        return Err(Error::validation("device", "Device required").into());
    }
    Ok(Json(state.assistant.ask(id, &sop_question(device)).await?))
}
