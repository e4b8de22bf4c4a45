//! Handlers for the announcement, work log, maintenance and status routes.

use super::AppState;
use super::error::ApiError;
use crate::core::{maintenance, settings, status, work_log};
use crate::core::maintenance::NewMaintenanceEntry;
use crate::core::status::DeviceStatusReport;
use crate::entities::{maintenance_log, work_log as work_log_entity};
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

type ApiResult<T> = std::result::Result<T, ApiError>;

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "time": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

pub async fn get_announcement(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let text = settings::get_announcement(&state.db).await?;
    let items = settings::ticker_items(&text);
    Ok(Json(json!({ "text": text, "items": items })))
}

#[derive(Debug, Default, Deserialize)]
pub struct AnnouncementRequest {
    #[serde(default)]
    pub text: Option<String>,
}

pub async fn set_announcement(
    State(state): State<AppState>,
    payload: Result<Json<AnnouncementRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    settings::set_announcement(&state.db, request.text.as_deref().unwrap_or_default()).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn list_work_logs(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<work_log_entity::Model>>> {
    Ok(Json(work_log::list_work_logs(&state.db).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct WorkLogRequest {
    #[serde(default)]
    pub content: Option<String>,
}

pub async fn create_work_log(
    State(state): State<AppState>,
    payload: Result<Json<WorkLogRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    let created = work_log::create_work_log(&state.db, request.content.unwrap_or_default()).await?;
    Ok(Json(json!({ "id": created.id, "success": true })))
}

pub async fn list_maintenance(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<maintenance_log::Model>>> {
    Ok(Json(maintenance::list_maintenance_entries(&state.db).await?))
}

/// Body of a new maintenance entry. Missing fields become validation errors
/// rather than parse failures.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MaintenanceRequest {
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    pub device: Option<String>,
    pub content: Option<String>,
    pub status: Option<String>,
    pub reporter: Option<String>,
}

pub async fn create_maintenance(
    State(state): State<AppState>,
    payload: Result<Json<MaintenanceRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    let kind = maintenance::kind_from_request(
        request.entry_type.as_deref().unwrap_or_default(),
        request.status.as_deref(),
    )?;
    let created = maintenance::create_maintenance_entry(
        &state.db,
        NewMaintenanceEntry {
            kind,
            device: request.device.unwrap_or_default(),
            content: request.content.unwrap_or_default(),
            reporter: request.reporter.unwrap_or_default(),
        },
    )
    .await?;
    Ok(Json(json!({ "id": created.id, "success": true })))
}

#[derive(Debug, Default, Deserialize)]
pub struct ResolveRequest {
    #[serde(default)]
    pub reporter: Option<String>,
}

/// The body is optional; without one the fault is resolved anonymously.
pub async fn resolve_maintenance(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Option<Json<ResolveRequest>>,
) -> ApiResult<Json<Value>> {
    let Path(id) = id?;
    let reporter = payload.and_then(|Json(request)| request.reporter);
    maintenance::resolve_maintenance_entry(&state.db, id, reporter.as_deref()).await?;
    Ok(Json(json!({ "success": true })))
}

/// Dashboard counters derived from the open faults.
pub async fn device_summary(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let open_faults = maintenance::list_open_faults(&state.db).await?;
    Ok(Json(json!({ "open_faults": status::open_fault_count(&open_faults) })))
}

pub async fn device_statuses(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<DeviceStatusReport>>> {
    let open_faults = maintenance::list_open_faults(&state.db).await?;
    Ok(Json(status::device_statuses(&state.devices, &open_faults)))
}
