//! HTTP surface of the portal.
//!
//! Every JSON route lives under `/api`; unmatched `/api/*` paths, and known
//! paths hit with the wrong method, answer with a JSON 404. Uploaded guideline images are served from `/uploads`.

/// Assistant session routes
pub mod assistant;
/// Error to response mapping
pub mod error;
/// Knowledge base routes
pub mod guidelines;
/// Announcement, work log, maintenance and status routes
pub mod records;
/// Image store for guideline attachments
pub mod uploads;

use crate::assistant::SessionRegistry;
use axum::Router;
use axum::extract::{DefaultBodyLimit, OriginalUri};
use axum::http::{Method, StatusCode};
use axum::response::Response;
use axum::routing::{get, post};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use uploads::ImageStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub images: Arc<ImageStore>,
    pub assistant: SessionRegistry,
    /// Device roster shown on the status board, in display order
    pub devices: Arc<Vec<String>>,
}

impl AppState {
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        images: ImageStore,
        assistant: SessionRegistry,
        devices: Vec<String>,
    ) -> Self {
        Self {
            db,
            images: Arc::new(images),
            assistant,
            devices: Arc::new(devices),
        }
    }
}

async fn api_not_found(method: Method, OriginalUri(uri): OriginalUri) -> Response {
    error::error_body(
        StatusCode::NOT_FOUND,
        &format!("API endpoint not found: {method} {uri}"),
    )
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(records::health))
        .route(
            "/announcement",
            get(records::get_announcement).post(records::set_announcement),
        )
        .route(
            "/worklogs",
            get(records::list_work_logs).post(records::create_work_log),
        )
        .route(
            "/maintenance",
            get(records::list_maintenance).post(records::create_maintenance),
        )
        .route(
            "/maintenance/:id/resolve",
            post(records::resolve_maintenance),
        )
        .route("/devices/status", get(records::device_statuses))
        .route("/devices/summary", get(records::device_summary))
        .route(
            "/guidelines",
            get(guidelines::list_guidelines).post(guidelines::upsert_guideline),
        )
        .route("/assistant/sessions", post(assistant::open_session))
        .route("/assistant/sessions/:id", get(assistant::get_transcript))
        .route(
            "/assistant/sessions/:id/reset",
            post(assistant::reset_session),
        )
        .route("/assistant/sessions/:id/ask", post(assistant::ask))
        .route("/assistant/sessions/:id/sop", post(assistant::ask_sop))
        .method_not_allowed_fallback(api_not_found)
        .fallback(api_not_found)
}

/// Builds the application router. `max_body_bytes` caps every request body,
/// image uploads included.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    let uploads = ServeDir::new(state.images.dir());
    Router::new()
        .nest("/api", api_routes())
        .nest_service(uploads::URL_PREFIX, uploads)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
