use crate::errors::Error;
use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{error, warn};

/// Body sent for every storage failure; details stay in the log.
pub const STORAGE_ERROR_MESSAGE: &str = "Database error";

/// Failure of an API request: either a crate error or a request the
/// framework could not parse.
#[derive(Debug)]
pub enum ApiError {
    App(Error),
    BadRequest(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self::App(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::BadRequest(err.body_text())
    }
}

/// Status code an application error maps to.
#[must_use]
pub const fn error_status(err: &Error) -> StatusCode {
    match err {
        Error::Validation { .. } => StatusCode::BAD_REQUEST,
        Error::MaintenanceNotFound { .. }
        | Error::GuidelineNotFound { .. }
        | Error::SessionNotFound { .. } => StatusCode::NOT_FOUND,
        Error::AlreadyResolved { .. } | Error::NotAFault { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => {
                warn!("Rejected malformed request: {}", message);
                error_body(StatusCode::BAD_REQUEST, &message)
            }
            Self::App(err) if err.is_storage() => {
                error!("Storage failure: {}", err);
                let mut resp = error_body(StatusCode::INTERNAL_SERVER_ERROR, STORAGE_ERROR_MESSAGE);
                resp.headers_mut()
                    .insert("retry-after", HeaderValue::from_static("3"));
                resp
            }
            Self::App(err) => {
                let status = error_status(&err);
                if status.is_server_error() {
                    error!("Request failed: {}", err);
                    return error_body(status, "Internal server error");
                }
                error_body(status, &err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            error_status(&Error::validation("content", "Content required")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&Error::SessionNotFound { id: Uuid::nil() }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(&Error::AlreadyResolved { id: 1 }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(&Error::NotAFault { id: 1 }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_storage_error_sets_retry_after() {
        let err = Error::Database(sea_orm::DbErr::Custom("disk full".to_string()));
        let resp = ApiError::from(err).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            resp.headers().get("retry-after"),
            Some(&HeaderValue::from_static("3"))
        );
    }

    #[test]
    fn test_completion_error_hides_details() {
        let err = Error::Completion {
            message: "key=secret".to_string(),
        };
        let resp = ApiError::from(err).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(resp.headers().get("retry-after").is_none());
    }
}
