use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Maintenance entry {id} not found")]
    MaintenanceNotFound { id: i64 },

    #[error("Maintenance entry {id} is already resolved")]
    AlreadyResolved { id: i64 },

    #[error("Maintenance entry {id} is not a fault report")]
    NotAFault { id: i64 },

    #[error("Guideline {id} not found")]
    GuidelineNotFound { id: i64 },

    #[error("Assistant session {id} not found")]
    SessionNotFound { id: Uuid },

    #[error("Completion service error: {message}")]
    Completion { message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Builds a validation error for a single request field.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Whether the error comes from the storage layer rather than the caller.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Io(_))
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
