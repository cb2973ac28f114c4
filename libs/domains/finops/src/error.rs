use thiserror::Error;
use uuid::Uuid;

/// Result type for finops persistence operations.
pub type FinopsResult<T> = Result<T, FinopsError>;

/// Errors that can occur in the finops domain's persistence layer.
///
/// This crate has no HTTP surface (the job pipeline's HTTP API is out of
/// scope), so unlike sibling domains this enum carries no `IntoResponse`
/// impl — callers are the job runner and the CLI status surface, not axum
/// handlers.
#[derive(Debug, Error)]
pub enum FinopsError {
    /// Workspace not found
    #[error("Workspace not found: {0}")]
    WorkspaceNotFound(Uuid),

    /// Job run not found
    #[error("Job run not found: {0}")]
    JobRunNotFound(Uuid),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
