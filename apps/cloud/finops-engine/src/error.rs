use uuid::Uuid;

use crate::cloud_client::CloudClientError;

/// Top-level error type for the engine binary. Mirrors the teacher's
/// per-crate `thiserror` enum + `#[from]` conversion idiom
/// (`domain_finops::FinopsError`), generalized to also carry the cloud
/// client and scheduler failure modes this crate introduces.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("workspace {0} not found")]
    WorkspaceNotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("cloud client error: {0}")]
    CloudClient(#[from] CloudClientError),
    #[error("scheduler error: {0}")]
    Scheduler(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<domain_finops::FinopsError> for EngineError {
    fn from(err: domain_finops::FinopsError) -> Self {
        match err {
            domain_finops::FinopsError::WorkspaceNotFound(id) => Self::WorkspaceNotFound(id),
            domain_finops::FinopsError::JobRunNotFound(id) => {
                Self::Internal(format!("job run {id} not found"))
            }
            domain_finops::FinopsError::Database(err) => Self::Database(err),
            domain_finops::FinopsError::Internal(msg) => Self::Internal(msg),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
