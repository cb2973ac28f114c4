use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::FinopsResult;
use crate::models::{
    CreateWorkspace, JobRun, Recommendation, RecommendationUpsert, Resource, ResourceRecord,
    Workspace, WorkspaceStatus,
};

/// Data access contract for the job pipeline's four persisted entities.
///
/// Implementations must honor the upsert and soft-delete semantics described
/// on each method; callers (the job runner, the scheduler) rely on them for
/// idempotent reruns.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FinopsRepository: Send + Sync {
    // ----- Workspace -----

    async fn get_workspace(&self, id: Uuid) -> FinopsResult<Option<Workspace>>;

    async fn list_workspaces(&self) -> FinopsResult<Vec<Workspace>>;

    async fn create_workspace(&self, input: CreateWorkspace) -> FinopsResult<Workspace>;

    async fn set_workspace_status(&self, id: Uuid, status: WorkspaceStatus) -> FinopsResult<()>;

    // ----- JobRun -----

    async fn start_job_run(
        &self,
        workspace_id: Uuid,
        started_at: DateTime<Utc>,
    ) -> FinopsResult<JobRun>;

    async fn complete_job_run(
        &self,
        id: Uuid,
        recommendations_found: i32,
        completed_at: DateTime<Utc>,
    ) -> FinopsResult<()>;

    async fn fail_job_run(
        &self,
        id: Uuid,
        error_message: String,
        completed_at: DateTime<Utc>,
    ) -> FinopsResult<()>;

    async fn latest_job_run(&self, workspace_id: Uuid) -> FinopsResult<Option<JobRun>>;

    // ----- Resource -----

    /// Keyed by (workspace_id, record.resource_id). On insert all fields are
    /// set and `last_seen_at = now`. On update all descriptive fields are
    /// overwritten, `last_seen_at = now`, `created_at` is preserved, and
    /// `estimated_monthly_cost` is updated unless the new value is `None`.
    async fn upsert_resource(
        &self,
        workspace_id: Uuid,
        record: ResourceRecord,
        now: DateTime<Utc>,
    ) -> FinopsResult<Resource>;

    /// Patches only `estimated_monthly_cost` / `state` on an already-inventoried
    /// resource, looked up by (workspace_id, resource_id). Used by the
    /// analysis path, which must not overwrite the richer
    /// inventory record wholesale. No-op if the resource does not exist.
    async fn patch_resource_cost_and_state(
        &self,
        workspace_id: Uuid,
        resource_id: &str,
        estimated_monthly_cost: Option<f64>,
        state: Option<String>,
        now: DateTime<Utc>,
    ) -> FinopsResult<()>;

    /// Sets `state = "not-found"` on every resource in the workspace whose
    /// `last_seen_at` is older than `before`. Soft delete: rows remain.
    /// Returns the number of rows touched.
    async fn sweep_stale_resources(
        &self,
        workspace_id: Uuid,
        before: DateTime<Utc>,
    ) -> FinopsResult<u64>;

    async fn list_resources(&self, workspace_id: Uuid) -> FinopsResult<Vec<Resource>>;

    // ----- Recommendation -----

    /// Keyed by (workspace_id, resource_id, type). On insert, status=`new`.
    /// On update, description/savings/confidence/metadata are refreshed but
    /// `status` is left untouched — the engine never overwrites user intent.
    async fn upsert_recommendation(
        &self,
        workspace_id: Uuid,
        upsert: RecommendationUpsert,
        now: DateTime<Utc>,
    ) -> FinopsResult<Recommendation>;

    async fn list_recommendations(&self, workspace_id: Uuid) -> FinopsResult<Vec<Recommendation>>;
}
