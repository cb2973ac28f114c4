use uuid::Uuid;
use validator::Validate;

use crate::error::{FinopsError, FinopsResult};
use crate::models::{
    CreateWorkspace, JobRun, Recommendation, Workspace, WorkspaceStatus,
};
use crate::repository::FinopsRepository;

/// Thin business-logic layer over `FinopsRepository`: validation plus the
/// read/write operations the CLI status surface and the job runner need.
/// The job runner talks to the repository directly for the persistence
/// steps of its pipeline; this service exists for the surfaces that
/// sit above a single job run.
pub struct FinopsService<R: FinopsRepository> {
    repository: R,
}

impl<R: FinopsRepository> FinopsService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub async fn create_workspace(&self, input: CreateWorkspace) -> FinopsResult<Workspace> {
        input
            .validate()
            .map_err(|e| FinopsError::Internal(e.to_string()))?;

        let workspace = self.repository.create_workspace(input).await?;
        tracing::info!(workspace_id = %workspace.id, "Created workspace");
        Ok(workspace)
    }

    pub async fn get_workspace(&self, id: Uuid) -> FinopsResult<Workspace> {
        self.repository
            .get_workspace(id)
            .await?
            .ok_or(FinopsError::WorkspaceNotFound(id))
    }

    pub async fn list_workspaces(&self) -> FinopsResult<Vec<Workspace>> {
        self.repository.list_workspaces().await
    }

    pub async fn set_workspace_status(
        &self,
        id: Uuid,
        status: WorkspaceStatus,
    ) -> FinopsResult<()> {
        self.repository.set_workspace_status(id, status).await?;
        tracing::info!(workspace_id = %id, status = %status, "Workspace status updated");
        Ok(())
    }

    pub async fn latest_job_run(&self, workspace_id: Uuid) -> FinopsResult<Option<JobRun>> {
        self.repository.latest_job_run(workspace_id).await
    }

    pub async fn list_recommendations(&self, workspace_id: Uuid) -> FinopsResult<Vec<Recommendation>> {
        self.repository.list_recommendations(workspace_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobRunStatus;
    use crate::repository::MockFinopsRepository;
    use chrono::Utc;

    fn sample_workspace(id: Uuid) -> Workspace {
        Workspace {
            id,
            name: "prod".into(),
            role_arn: "arn:aws:iam::123456789012:role/finops".into(),
            aws_account_id: "123456789012".into(),
            status: WorkspaceStatus::Pending,
            user_id: Uuid::now_v7(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn get_workspace_not_found_maps_to_typed_error() {
        let id = Uuid::now_v7();
        let mut mock = MockFinopsRepository::new();
        mock.expect_get_workspace()
            .withf(move |arg| *arg == id)
            .returning(|_| Box::pin(async { Ok(None) }));

        let service = FinopsService::new(mock);
        let result = service.get_workspace(id).await;
        assert!(matches!(result, Err(FinopsError::WorkspaceNotFound(_))));
    }

    #[tokio::test]
    async fn get_workspace_returns_found_workspace() {
        let id = Uuid::now_v7();
        let workspace = sample_workspace(id);
        let mut mock = MockFinopsRepository::new();
        mock.expect_get_workspace()
            .returning(move |_| Box::pin(async move { Ok(Some(sample_workspace(id))) }));
        let _ = workspace;

        let service = FinopsService::new(mock);
        let result = service.get_workspace(id).await.unwrap();
        assert_eq!(result.id, id);
    }

    #[tokio::test]
    async fn create_workspace_rejects_invalid_input() {
        let mock = MockFinopsRepository::new();
        let service = FinopsService::new(mock);

        let input = CreateWorkspace {
            name: "".into(),
            role_arn: "arn:aws:iam::123456789012:role/finops".into(),
            aws_account_id: "123456789012".into(),
            user_id: Uuid::now_v7(),
        };

        let result = service.create_workspace(input).await;
        assert!(matches!(result, Err(FinopsError::Internal(_))));
    }

    #[tokio::test]
    async fn latest_job_run_passes_through_none() {
        let workspace_id = Uuid::now_v7();
        let mut mock = MockFinopsRepository::new();
        mock.expect_latest_job_run()
            .returning(|_| Box::pin(async { Ok(None) }));

        let service = FinopsService::new(mock);
        let result = service.latest_job_run(workspace_id).await.unwrap();
        assert!(result.is_none());
        let _unused: Option<JobRunStatus> = None;
    }
}
