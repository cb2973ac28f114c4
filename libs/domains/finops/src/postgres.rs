use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::{job_runs, recommendations, resources, workspaces};
use crate::error::{FinopsError, FinopsResult};
use crate::models::{
    CreateWorkspace, JobRun, JobRunStatus, Recommendation, RecommendationStatus,
    RecommendationUpsert, Resource, ResourceRecord, Workspace, WorkspaceStatus,
};
use crate::repository::FinopsRepository;

/// PostgreSQL implementation of `FinopsRepository`.
#[derive(Clone)]
pub struct PgFinopsRepository {
    db: DatabaseConnection,
}

impl PgFinopsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FinopsRepository for PgFinopsRepository {
    async fn get_workspace(&self, id: Uuid) -> FinopsResult<Option<Workspace>> {
        let model = workspaces::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Into::into);
        Ok(model)
    }

    async fn list_workspaces(&self) -> FinopsResult<Vec<Workspace>> {
        let models = workspaces::Entity::find()
            .order_by_asc(workspaces::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn create_workspace(&self, input: CreateWorkspace) -> FinopsResult<Workspace> {
        let active_model: workspaces::ActiveModel = input.into();
        let model = active_model.insert(&self.db).await?;
        Ok(model.into())
    }

    async fn set_workspace_status(&self, id: Uuid, status: WorkspaceStatus) -> FinopsResult<()> {
        let existing = workspaces::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(FinopsError::WorkspaceNotFound(id))?;

        let mut model: workspaces::ActiveModel = existing.into();
        model.status = Set(status.to_string());
        model.updated_at = Set(Utc::now().into());
        model.update(&self.db).await?;
        Ok(())
    }

    async fn start_job_run(
        &self,
        workspace_id: Uuid,
        started_at: DateTime<Utc>,
    ) -> FinopsResult<JobRun> {
        let active_model = job_runs::ActiveModel {
            id: Set(Uuid::now_v7()),
            workspace_id: Set(workspace_id),
            status: Set(JobRunStatus::Running.to_string()),
            recommendations_found: Set(0),
            error_message: Set(None),
            started_at: Set(started_at.into()),
            completed_at: Set(None),
        };
        let model = active_model.insert(&self.db).await?;
        Ok(model.into())
    }

    async fn complete_job_run(
        &self,
        id: Uuid,
        recommendations_found: i32,
        completed_at: DateTime<Utc>,
    ) -> FinopsResult<()> {
        let existing = job_runs::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(FinopsError::JobRunNotFound(id))?;

        let mut model: job_runs::ActiveModel = existing.into();
        model.status = Set(JobRunStatus::Completed.to_string());
        model.recommendations_found = Set(recommendations_found);
        model.completed_at = Set(Some(completed_at.into()));
        model.update(&self.db).await?;
        Ok(())
    }

    async fn fail_job_run(
        &self,
        id: Uuid,
        error_message: String,
        completed_at: DateTime<Utc>,
    ) -> FinopsResult<()> {
        let existing = job_runs::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(FinopsError::JobRunNotFound(id))?;

        let mut model: job_runs::ActiveModel = existing.into();
        model.status = Set(JobRunStatus::Failed.to_string());
        model.error_message = Set(Some(error_message));
        model.completed_at = Set(Some(completed_at.into()));
        model.update(&self.db).await?;
        Ok(())
    }

    async fn latest_job_run(&self, workspace_id: Uuid) -> FinopsResult<Option<JobRun>> {
        let model = job_runs::Entity::find()
            .filter(job_runs::Column::WorkspaceId.eq(workspace_id))
            .order_by_desc(job_runs::Column::StartedAt)
            .one(&self.db)
            .await?
            .map(Into::into);
        Ok(model)
    }

    async fn upsert_resource(
        &self,
        workspace_id: Uuid,
        record: ResourceRecord,
        now: DateTime<Utc>,
    ) -> FinopsResult<Resource> {
        let existing = resources::Entity::find()
            .filter(resources::Column::WorkspaceId.eq(workspace_id))
            .filter(resources::Column::ResourceId.eq(record.resource_id.clone()))
            .one(&self.db)
            .await?;

        let tags_json = serde_json::to_value(&record.tags).unwrap_or_default();

        let model = match existing {
            Some(existing) => {
                let mut active: resources::ActiveModel = existing.into();
                active.arn = Set(record.arn);
                active.service = Set(record.service);
                active.resource_type = Set(record.resource_type);
                active.name = Set(record.name);
                active.tags = Set(tags_json);
                active.state = Set(record.state);
                if record.estimated_monthly_cost.is_some() {
                    active.estimated_monthly_cost = Set(record.estimated_monthly_cost);
                }
                active.metadata = Set(record.metadata);
                active.last_seen_at = Set(now.into());
                active.updated_at = Set(now.into());
                active.update(&self.db).await?
            }
            None => {
                let active = resources::ActiveModel {
                    id: Set(Uuid::now_v7()),
                    workspace_id: Set(workspace_id),
                    resource_id: Set(record.resource_id),
                    arn: Set(record.arn),
                    service: Set(record.service),
                    resource_type: Set(record.resource_type),
                    name: Set(record.name),
                    tags: Set(tags_json),
                    state: Set(record.state),
                    estimated_monthly_cost: Set(record.estimated_monthly_cost),
                    metadata: Set(record.metadata),
                    last_seen_at: Set(now.into()),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                };
                active.insert(&self.db).await?
            }
        };

        Ok(model.into())
    }

    async fn patch_resource_cost_and_state(
        &self,
        workspace_id: Uuid,
        resource_id: &str,
        estimated_monthly_cost: Option<f64>,
        state: Option<String>,
        now: DateTime<Utc>,
    ) -> FinopsResult<()> {
        let existing = resources::Entity::find()
            .filter(resources::Column::WorkspaceId.eq(workspace_id))
            .filter(resources::Column::ResourceId.eq(resource_id))
            .one(&self.db)
            .await?;

        let Some(existing) = existing else {
            return Ok(());
        };

        let mut active: resources::ActiveModel = existing.into();
        if estimated_monthly_cost.is_some() {
            active.estimated_monthly_cost = Set(estimated_monthly_cost);
        }
        if state.is_some() {
            active.state = Set(state);
        }
        active.updated_at = Set(now.into());
        active.update(&self.db).await?;
        Ok(())
    }

    async fn sweep_stale_resources(
        &self,
        workspace_id: Uuid,
        before: DateTime<Utc>,
    ) -> FinopsResult<u64> {
        let stale = resources::Entity::find()
            .filter(resources::Column::WorkspaceId.eq(workspace_id))
            .filter(resources::Column::LastSeenAt.lt(before))
            .filter(resources::Column::State.ne(crate::models::NOT_FOUND_STATE))
            .all(&self.db)
            .await?;

        let touched = stale.len() as u64;
        for model in stale {
            let mut active: resources::ActiveModel = model.into();
            active.state = Set(Some(crate::models::NOT_FOUND_STATE.to_string()));
            active.updated_at = Set(Utc::now().into());
            active.update(&self.db).await?;
        }

        Ok(touched)
    }

    async fn list_resources(&self, workspace_id: Uuid) -> FinopsResult<Vec<Resource>> {
        let models = resources::Entity::find()
            .filter(resources::Column::WorkspaceId.eq(workspace_id))
            .order_by_asc(resources::Column::ResourceId)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn upsert_recommendation(
        &self,
        workspace_id: Uuid,
        upsert: RecommendationUpsert,
        now: DateTime<Utc>,
    ) -> FinopsResult<Recommendation> {
        let existing = recommendations::Entity::find()
            .filter(recommendations::Column::WorkspaceId.eq(workspace_id))
            .filter(recommendations::Column::ResourceId.eq(upsert.resource_id.clone()))
            .filter(recommendations::Column::RecommendationType.eq(upsert.recommendation_type.to_string()))
            .one(&self.db)
            .await?;

        let model = match existing {
            Some(existing) => {
                // Status is never touched here: a user's acknowledge/dismiss
                // decision survives a rerun that re-detects the same issue.
                let mut active: recommendations::ActiveModel = existing.into();
                active.description = Set(upsert.description);
                active.estimated_monthly_savings = Set(upsert.estimated_monthly_savings);
                active.confidence = Set(upsert.confidence.to_string());
                active.metadata = Set(upsert.metadata);
                active.updated_at = Set(now.into());
                active.update(&self.db).await?
            }
            None => {
                let active = recommendations::ActiveModel {
                    id: Set(Uuid::now_v7()),
                    workspace_id: Set(workspace_id),
                    resource_id: Set(upsert.resource_id),
                    recommendation_type: Set(upsert.recommendation_type.to_string()),
                    description: Set(upsert.description),
                    estimated_monthly_savings: Set(upsert.estimated_monthly_savings),
                    confidence: Set(upsert.confidence.to_string()),
                    status: Set(RecommendationStatus::New.to_string()),
                    metadata: Set(upsert.metadata),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                };
                active.insert(&self.db).await?
            }
        };

        Ok(model.into())
    }

    async fn list_recommendations(&self, workspace_id: Uuid) -> FinopsResult<Vec<Recommendation>> {
        let models = recommendations::Entity::find()
            .filter(recommendations::Column::WorkspaceId.eq(workspace_id))
            .order_by_desc(recommendations::Column::EstimatedMonthlySavings)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}
