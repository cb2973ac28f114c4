//! Cron-driven tick loop. Generalizes the teacher's
//! `PriceCollector::run_scheduled` (`apps/cloud/pricing-collector`) from a
//! single collection run to a sequential sweep over every workspace.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use domain_finops::repository::FinopsRepository;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::job::{self, CloudClientFactory};

/// Releases the singleton guard on every exit path, including an early
/// `return` or a panic unwinding through the tick closure.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Runs one tick: skip if a previous tick is still in flight, otherwise
/// iterate every workspace sequentially so cloud API pressure stays bounded
/// to one workspace's worth of concurrency at a time.
async fn tick<R: FinopsRepository>(
    repository: &R,
    client_factory: &dyn CloudClientFactory,
    region: &str,
    running: &Arc<AtomicBool>,
) {
    if running.swap(true, Ordering::SeqCst) {
        info!(target: "scheduler", "tick skipped, previous run still in progress");
        return;
    }
    let _guard = RunningGuard(running.clone());

    let workspaces = match repository.list_workspaces().await {
        Ok(workspaces) => workspaces,
        Err(err) => {
            error!(target: "scheduler", error = %err, "failed to list workspaces, skipping tick");
            return;
        }
    };

    info!(target: "scheduler", workspace_count = workspaces.len(), "tick started");
    for workspace in workspaces {
        match job::process_workspace(repository, client_factory, region, workspace.id).await {
            Ok(Some(outcome)) => {
                info!(
                    target: "scheduler",
                    workspace_id = %outcome.workspace_id,
                    recommendations = outcome.recommendations_found,
                    "workspace processed"
                );
            }
            Ok(None) => {
                warn!(target: "scheduler", workspace_id = %workspace.id, "workspace job did not complete");
            }
            Err(err) => {
                error!(target: "scheduler", workspace_id = %workspace.id, error = %err, "workspace job errored");
            }
        }
    }
    info!(target: "scheduler", "tick finished");
}

/// Starts the cron schedule and blocks forever. After a 5-second startup
/// delay an immediate tick runs once, then [`JobScheduler`] drives
/// subsequent ticks on `cron_expr`.
pub async fn run<R>(
    repository: Arc<R>,
    client_factory: Arc<dyn CloudClientFactory>,
    region: String,
    cron_expr: &str,
) -> eyre::Result<()>
where
    R: FinopsRepository + Send + Sync + 'static,
{
    info!(target: "scheduler", cron = cron_expr, "starting scheduler");

    let running = Arc::new(AtomicBool::new(false));

    tokio::time::sleep(Duration::from_secs(5)).await;
    tick(repository.as_ref(), client_factory.as_ref(), &region, &running).await;

    let sched = JobScheduler::new().await?;

    let job = Job::new_async(cron_expr, move |_uuid, _l| {
        let repository = repository.clone();
        let client_factory = client_factory.clone();
        let region = region.clone();
        let running = running.clone();
        Box::pin(async move {
            tick(repository.as_ref(), client_factory.as_ref(), &region, &running).await;
        })
    })?;

    sched.add(job).await?;
    sched.start().await?;

    info!(target: "scheduler", "scheduler started, waiting for ticks...");
    loop {
        tokio::time::sleep(Duration::from_secs(60)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use domain_finops::error::FinopsResult;
    use domain_finops::models::{
        CreateWorkspace, JobRun, Recommendation, RecommendationUpsert, Resource, ResourceRecord,
        Workspace, WorkspaceStatus,
    };
    use uuid::Uuid;

    /// Repository stub that reports zero workspaces; `tick` must still
    /// complete without panicking.
    struct EmptyRepository;

    #[async_trait]
    impl FinopsRepository for EmptyRepository {
        async fn get_workspace(&self, _id: Uuid) -> FinopsResult<Option<Workspace>> {
            Ok(None)
        }
        async fn list_workspaces(&self) -> FinopsResult<Vec<Workspace>> {
            Ok(vec![])
        }
        async fn create_workspace(&self, _input: CreateWorkspace) -> FinopsResult<Workspace> {
            unreachable!()
        }
        async fn set_workspace_status(&self, _id: Uuid, _status: WorkspaceStatus) -> FinopsResult<()> {
            unreachable!()
        }
        async fn start_job_run(
            &self,
            _workspace_id: Uuid,
            _started_at: chrono::DateTime<chrono::Utc>,
        ) -> FinopsResult<JobRun> {
            unreachable!()
        }
        async fn complete_job_run(
            &self,
            _id: Uuid,
            _recommendations_found: i32,
            _completed_at: chrono::DateTime<chrono::Utc>,
        ) -> FinopsResult<()> {
            unreachable!()
        }
        async fn fail_job_run(
            &self,
            _id: Uuid,
            _error_message: String,
            _completed_at: chrono::DateTime<chrono::Utc>,
        ) -> FinopsResult<()> {
            unreachable!()
        }
        async fn latest_job_run(&self, _workspace_id: Uuid) -> FinopsResult<Option<JobRun>> {
            Ok(None)
        }
        async fn upsert_resource(
            &self,
            _workspace_id: Uuid,
            _record: ResourceRecord,
            _now: chrono::DateTime<chrono::Utc>,
        ) -> FinopsResult<Resource> {
            unreachable!()
        }
        async fn patch_resource_cost_and_state(
            &self,
            _workspace_id: Uuid,
            _resource_id: &str,
            _estimated_monthly_cost: Option<f64>,
            _state: Option<String>,
            _now: chrono::DateTime<chrono::Utc>,
        ) -> FinopsResult<()> {
            unreachable!()
        }
        async fn sweep_stale_resources(
            &self,
            _workspace_id: Uuid,
            _before: chrono::DateTime<chrono::Utc>,
        ) -> FinopsResult<u64> {
            unreachable!()
        }
        async fn list_resources(&self, _workspace_id: Uuid) -> FinopsResult<Vec<Resource>> {
            Ok(vec![])
        }
        async fn upsert_recommendation(
            &self,
            _workspace_id: Uuid,
            _upsert: RecommendationUpsert,
            _now: chrono::DateTime<chrono::Utc>,
        ) -> FinopsResult<Recommendation> {
            unreachable!()
        }
        async fn list_recommendations(&self, _workspace_id: Uuid) -> FinopsResult<Vec<Recommendation>> {
            Ok(vec![])
        }
    }

    struct PanicOnBuildFactory;

    impl CloudClientFactory for PanicOnBuildFactory {
        fn build(&self, _role_arn: &str, _region: &str) -> crate::job::BoxCloudClientFuture {
            panic!("no workspace should reach client construction")
        }
    }

    #[tokio::test]
    async fn tick_with_no_workspaces_completes_without_touching_the_client_factory() {
        let running = Arc::new(AtomicBool::new(false));
        tick(&EmptyRepository, &PanicOnBuildFactory, "us-east-1", &running).await;
        assert!(!running.load(Ordering::SeqCst), "guard must be released");
    }

    #[tokio::test]
    async fn concurrent_tick_is_skipped_while_one_is_running() {
        let running = Arc::new(AtomicBool::new(false));

        // Hold the flag as if a previous tick were still in flight.
        running.store(true, Ordering::SeqCst);
        tick(&EmptyRepository, &PanicOnBuildFactory, "us-east-1", &running).await;
        // tick() returned immediately without clearing the flag it didn't set.
        assert!(running.load(Ordering::SeqCst));

        running.store(false, Ordering::SeqCst);
    }
}
