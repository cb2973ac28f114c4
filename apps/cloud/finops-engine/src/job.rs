//! Per-workspace job lifecycle: `process_workspace` opens a [`JobRun`],
//! runs the inventory sync and the analysis path, and records completion
//! or failure. Mirrors the teacher's `PriceCollector::collect` shape —
//! load inputs, fan out collection, persist, summarize — but splits "fan
//! out collection" into two independent paths: a best-effort inventory
//! sweep across the service collectors, and a fatal-on-failure analysis
//! pass against the cloud client abstraction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domain_finops::analyzers;
use domain_finops::cost;
use domain_finops::descriptors::{Ec2Instance, EbsVolume, RdsInstance, S3Bucket};
use domain_finops::models::{
    RecommendationUpsert, ResourceRecord, STALE_RESOURCE_AFTER_SECS, WorkspaceStatus,
};
use domain_finops::repository::FinopsRepository;
use uuid::Uuid;

use crate::cloud_client::CloudClient;
use crate::collectors::{self, CollectorContext};
use crate::error::{EngineError, EngineResult};

/// Outcome of one `process_workspace` call, surfaced to the scheduler for
/// logging. Not persisted itself — the JobRun row is the durable record.
pub struct JobOutcome {
    pub workspace_id: Uuid,
    pub recommendations_found: i32,
    pub collector_errors: Vec<String>,
}

/// Builds the `CloudClient` an analysis path runs against: a deterministic
/// mock in test/mock mode, or a role-scoped live client. Never shared across
/// workspaces — each call returns a freshly constructed client.
pub trait CloudClientFactory: Send + Sync {
    fn build(&self, role_arn: &str, region: &str) -> BoxCloudClientFuture;
}

pub type BoxCloudClientFuture =
    std::pin::Pin<Box<dyn std::future::Future<Output = Arc<dyn CloudClient>> + Send>>;

/// Runs the full pipeline against one workspace: load, sync inventory,
/// analyze, record.
///
/// Loading the workspace (and returning silently if it's absent) happens
/// before any JobRun is written — an unknown workspace id leaves no trace.
pub async fn process_workspace<R: FinopsRepository>(
    repository: &R,
    client_factory: &dyn CloudClientFactory,
    region: &str,
    workspace_id: Uuid,
) -> EngineResult<Option<JobOutcome>> {
    let Some(workspace) = repository.get_workspace(workspace_id).await? else {
        tracing::warn!(target: "engine", %workspace_id, "workspace not found, skipping");
        return Ok(None);
    };

    let started_at = Utc::now();
    let job_run = repository.start_job_run(workspace.id, started_at).await?;

    match run_pipeline(repository, client_factory, region, &workspace.role_arn, workspace.id).await
    {
        Ok(outcome) => {
            repository
                .set_workspace_status(workspace.id, WorkspaceStatus::Connected)
                .await?;
            let completed_at = Utc::now();
            repository
                .complete_job_run(job_run.id, outcome.recommendations_found, completed_at)
                .await?;
            let duration_secs = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;
            observability::FinopsMetrics::record_job_run("completed", duration_secs);
            tracing::info!(
                target: "engine",
                workspace_id = %workspace.id,
                recommendations = outcome.recommendations_found,
                errors = outcome.collector_errors.len(),
                "job run completed"
            );
            Ok(Some(outcome))
        }
        Err(err) => {
            let completed_at = Utc::now();
            repository
                .fail_job_run(job_run.id, err.to_string(), completed_at)
                .await?;
            let duration_secs = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;
            observability::FinopsMetrics::record_job_run("failed", duration_secs);
            tracing::error!(target: "engine", workspace_id = %workspace.id, error = %err, "job run failed");
            Ok(None)
        }
    }
}

/// Inventory sync (best-effort) then the analysis path (fatal on
/// assume-role / analyzer failure) — anything escaping this function fails
/// the whole job.
async fn run_pipeline<R: FinopsRepository>(
    repository: &R,
    client_factory: &dyn CloudClientFactory,
    region: &str,
    role_arn: &str,
    workspace_id: Uuid,
) -> EngineResult<JobOutcome> {
    let mut collector_errors = Vec::new();

    // Inventory sync. A top-level failure here is logged and does not
    // abort the job — only the analysis path's failures are fatal.
    match sync_inventory(repository, role_arn, region, workspace_id).await {
        Ok(errors) => collector_errors = errors,
        Err(err) => {
            tracing::warn!(target: "resource-sync", %workspace_id, error = %err, "inventory sync failed, continuing to analysis");
        }
    }

    // Analysis path.
    let client = client_factory.build(role_arn, region).await;
    let now = Utc::now();
    let analysis = analyze_workspace(client.as_ref(), now).await?;

    // Per-resource estimated cost, patched onto the inventory rows this
    // same resource was already collected under (patch, not replace).
    for instance in &analysis.ec2 {
        let cost = cost::ec2_monthly_cost(&instance.instance_type, &instance.state);
        repository
            .patch_resource_cost_and_state(workspace_id, &instance.instance_id, Some(cost), None, now)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!(target: "resource-sync", resource_id = %instance.instance_id, error = %err, "cost patch failed");
            });
    }
    for volume in &analysis.ebs {
        let cost = cost::ebs_monthly_cost(&volume.volume_type, volume.size_gib);
        repository
            .patch_resource_cost_and_state(workspace_id, &volume.volume_id, Some(cost), None, now)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!(target: "resource-sync", resource_id = %volume.volume_id, error = %err, "cost patch failed");
            });
    }
    for bucket in &analysis.s3 {
        let cost = cost::s3_monthly_cost(&bucket.storage_class, bucket.size_bytes);
        repository
            .patch_resource_cost_and_state(workspace_id, &bucket.bucket_name, Some(cost), None, now)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!(target: "resource-sync", resource_id = %bucket.bucket_name, error = %err, "cost patch failed");
            });
    }
    for instance in &analysis.rds {
        let cost = cost::rds_monthly_cost(&instance.instance_class, &instance.status);
        repository
            .patch_resource_cost_and_state(workspace_id, &instance.instance_id, Some(cost), None, now)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!(target: "resource-sync", resource_id = %instance.instance_id, error = %err, "cost patch failed");
            });
    }

    let mut recommendations_found = 0;
    for upsert in analysis.recommendations {
        match repository.upsert_recommendation(workspace_id, upsert, now).await {
            Ok(_) => recommendations_found += 1,
            Err(err) => {
                tracing::warn!(target: "engine", %workspace_id, error = %err, "recommendation upsert failed");
            }
        }
    }

    report_recommendation_metrics(repository, workspace_id).await;

    Ok(JobOutcome {
        workspace_id,
        recommendations_found,
        collector_errors,
    })
}

/// Result of running the analysis path's eight list calls and analyzers
/// against one `CloudClient`. Split out of `run_pipeline` so the analysis
/// logic is exercisable in isolation against the deterministic mock client,
/// without a repository or a real cross-account role in the loop.
pub struct AnalysisOutput {
    pub ec2: Vec<Ec2Instance>,
    pub ebs: Vec<EbsVolume>,
    pub s3: Vec<S3Bucket>,
    pub rds: Vec<RdsInstance>,
    pub recommendations: Vec<RecommendationUpsert>,
}

/// Parallel fetch of EC2/EBS/S3/RDS/Lambda/ELB/NAT/EIP, then CPU metrics
/// for the EC2 ids just fetched, then all eight analyzers. Any list-call or
/// metric-fetch failure is fatal — analyzer failures are not expected,
/// since the analyzers are pure functions over already-fetched data.
pub async fn analyze_workspace(
    client: &dyn CloudClient,
    now: DateTime<Utc>,
) -> EngineResult<AnalysisOutput> {
    let (ec2, ebs, s3, rds, lambda, elb, nat, eip) = tokio::try_join!(
        client.list_ec2_instances(),
        client.list_ebs_volumes(),
        client.list_s3_buckets(),
        client.list_rds_instances(),
        client.list_lambda_functions(),
        client.list_load_balancers(),
        client.list_nat_gateways(),
        client.list_elastic_ips(),
    )
    .map_err(EngineError::from)?;

    let ec2_ids: Vec<String> = ec2.iter().map(|i| i.instance_id.clone()).collect();
    let cpu_metrics = client
        .get_ec2_cpu_metrics(&ec2_ids)
        .await
        .map_err(EngineError::from)?;

    let mut recommendations: Vec<RecommendationUpsert> = Vec::new();
    recommendations.extend(analyzers::analyze_ec2_downsize(&ec2, &cpu_metrics));
    recommendations.extend(analyzers::analyze_ebs_orphan(&ebs, now));
    recommendations.extend(analyzers::analyze_s3_lifecycle(&s3));
    recommendations.extend(analyzers::analyze_rds_downsize(&rds));
    recommendations.extend(analyzers::analyze_lambda(&lambda));
    recommendations.extend(analyzers::analyze_elb(&elb));
    recommendations.extend(analyzers::analyze_eip_unassociated(&eip));
    recommendations.extend(analyzers::analyze_nat_gateway_idle(&nat));

    Ok(AnalysisOutput {
        ec2,
        ebs,
        s3,
        rds,
        recommendations,
    })
}

/// Re-derives the `finops_recommendations_total` and
/// `finops_estimated_monthly_savings_usd` gauges from the workspace's
/// current recommendation set. Best-effort — a failure here never fails
/// the job.
async fn report_recommendation_metrics<R: FinopsRepository>(repository: &R, workspace_id: Uuid) {
    let recommendations = match repository.list_recommendations(workspace_id).await {
        Ok(recommendations) => recommendations,
        Err(err) => {
            tracing::warn!(target: "engine", %workspace_id, error = %err, "failed to load recommendations for metrics");
            return;
        }
    };

    let mut counts: std::collections::HashMap<(&'static str, String), usize> = Default::default();
    let mut total_savings = 0.0;
    for recommendation in &recommendations {
        *counts
            .entry((
                recommendation.recommendation_type.as_code(),
                recommendation.status.to_string(),
            ))
            .or_insert(0) += 1;
        total_savings += recommendation.estimated_monthly_savings;
    }
    for ((recommendation_type, status), count) in counts {
        observability::FinopsMetrics::set_recommendations_total(recommendation_type, &status, count);
    }
    observability::FinopsMetrics::set_estimated_monthly_savings(total_savings);
}

/// The sixteen-collector sweep plus resource upserts and the stale-resource
/// sweep. Returns the collector-level error strings; only a role-assumption
/// failure reaching this function's caller aborts the inventory step early.
async fn sync_inventory<R: FinopsRepository>(
    repository: &R,
    role_arn: &str,
    region: &str,
    workspace_id: Uuid,
) -> EngineResult<Vec<String>> {
    let ctx = CollectorContext::assume_role(role_arn, region).await?;
    let sweep = collectors::sweep(&ctx).await;

    let mut counts_by_service: std::collections::HashMap<String, usize> = Default::default();
    let now = Utc::now();
    for record in sweep.records {
        *counts_by_service.entry(record.service.clone()).or_insert(0) += 1;
        if let Err(err) = upsert_inventory_record(repository, workspace_id, record, now).await {
            tracing::warn!(target: "resource-sync", %workspace_id, error = %err, "resource upsert failed");
        }
    }
    for (service, count) in counts_by_service {
        observability::FinopsMetrics::set_resources_total(&service, count);
    }

    let stale_before = now - chrono::Duration::seconds(STALE_RESOURCE_AFTER_SECS);
    match repository.sweep_stale_resources(workspace_id, stale_before).await {
        Ok(touched) if touched > 0 => {
            tracing::info!(target: "resource-sync", %workspace_id, touched, "soft-deleted stale resources");
        }
        Ok(_) => {}
        Err(err) => {
            tracing::warn!(target: "resource-sync", %workspace_id, error = %err, "stale sweep failed");
        }
    }

    Ok(sweep.errors)
}

async fn upsert_inventory_record<R: FinopsRepository>(
    repository: &R,
    workspace_id: Uuid,
    record: ResourceRecord,
    now: chrono::DateTime<Utc>,
) -> EngineResult<()> {
    repository.upsert_resource(workspace_id, record, now).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use domain_finops::error::FinopsResult;
    use domain_finops::models::{CreateWorkspace, Resource, Workspace};

    /// Hand-rolled `FinopsRepository` stub — `domain_finops`'s
    /// `MockFinopsRepository` only exists under that crate's own `cfg(test)`
    /// build, so a downstream crate's tests need their own double. Only the
    /// methods the "missing workspace" path exercises are implemented
    /// meaningfully.
    struct NoWorkspaceRepository;

    #[async_trait]
    impl FinopsRepository for NoWorkspaceRepository {
        async fn get_workspace(&self, _id: Uuid) -> FinopsResult<Option<Workspace>> {
            Ok(None)
        }
        async fn list_workspaces(&self) -> FinopsResult<Vec<Workspace>> {
            Ok(vec![])
        }
        async fn create_workspace(&self, _input: CreateWorkspace) -> FinopsResult<Workspace> {
            unreachable!("not exercised by this test")
        }
        async fn set_workspace_status(
            &self,
            _id: Uuid,
            _status: WorkspaceStatus,
        ) -> FinopsResult<()> {
            unreachable!("not exercised by this test")
        }
        async fn start_job_run(
            &self,
            _workspace_id: Uuid,
            _started_at: chrono::DateTime<Utc>,
        ) -> FinopsResult<domain_finops::models::JobRun> {
            panic!("start_job_run must not be called for a missing workspace");
        }
        async fn complete_job_run(
            &self,
            _id: Uuid,
            _recommendations_found: i32,
            _completed_at: chrono::DateTime<Utc>,
        ) -> FinopsResult<()> {
            unreachable!("not exercised by this test")
        }
        async fn fail_job_run(
            &self,
            _id: Uuid,
            _error_message: String,
            _completed_at: chrono::DateTime<Utc>,
        ) -> FinopsResult<()> {
            unreachable!("not exercised by this test")
        }
        async fn latest_job_run(
            &self,
            _workspace_id: Uuid,
        ) -> FinopsResult<Option<domain_finops::models::JobRun>> {
            Ok(None)
        }
        async fn upsert_resource(
            &self,
            _workspace_id: Uuid,
            _record: ResourceRecord,
            _now: chrono::DateTime<Utc>,
        ) -> FinopsResult<Resource> {
            unreachable!("not exercised by this test")
        }
        async fn patch_resource_cost_and_state(
            &self,
            _workspace_id: Uuid,
            _resource_id: &str,
            _estimated_monthly_cost: Option<f64>,
            _state: Option<String>,
            _now: chrono::DateTime<Utc>,
        ) -> FinopsResult<()> {
            unreachable!("not exercised by this test")
        }
        async fn sweep_stale_resources(
            &self,
            _workspace_id: Uuid,
            _before: chrono::DateTime<Utc>,
        ) -> FinopsResult<u64> {
            unreachable!("not exercised by this test")
        }
        async fn list_resources(&self, _workspace_id: Uuid) -> FinopsResult<Vec<Resource>> {
            Ok(vec![])
        }
        async fn upsert_recommendation(
            &self,
            _workspace_id: Uuid,
            _upsert: RecommendationUpsert,
            _now: chrono::DateTime<Utc>,
        ) -> FinopsResult<domain_finops::models::Recommendation> {
            unreachable!("not exercised by this test")
        }
        async fn list_recommendations(
            &self,
            _workspace_id: Uuid,
        ) -> FinopsResult<Vec<domain_finops::models::Recommendation>> {
            Ok(vec![])
        }
    }

    struct UnusedClientFactory;

    impl CloudClientFactory for UnusedClientFactory {
        fn build(&self, _role_arn: &str, _region: &str) -> BoxCloudClientFuture {
            panic!("a missing workspace must never reach client construction")
        }
    }

    #[tokio::test]
    async fn missing_workspace_writes_no_job_run() {
        let id = Uuid::now_v7();
        let outcome = process_workspace(&NoWorkspaceRepository, &UnusedClientFactory, "us-east-1", id)
            .await
            .unwrap();
        assert!(outcome.is_none());
    }

    use crate::cloud_client::mock::MockCloudClient;
    use domain_finops::models::RecommendationType;

    /// The fixture EC2 instance `i-0a1b2c3d4e5f00004` is a running
    /// t3.medium at 8% average CPU over 14 days — the spec's downsize
    /// scenario — so it must surface an EC2_DOWN_SIZE recommendation.
    #[tokio::test]
    async fn analyze_workspace_flags_the_idle_t3_medium_for_downsize() {
        let now = Utc::now();
        let client = MockCloudClient::new(1, now);
        let analysis = analyze_workspace(&client, now).await.unwrap();

        let found = analysis.recommendations.iter().any(|r| {
            r.resource_id == "i-0a1b2c3d4e5f00004"
                && r.recommendation_type == RecommendationType::Ec2DownSize
        });
        assert!(found, "expected an EC2_DOWN_SIZE recommendation for the idle t3.medium");
    }

    /// `vol-0a1b2c3d4e5f00002` is an available (unattached) gp2 volume
    /// created 30 days before `now`, well past the orphan threshold.
    #[tokio::test]
    async fn analyze_workspace_flags_the_unattached_volume_as_orphaned() {
        let now = Utc::now();
        let client = MockCloudClient::new(1, now);
        let analysis = analyze_workspace(&client, now).await.unwrap();

        let found = analysis.recommendations.iter().any(|r| {
            r.resource_id == "vol-0a1b2c3d4e5f00002"
                && r.recommendation_type == RecommendationType::EbsOrphan
        });
        assert!(found, "expected an EBS_ORPHAN recommendation for the unattached volume");
    }

    /// `company-logs-archive` is a STANDARD-class bucket untouched for 120
    /// days — past the lifecycle threshold — and should recommend moving
    /// to a cheaper storage class with a positive estimated saving.
    #[tokio::test]
    async fn analyze_workspace_flags_the_stale_log_bucket_for_lifecycle() {
        let now = Utc::now();
        let client = MockCloudClient::new(1, now);
        let analysis = analyze_workspace(&client, now).await.unwrap();

        let rec = analysis
            .recommendations
            .iter()
            .find(|r| {
                r.resource_id == "company-logs-archive"
                    && r.recommendation_type == RecommendationType::S3Lifecycle
            })
            .expect("expected an S3_LIFECYCLE recommendation for the stale archive bucket");
        assert!(rec.estimated_monthly_savings > 0.0);
    }

    /// `db-analytics-replica` idles at 3% CPU with a single connection —
    /// the RDS downsize scenario.
    #[tokio::test]
    async fn analyze_workspace_flags_the_idle_rds_replica_for_downsize() {
        let now = Utc::now();
        let client = MockCloudClient::new(1, now);
        let analysis = analyze_workspace(&client, now).await.unwrap();

        let found = analysis.recommendations.iter().any(|r| {
            r.resource_id == "db-analytics-replica"
                && r.recommendation_type == RecommendationType::RdsDownSize
        });
        assert!(found, "expected an RDS_DOWN_SIZE recommendation for the idle replica");
    }

    /// `legacy-batch-job` has zero invocations and zero duration — the
    /// unused-Lambda scenario, not the oversized-memory one.
    #[tokio::test]
    async fn analyze_workspace_flags_the_unused_lambda() {
        let now = Utc::now();
        let client = MockCloudClient::new(1, now);
        let analysis = analyze_workspace(&client, now).await.unwrap();

        let found = analysis.recommendations.iter().any(|r| {
            r.resource_id == "legacy-batch-job"
                && r.recommendation_type == RecommendationType::LambdaUnused
        });
        assert!(found, "expected a LAMBDA_UNUSED recommendation for the zero-invocation function");
    }

    /// `staging-alb` has zero registered targets (high confidence);
    /// `internal-nlb` has targets but zero traffic (medium confidence) —
    /// both load balancer scenarios should be present.
    #[tokio::test]
    async fn analyze_workspace_flags_both_elb_waste_scenarios() {
        let now = Utc::now();
        let client = MockCloudClient::new(1, now);
        let analysis = analyze_workspace(&client, now).await.unwrap();

        let no_targets = analysis.recommendations.iter().find(|r| {
            r.resource_id == "staging-alb"
                && r.recommendation_type == RecommendationType::ElbNoTargets
        });
        assert!(
            no_targets.is_some(),
            "expected an ELB_NO_TARGETS recommendation for the targetless ALB"
        );

        let no_traffic = analysis.recommendations.iter().find(|r| {
            r.resource_id == "internal-nlb"
                && r.recommendation_type == RecommendationType::ElbNoTraffic
        });
        assert!(
            no_traffic.is_some(),
            "expected an ELB_NO_TRAFFIC recommendation for the trafficless NLB"
        );
    }

    /// `eipalloc-0a1b2c3d4e5f00001` has no association id — unattached.
    #[tokio::test]
    async fn analyze_workspace_flags_the_unassociated_elastic_ip() {
        let now = Utc::now();
        let client = MockCloudClient::new(1, now);
        let analysis = analyze_workspace(&client, now).await.unwrap();

        let found = analysis.recommendations.iter().any(|r| {
            r.resource_id == "eipalloc-0a1b2c3d4e5f00001"
                && r.recommendation_type == RecommendationType::EipUnassociated
        });
        assert!(found, "expected an EIP_UNASSOCIATED recommendation for the unattached address");
    }

    /// `nat-0a1b2c3d4e5f00001` processes far less traffic per day than
    /// `nat-0a1b2c3d4e5f00002` — only the low-traffic gateway should flag.
    #[tokio::test]
    async fn analyze_workspace_flags_only_the_idle_nat_gateway() {
        let now = Utc::now();
        let client = MockCloudClient::new(1, now);
        let analysis = analyze_workspace(&client, now).await.unwrap();

        let idle_flagged = analysis.recommendations.iter().any(|r| {
            r.resource_id == "nat-0a1b2c3d4e5f00001"
                && r.recommendation_type == RecommendationType::NatGwIdle
        });
        let busy_flagged = analysis.recommendations.iter().any(|r| {
            r.resource_id == "nat-0a1b2c3d4e5f00002"
                && r.recommendation_type == RecommendationType::NatGwIdle
        });
        assert!(idle_flagged, "expected the low-traffic NAT gateway to flag as idle");
        assert!(!busy_flagged, "the high-traffic NAT gateway must not flag as idle");
    }

    /// Every recommendation's estimated saving is non-negative, and
    /// running the analysis twice against the same deterministic mock
    /// client yields the same set of (resource, type) pairs.
    #[tokio::test]
    async fn analyze_workspace_is_idempotent_and_never_suggests_negative_savings() {
        let now = Utc::now();
        let client = MockCloudClient::new(1, now);

        let first = analyze_workspace(&client, now).await.unwrap();
        let second = analyze_workspace(&client, now).await.unwrap();

        assert!(first
            .recommendations
            .iter()
            .all(|r| r.estimated_monthly_savings >= 0.0));

        let mut first_keys: Vec<(String, &'static str)> = first
            .recommendations
            .iter()
            .map(|r| (r.resource_id.clone(), r.recommendation_type.as_code()))
            .collect();
        let mut second_keys: Vec<(String, &'static str)> = second
            .recommendations
            .iter()
            .map(|r| (r.resource_id.clone(), r.recommendation_type.as_code()))
            .collect();
        first_keys.sort();
        second_keys.sort();
        assert_eq!(first_keys, second_keys);
    }
}
