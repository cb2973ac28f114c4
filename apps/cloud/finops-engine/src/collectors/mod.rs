//! The sixteen service collectors and their bounded-concurrency
//! dispatcher.
//!
//! Each collector is `&CollectorContext -> Result<Vec<ResourceRecord>, String>`;
//! a failure is a plain message, the dispatcher prefixes it with the
//! service name before appending it to the run's error list. Dispatch runs
//! in four discrete batches of four, each batch's `JoinSet` fully drained
//! before the next batch is spawned — a barrier between batches, the same
//! shape `stream-worker::process_jobs_concurrent` uses for bounded job
//! processing, rather than a single `futures::join_all` over all sixteen
//! at once.

mod autoscaling;
mod cloudformation;
mod cloudfront;
mod dynamodb;
mod ebs;
mod ec2;
mod elastic_beanstalk;
mod elb;
mod iam;
mod lambda;
mod route53;
mod s3;
mod sns;
mod sqs;
mod rds;
mod vpc;

use aws_config::BehaviorVersion;
use domain_finops::models::ResourceRecord;
use tokio::task::JoinSet;

use crate::error::EngineError;

/// Number of collectors dispatched per batch.
const BATCH_SIZE: usize = 4;

/// The authenticated AWS surface the sixteen collectors share. Built once
/// per workspace per job — collectors never re-assume the role
/// individually.
#[derive(Clone)]
pub struct CollectorContext {
    pub config: aws_config::SdkConfig,
}

impl CollectorContext {
    pub async fn assume_role(role_arn: &str, region: &str) -> Result<Self, EngineError> {
        let base = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;
        let sts = aws_sdk_sts::Client::new(&base);

        let assumed = sts
            .assume_role()
            .role_arn(role_arn)
            .role_session_name("finops-dashboard")
            .duration_seconds(3600)
            .send()
            .await
            .map_err(|err| EngineError::Scheduler(format!("assume role {role_arn}: {err}")))?;

        let creds = assumed.credentials().ok_or_else(|| {
            EngineError::Scheduler(format!("assume role {role_arn}: no credentials returned"))
        })?;

        let expiration: std::time::SystemTime = creds.expiration().clone().try_into().map_err(|_| {
            EngineError::Scheduler(format!("assume role {role_arn}: unrepresentable expiration"))
        })?;

        let credentials = aws_credential_types::Credentials::new(
            creds.access_key_id(),
            creds.secret_access_key(),
            Some(creds.session_token().to_string()),
            Some(expiration),
            "finops-assumed-role",
        );

        let config = aws_config::SdkConfig::builder()
            .region(aws_config::Region::new(region.to_string()))
            .credentials_provider(aws_credential_types::provider::SharedCredentialsProvider::new(
                credentials,
            ))
            .behavior_version(BehaviorVersion::latest())
            .build();

        Ok(Self { config })
    }
}

type CollectorFn =
    fn(
        CollectorContext,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<ResourceRecord>, String>> + Send>,
    >;

fn collectors() -> Vec<(&'static str, CollectorFn)> {
    vec![
        ("EC2", |ctx| Box::pin(ec2::collect(ctx))),
        ("EBS", |ctx| Box::pin(ebs::collect(ctx))),
        ("S3", |ctx| Box::pin(s3::collect(ctx))),
        ("RDS", |ctx| Box::pin(rds::collect(ctx))),
        ("Lambda", |ctx| Box::pin(lambda::collect(ctx))),
        ("ELB", |ctx| Box::pin(elb::collect(ctx))),
        ("CloudFront", |ctx| Box::pin(cloudfront::collect(ctx))),
        ("VPC", |ctx| Box::pin(vpc::collect(ctx))),
        ("AutoScaling", |ctx| Box::pin(autoscaling::collect(ctx))),
        ("ElasticBeanstalk", |ctx| {
            Box::pin(elastic_beanstalk::collect(ctx))
        }),
        ("DynamoDB", |ctx| Box::pin(dynamodb::collect(ctx))),
        ("SNS", |ctx| Box::pin(sns::collect(ctx))),
        ("SQS", |ctx| Box::pin(sqs::collect(ctx))),
        ("Route53", |ctx| Box::pin(route53::collect(ctx))),
        ("IAM", |ctx| Box::pin(iam::collect(ctx))),
        ("CloudFormation", |ctx| Box::pin(cloudformation::collect(ctx))),
    ]
}

/// Result of one full sweep across the sixteen collectors.
pub struct SweepResult {
    pub records: Vec<ResourceRecord>,
    pub errors: Vec<String>,
}

/// Runs the sixteen collectors in batches of [`BATCH_SIZE`]: every
/// collector in a batch is spawned concurrently, but the next batch does
/// not start until the whole batch has returned — a barrier between
/// batches, not a sliding window of [`BATCH_SIZE`] concurrent tasks.
pub async fn sweep(ctx: &CollectorContext) -> SweepResult {
    let started = std::time::Instant::now();

    let mut records = Vec::new();
    let mut errors = Vec::new();

    for batch in collectors().chunks(BATCH_SIZE).map(<[_]>::to_vec) {
        let mut join_set = JoinSet::new();
        for (service, collect) in batch {
            let ctx = ctx.clone();
            join_set.spawn(async move {
                let outcome = collect(ctx).await;
                (service, outcome)
            });
        }

        let mut batch_results: Vec<(&'static str, Result<Vec<ResourceRecord>, String>)> = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(result) => batch_results.push(result),
                Err(err) => {
                    tracing::error!(target: "resource-sync", error = %err, "collector task panicked");
                }
            }
        }
        // join_next() resolves in completion order, not dispatch order —
        // ordering within a batch is unspecified; only the ordering of
        // batches relative to one another is preserved.
        for (service, outcome) in batch_results {
            match outcome {
                Ok(mut records_for_service) => records.append(&mut records_for_service),
                Err(message) => {
                    observability::FinopsMetrics::record_collector_error(service);
                    errors.push(format!("{service}: {message}"));
                }
            }
        }
    }

    observability::FinopsMetrics::record_collector_batch_duration(started.elapsed().as_secs_f64());

    SweepResult { records, errors }
}

/// Builds a [`ResourceRecord`] with the defaults every collector starts
/// from; callers override only the fields they actually have.
pub(crate) fn blank_record(resource_id: impl Into<String>, service: &str) -> ResourceRecord {
    ResourceRecord {
        resource_id: resource_id.into(),
        arn: None,
        service: service.to_string(),
        resource_type: None,
        name: None,
        tags: Default::default(),
        state: None,
        estimated_monthly_cost: None,
        metadata: serde_json::Value::Null,
    }
}
