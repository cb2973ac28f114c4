//! The capability set the analysis path (cost model + analyzers) pulls its
//! descriptors from. Two implementations exist: [`live::LiveCloudClient`]
//! talks to AWS over HTTP the same way `pricing-collector`'s providers did,
//! and [`mock::MockCloudClient`] returns a fixed, deterministic fixture set
//! used when `FINOPS_MOCK_MODE=true` or in tests.
//!
//! Unlike the pricing providers this client never falls back to a mock
//! fixture on a live failure: a failed call surfaces as a typed
//! [`CloudClientError`] and the caller decides what to do with it.

pub mod live;
pub mod mock;

use async_trait::async_trait;
use domain_finops::descriptors::{
    CostData, Ec2CpuMetric, Ec2Instance, EbsVolume, ElasticIp, LambdaFunction, LoadBalancer,
    NatGateway, RdsInstance, S3Bucket,
};

#[derive(Debug, thiserror::Error)]
pub enum CloudClientError {
    /// Covers both the mock client's `reqwest` failures and the live
    /// client's AWS SDK service errors — both are boxed behind
    /// `std::error::Error` so this variant doesn't tie the trait to one
    /// transport.
    #[error("request to {service} failed: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("{service} returned an unexpected response: {details}")]
    UnexpectedResponse { service: &'static str, details: String },
    #[error("could not assume role {role_arn}: {details}")]
    AssumeRole { role_arn: String, details: String },
}

pub type CloudClientResult<T> = Result<T, CloudClientError>;

/// Read-only capability set used by the job runner's analysis path.
///
/// `get_ec2_cpu_metrics` returns one metric per id, in the same order as
/// `instance_ids` — callers zip the two slices together, so an implementation
/// must preserve that alignment rather than dropping ids it has no data for.
#[async_trait]
pub trait CloudClient: Send + Sync {
    async fn list_ec2_instances(&self) -> CloudClientResult<Vec<Ec2Instance>>;

    async fn get_ec2_cpu_metrics(
        &self,
        instance_ids: &[String],
    ) -> CloudClientResult<Vec<Ec2CpuMetric>>;

    async fn list_ebs_volumes(&self) -> CloudClientResult<Vec<EbsVolume>>;

    async fn list_s3_buckets(&self) -> CloudClientResult<Vec<S3Bucket>>;

    async fn list_rds_instances(&self) -> CloudClientResult<Vec<RdsInstance>>;

    async fn list_lambda_functions(&self) -> CloudClientResult<Vec<LambdaFunction>>;

    async fn list_load_balancers(&self) -> CloudClientResult<Vec<LoadBalancer>>;

    async fn list_nat_gateways(&self) -> CloudClientResult<Vec<NatGateway>>;

    async fn list_elastic_ips(&self) -> CloudClientResult<Vec<ElasticIp>>;

    async fn get_cost_data(&self) -> CloudClientResult<CostData>;

    async fn test_connection(&self) -> CloudClientResult<bool>;
}
