//! Analysis-path descriptors.
//!
//! These are the lightweight, heuristic-focused shapes produced by the
//! `CloudClient` capability set (engine crate) and consumed by the pricing
//! & cost model and the analyzer library below. They are intentionally
//! thinner than `ResourceRecord`, the inventory collectors' shape — no
//! tags, no metadata bag, just the fields a cost function or a heuristic
//! needs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ec2Instance {
    pub instance_id: String,
    pub instance_type: String,
    /// e.g. "running", "stopped", "terminated"
    pub state: String,
    pub name: Option<String>,
}

/// CPU utilization sampled over a fixed window (14 days live; arbitrary in tests).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ec2CpuMetric {
    pub period_days: u32,
    pub avg_cpu_percent: f64,
    pub max_cpu_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EbsVolume {
    pub volume_id: String,
    pub volume_type: String,
    pub size_gib: f64,
    /// e.g. "available", "in-use"
    pub state: String,
    pub attachments: Vec<String>,
    pub create_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Bucket {
    pub bucket_name: String,
    pub size_bytes: u64,
    /// e.g. "STANDARD", "GLACIER"
    pub storage_class: String,
    /// Days since the last recorded access, when known.
    pub last_accessed_days: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RdsInstance {
    pub instance_id: String,
    pub instance_class: String,
    /// e.g. "available", "stopped"
    pub status: String,
    pub avg_cpu_percent: f64,
    pub avg_connections: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambdaFunction {
    pub function_name: String,
    pub memory_mb: u32,
    pub timeout_sec: u32,
    pub avg_invocations_per_day: f64,
    pub avg_duration_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadBalancerType {
    Alb,
    Nlb,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadBalancer {
    pub load_balancer_name: String,
    pub load_balancer_type: LoadBalancerType,
    /// e.g. "active", "provisioning"
    pub state: String,
    pub total_target_count: u32,
    pub request_count_per_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NatGateway {
    pub nat_gateway_id: String,
    /// e.g. "available", "deleted"
    pub state: String,
    pub bytes_processed_per_day: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElasticIp {
    pub allocation_id: String,
    pub association_id: Option<String>,
}

/// Monthly cost breakdown returned by `CloudClient::get_cost_data`.
///
/// Both `total_monthly` and every entry of `by_service` are monthly
/// averages: `total_monthly` is defined as the sum of `by_service` for the
/// same month, never a multi-month accumulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CostData {
    pub total_monthly: f64,
    pub by_service: std::collections::HashMap<String, f64>,
}
