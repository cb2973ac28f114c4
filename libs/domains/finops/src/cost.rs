//! Pricing & cost model: pure functions from a resource descriptor to an
//! estimated monthly USD cost. Deterministic, no I/O. Prices are baseline
//! regional list prices, inlined so tests can substitute the constants
//! directly rather than stubbing a pricing service.

use crate::descriptors::LoadBalancerType;

/// Billing hours in a month, used throughout the cost model.
pub const HOURS_PER_MONTH: f64 = 730.0;

/// Multiplier applied to theoretical savings on downsizing/transition
/// heuristics, to account for burst usage and migration overhead.
pub const CONSERVATIVE_SAVINGS_FACTOR: f64 = 0.6;

/// 1 GiB/GB in bytes, per the spec's byte-to-GB conversion.
pub const GIB_BYTES: f64 = 1_073_741_824.0; // 2^30

const EC2_FALLBACK_HOURLY: f64 = 0.192;
const EBS_FALLBACK_PER_GIB: f64 = 0.10;
const RDS_FALLBACK_HOURLY: f64 = 0.342;

pub const S3_STANDARD_PER_GB: f64 = 0.023;
pub const S3_GLACIER_PER_GB: f64 = 0.004;

const LAMBDA_PRICE_PER_GB_SECOND: f64 = 0.0000166667;
const LAMBDA_FREE_TIER_GB_SECONDS: f64 = 400_000.0;

const NAT_GATEWAY_FIXED_HOURLY: f64 = 0.045;
const NAT_GATEWAY_PER_GB_TRANSFER: f64 = 0.045;

const ELASTIC_IP_UNUSED_HOURLY: f64 = 0.005;

const ALB_NLB_HOURLY: f64 = 0.0225;

/// Hourly list price for an EC2 instance type. Unknown types fall back to
/// the `m5.xlarge`-class rate rather than erroring — the engine must keep
/// running even against instance families it doesn't recognize yet.
pub fn ec2_hourly_rate(instance_type: &str) -> f64 {
    match instance_type {
        "t3.micro" => 0.0104,
        "t3.small" => 0.0208,
        "t3.medium" => 0.0416,
        "t3.large" => 0.0832,
        "m5.large" => 0.096,
        "m5.xlarge" => 0.192,
        "m5.2xlarge" => 0.384,
        "c5.large" => 0.085,
        "c5.xlarge" => 0.17,
        "c5.2xlarge" => 0.34,
        "r5.large" => 0.126,
        "r5.xlarge" => 0.252,
        "r5.2xlarge" => 0.504,
        _ => EC2_FALLBACK_HOURLY,
    }
}

/// Monthly cost of a running EC2 instance. Non-running instances cost 0 —
/// a stopped instance isn't billed for compute.
pub fn ec2_monthly_cost(instance_type: &str, state: &str) -> f64 {
    if state != "running" {
        return 0.0;
    }
    ec2_hourly_rate(instance_type) * HOURS_PER_MONTH
}

/// Monthly per-GiB price for an EBS volume type.
pub fn ebs_price_per_gib(volume_type: &str) -> f64 {
    match volume_type {
        "gp2" => 0.10,
        "gp3" => 0.08,
        "io1" | "io2" => 0.125,
        "st1" => 0.045,
        "sc1" => 0.015,
        _ => EBS_FALLBACK_PER_GIB,
    }
}

pub fn ebs_monthly_cost(volume_type: &str, size_gib: f64) -> f64 {
    (size_gib.max(0.0)) * ebs_price_per_gib(volume_type)
}

/// Monthly per-GB price for an S3 storage class. Unknown classes are
/// priced as `STANDARD` — the conservative (higher) assumption.
pub fn s3_price_per_gb(storage_class: &str) -> f64 {
    match storage_class {
        "GLACIER" => S3_GLACIER_PER_GB,
        _ => S3_STANDARD_PER_GB,
    }
}

pub fn s3_monthly_cost(storage_class: &str, size_bytes: u64) -> f64 {
    let size_gb = size_bytes as f64 / GIB_BYTES;
    size_gb * s3_price_per_gb(storage_class)
}

/// Hourly list price for an RDS instance class.
pub fn rds_hourly_rate(instance_class: &str) -> f64 {
    match instance_class {
        "db.t3.micro" => 0.017,
        "db.t3.small" => 0.034,
        "db.t3.medium" => 0.068,
        "db.t3.large" => 0.136,
        "db.m5.large" => 0.171,
        "db.m5.xlarge" => 0.342,
        "db.r5.large" => 0.24,
        "db.r5.xlarge" => 0.48,
        "db.r5.2xlarge" => 0.96,
        _ => RDS_FALLBACK_HOURLY,
    }
}

/// Monthly cost of an RDS instance. Non-`available` instances (stopped,
/// deleting, ...) cost 0.
pub fn rds_monthly_cost(instance_class: &str, status: &str) -> f64 {
    if status != "available" {
        return 0.0;
    }
    rds_hourly_rate(instance_class) * HOURS_PER_MONTH
}

/// Monthly GB-seconds consumed by a Lambda function at the given shape.
pub fn lambda_monthly_gb_seconds(memory_mb: u32, avg_duration_ms: f64, avg_invocations_per_day: f64) -> f64 {
    avg_invocations_per_day * (avg_duration_ms / 1000.0) * (memory_mb as f64 / 1024.0) * 30.0
}

/// Monthly Lambda cost net of the 400,000 GB-s free tier.
pub fn lambda_monthly_cost(memory_mb: u32, avg_duration_ms: f64, avg_invocations_per_day: f64) -> f64 {
    let gb_seconds = lambda_monthly_gb_seconds(memory_mb, avg_duration_ms, avg_invocations_per_day);
    let billable = (gb_seconds - LAMBDA_FREE_TIER_GB_SECONDS).max(0.0);
    billable * LAMBDA_PRICE_PER_GB_SECOND
}

/// Monthly cost of a NAT gateway: fixed hourly charge plus data transfer.
pub fn nat_gateway_monthly_cost(daily_gb: f64) -> f64 {
    NAT_GATEWAY_FIXED_HOURLY * HOURS_PER_MONTH + daily_gb.max(0.0) * 30.0 * NAT_GATEWAY_PER_GB_TRANSFER
}

/// Monthly cost of an Elastic IP. Billed only while unassociated.
pub fn elastic_ip_monthly_cost(associated: bool) -> f64 {
    if associated {
        0.0
    } else {
        ELASTIC_IP_UNUSED_HOURLY * HOURS_PER_MONTH
    }
}

/// Monthly cost of an ALB/NLB (both share the same hourly list price).
pub fn load_balancer_monthly_cost(_lb_type: LoadBalancerType) -> f64 {
    ALB_NLB_HOURLY * HOURS_PER_MONTH
}

/// Round a USD amount to 2 decimals, the precision the spec requires on
/// every emitted recommendation's `estimated_monthly_savings`.
pub fn round_2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ec2_t3_medium_cost_matches_scenario() {
        let cost = ec2_monthly_cost("t3.medium", "running");
        assert!((cost - 30.368).abs() < 1e-6);
    }

    #[test]
    fn ec2_non_running_costs_nothing() {
        assert_eq!(ec2_monthly_cost("t3.medium", "stopped"), 0.0);
        assert_eq!(ec2_monthly_cost("t3.medium", "terminated"), 0.0);
    }

    #[test]
    fn ec2_unknown_type_uses_fallback_rate() {
        let cost = ec2_monthly_cost("z9.massive", "running");
        assert!((cost - EC2_FALLBACK_HOURLY * HOURS_PER_MONTH).abs() < 1e-9);
    }

    #[test]
    fn ebs_gp3_100_gib_cost_matches_scenario() {
        let cost = ebs_monthly_cost("gp3", 100.0);
        assert!((cost - 8.00).abs() < 1e-9);
    }

    #[test]
    fn ebs_unknown_type_uses_fallback_price() {
        assert!((ebs_price_per_gib("unknown") - EBS_FALLBACK_PER_GIB).abs() < 1e-12);
    }

    #[test]
    fn rds_non_available_costs_nothing() {
        assert_eq!(rds_monthly_cost("db.m5.large", "stopped"), 0.0);
    }

    #[test]
    fn eip_associated_costs_nothing() {
        assert_eq!(elastic_ip_monthly_cost(true), 0.0);
    }

    #[test]
    fn eip_unassociated_costs_hourly_times_month() {
        let cost = elastic_ip_monthly_cost(false);
        assert!((cost - 0.005 * HOURS_PER_MONTH).abs() < 1e-9);
    }

    #[test]
    fn lambda_cost_nets_out_free_tier() {
        // 1000 invocations/day * 1s * 1GB * 30 = 30_000 GB-s, entirely within free tier.
        let cost = lambda_monthly_cost(1024, 1000.0, 1000.0);
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn lambda_cost_bills_above_free_tier() {
        // 100_000 invocations/day * 1s * 1GB * 30 = 3,000,000 GB-s.
        let cost = lambda_monthly_cost(1024, 1000.0, 100_000.0);
        let expected_billable = 3_000_000.0 - LAMBDA_FREE_TIER_GB_SECONDS;
        assert!((cost - expected_billable * LAMBDA_PRICE_PER_GB_SECOND).abs() < 1e-6);
    }

    #[test]
    fn nothing_emits_negative_cost() {
        assert!(ec2_monthly_cost("t3.micro", "running") >= 0.0);
        assert!(ebs_monthly_cost("sc1", 1.0) >= 0.0);
        assert!(s3_monthly_cost("STANDARD", 1) >= 0.0);
        assert!(rds_monthly_cost("db.t3.micro", "available") >= 0.0);
        assert!(lambda_monthly_cost(128, 10.0, 1.0) >= 0.0);
        assert!(nat_gateway_monthly_cost(0.0) >= 0.0);
    }

    #[test]
    fn round_2_rounds_to_two_decimals() {
        assert_eq!(round_2(1.2345), 1.23);
        assert_eq!(round_2(1.2367), 1.24);
        assert_eq!(round_2(50.0), 50.0);
    }
}
