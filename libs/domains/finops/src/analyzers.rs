//! Analyzer library: eight pure heuristics, each a descriptor slice in,
//! a recommendation list out. No I/O; no clock reads except the EBS-orphan
//! heuristic, which takes `now` as an explicit parameter so tests can pin
//! it rather than reaching for the wall clock.
//!
//! Output order follows input order; within a single call no analyzer
//! emits more than one recommendation for the same resource id.

use chrono::{DateTime, Utc};

use crate::cost;
use crate::descriptors::{
    Ec2CpuMetric, Ec2Instance, EbsVolume, ElasticIp, LambdaFunction, LoadBalancer,
    LoadBalancerType, NatGateway, RdsInstance, S3Bucket,
};
use crate::models::{Confidence, RecommendationType, RecommendationUpsert};

fn upsert(
    recommendation_type: RecommendationType,
    resource_id: impl Into<String>,
    description: impl Into<String>,
    estimated_monthly_savings: f64,
    confidence: Confidence,
    metadata: serde_json::Value,
) -> RecommendationUpsert {
    RecommendationUpsert {
        resource_id: resource_id.into(),
        recommendation_type,
        description: description.into(),
        estimated_monthly_savings: cost::round_2(estimated_monthly_savings.max(0.0)),
        confidence,
        metadata,
    }
}

/// #1 EC2 downsize: running, observed for >= 14 days, average CPU < 10%.
pub fn analyze_ec2_downsize(
    instances: &[Ec2Instance],
    metrics: &[Ec2CpuMetric],
) -> Vec<RecommendationUpsert> {
    let mut out = Vec::new();
    for (instance, metric) in instances.iter().zip(metrics.iter()) {
        if instance.state != "running" {
            continue;
        }
        if metric.period_days < 14 || metric.avg_cpu_percent >= 10.0 {
            continue;
        }

        let confidence = if metric.avg_cpu_percent < 5.0 {
            Confidence::High
        } else {
            Confidence::Medium
        };
        let hourly = cost::ec2_hourly_rate(&instance.instance_type);
        let savings = hourly * cost::HOURS_PER_MONTH * 0.5 * cost::CONSERVATIVE_SAVINGS_FACTOR;

        let label = instance.name.as_deref().unwrap_or(&instance.instance_id);
        out.push(upsert(
            RecommendationType::Ec2DownSize,
            instance.instance_id.clone(),
            format!(
                "{label} ({}) has averaged {:.1}% CPU over the last {} days; consider downsizing to a smaller instance type.",
                instance.instance_type, metric.avg_cpu_percent, metric.period_days
            ),
            savings,
            confidence,
            serde_json::json!({
                "avg_cpu_percent": metric.avg_cpu_percent,
                "period_days": metric.period_days,
                "instance_type": instance.instance_type,
            }),
        ));
    }
    out
}

/// #2 EBS orphan: available, unattached, older than 7 days.
pub fn analyze_ebs_orphan(volumes: &[EbsVolume], now: DateTime<Utc>) -> Vec<RecommendationUpsert> {
    let mut out = Vec::new();
    for volume in volumes {
        if volume.state != "available" || !volume.attachments.is_empty() {
            continue;
        }
        let age = now - volume.create_time;
        if age <= chrono::Duration::days(7) {
            continue;
        }

        let savings = cost::ebs_monthly_cost(&volume.volume_type, volume.size_gib);
        out.push(upsert(
            RecommendationType::EbsOrphan,
            volume.volume_id.clone(),
            format!(
                "{} ({} GiB, {}) has been unattached for {} days; delete or snapshot it.",
                volume.volume_id,
                volume.size_gib,
                volume.volume_type,
                age.num_days()
            ),
            savings,
            Confidence::High,
            serde_json::json!({
                "size_gib": volume.size_gib,
                "volume_type": volume.volume_type,
                "unattached_days": age.num_days(),
            }),
        ));
    }
    out
}

/// #3 S3 lifecycle: standard storage, untouched for > 90 days.
pub fn analyze_s3_lifecycle(buckets: &[S3Bucket]) -> Vec<RecommendationUpsert> {
    let mut out = Vec::new();
    for bucket in buckets {
        let Some(last_accessed_days) = bucket.last_accessed_days else {
            continue;
        };
        if last_accessed_days <= 90 || bucket.storage_class != "STANDARD" {
            continue;
        }

        let size_gb = bucket.size_bytes as f64 / cost::GIB_BYTES;
        let savings =
            size_gb * (cost::S3_STANDARD_PER_GB - cost::S3_GLACIER_PER_GB) * cost::CONSERVATIVE_SAVINGS_FACTOR;

        out.push(upsert(
            RecommendationType::S3Lifecycle,
            bucket.bucket_name.clone(),
            format!(
                "{} has not been accessed in {} days; apply a lifecycle rule to transition it to Glacier.",
                bucket.bucket_name, last_accessed_days
            ),
            savings,
            Confidence::Medium,
            serde_json::json!({
                "size_bytes": bucket.size_bytes,
                "last_accessed_days": last_accessed_days,
            }),
        ));
    }
    out
}

/// #4 RDS downsize: available, low CPU and low connection count.
pub fn analyze_rds_downsize(instances: &[RdsInstance]) -> Vec<RecommendationUpsert> {
    let mut out = Vec::new();
    for instance in instances {
        if instance.status != "available" {
            continue;
        }
        if instance.avg_cpu_percent >= 15.0 || instance.avg_connections >= 10.0 {
            continue;
        }

        let confidence = if instance.avg_cpu_percent < 5.0 && instance.avg_connections < 3.0 {
            Confidence::High
        } else {
            Confidence::Medium
        };
        let hourly = cost::rds_hourly_rate(&instance.instance_class);
        let savings = hourly * cost::HOURS_PER_MONTH * 0.5 * cost::CONSERVATIVE_SAVINGS_FACTOR;

        out.push(upsert(
            RecommendationType::RdsDownSize,
            instance.instance_id.clone(),
            format!(
                "{} ({}) has averaged {:.1}% CPU and {:.1} connections; consider a smaller instance class.",
                instance.instance_id, instance.instance_class, instance.avg_cpu_percent, instance.avg_connections
            ),
            savings,
            confidence,
            serde_json::json!({
                "avg_cpu_percent": instance.avg_cpu_percent,
                "avg_connections": instance.avg_connections,
                "instance_class": instance.instance_class,
            }),
        ));
    }
    out
}

/// #5 Lambda: unused functions (5a) and oversized-but-fast functions (5b).
/// The two conditions are mutually exclusive (invocations == 0 vs > 0), so
/// a single pass over the slice emits at most one recommendation per
/// function.
pub fn analyze_lambda(functions: &[LambdaFunction]) -> Vec<RecommendationUpsert> {
    let mut out = Vec::new();
    for function in functions {
        if function.avg_invocations_per_day == 0.0 {
            let memory_gb = function.memory_mb as f64 / 1024.0;
            let savings =
                memory_gb * function.timeout_sec as f64 * 100.0 * LAMBDA_PRICE_PER_GB_SECONDS * 30.0;
            out.push(upsert(
                RecommendationType::LambdaUnused,
                function.function_name.clone(),
                format!(
                    "{} has had zero invocations; consider removing it.",
                    function.function_name
                ),
                savings,
                Confidence::High,
                serde_json::json!({ "memory_mb": function.memory_mb, "timeout_sec": function.timeout_sec }),
            ));
            continue;
        }

        if function.memory_mb >= 512 && function.avg_duration_ms < 100.0 {
            let rightsized_memory_mb = (function.memory_mb / 3).max(128);
            let current_gbs = cost::lambda_monthly_gb_seconds(
                function.memory_mb,
                function.avg_duration_ms,
                function.avg_invocations_per_day,
            );
            let rightsized_gbs = cost::lambda_monthly_gb_seconds(
                rightsized_memory_mb,
                function.avg_duration_ms,
                function.avg_invocations_per_day,
            );
            let savings = (current_gbs - rightsized_gbs) * LAMBDA_PRICE_PER_GB_SECONDS;
            if savings <= 0.50 {
                continue;
            }

            out.push(upsert(
                RecommendationType::LambdaOversized,
                function.function_name.clone(),
                format!(
                    "{} runs in {:.0}ms at {}MB; {}MB would likely be enough.",
                    function.function_name, function.avg_duration_ms, function.memory_mb, rightsized_memory_mb
                ),
                savings,
                Confidence::Medium,
                serde_json::json!({
                    "current_memory_mb": function.memory_mb,
                    "rightsized_memory_mb": rightsized_memory_mb,
                    "avg_duration_ms": function.avg_duration_ms,
                }),
            ));
        }
    }
    out
}

const LAMBDA_PRICE_PER_GB_SECONDS: f64 = 0.0000166667;

/// #6 ELB: no registered targets (6a) or targets but zero traffic (6b).
pub fn analyze_elb(load_balancers: &[LoadBalancer]) -> Vec<RecommendationUpsert> {
    let mut out = Vec::new();
    for lb in load_balancers {
        if lb.state != "active" {
            continue;
        }

        let hourly_cost = cost::load_balancer_monthly_cost(lb.load_balancer_type);

        if lb.total_target_count == 0 {
            out.push(upsert(
                RecommendationType::ElbNoTargets,
                lb.load_balancer_name.clone(),
                format!(
                    "{} has no registered targets; consider deleting it.",
                    lb.load_balancer_name
                ),
                hourly_cost,
                Confidence::High,
                serde_json::json!({ "total_target_count": 0 }),
            ));
        } else if lb.request_count_per_day == 0.0 {
            out.push(upsert(
                RecommendationType::ElbNoTraffic,
                lb.load_balancer_name.clone(),
                format!(
                    "{} has {} registered targets but has served no traffic; consider deleting it.",
                    lb.load_balancer_name, lb.total_target_count
                ),
                hourly_cost,
                Confidence::Medium,
                serde_json::json!({ "total_target_count": lb.total_target_count }),
            ));
        }
    }
    out
}

/// #7 Elastic IP unassociated.
pub fn analyze_eip_unassociated(eips: &[ElasticIp]) -> Vec<RecommendationUpsert> {
    let mut out = Vec::new();
    for eip in eips {
        if eip.association_id.is_some() {
            continue;
        }
        let savings = cost::elastic_ip_monthly_cost(false);
        out.push(upsert(
            RecommendationType::EipUnassociated,
            eip.allocation_id.clone(),
            format!(
                "{} is not associated with any resource; release it.",
                eip.allocation_id
            ),
            savings,
            Confidence::High,
            serde_json::json!({}),
        ));
    }
    out
}

/// #8 NAT gateway idle: available but processing < 1 GiB/day.
pub fn analyze_nat_gateway_idle(nat_gateways: &[NatGateway]) -> Vec<RecommendationUpsert> {
    let mut out = Vec::new();
    for nat in nat_gateways {
        if nat.state != "available" {
            continue;
        }
        let daily_gb = nat.bytes_processed_per_day as f64 / cost::GIB_BYTES;
        if daily_gb >= 1.0 {
            continue;
        }

        let savings = cost::nat_gateway_monthly_cost(daily_gb);
        out.push(upsert(
            RecommendationType::NatGwIdle,
            nat.nat_gateway_id.clone(),
            format!(
                "{} is processing only {:.3} GiB/day; consider removing it if no longer needed.",
                nat.nat_gateway_id, daily_gb
            ),
            savings,
            Confidence::Medium,
            serde_json::json!({ "daily_gb": daily_gb }),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::LoadBalancerType;

    fn ec2(instance_type: &str, state: &str) -> Ec2Instance {
        Ec2Instance {
            instance_id: "i-test".into(),
            instance_type: instance_type.into(),
            state: state.into(),
            name: None,
        }
    }

    fn metric(period_days: u32, avg_cpu_percent: f64) -> Ec2CpuMetric {
        Ec2CpuMetric {
            period_days,
            avg_cpu_percent,
            max_cpu_percent: avg_cpu_percent,
        }
    }

    #[test]
    fn ec2_period_13_days_emits_nothing() {
        let recs = analyze_ec2_downsize(&[ec2("t3.medium", "running")], &[metric(13, 5.0)]);
        assert!(recs.is_empty());
    }

    #[test]
    fn ec2_period_14_days_avg_cpu_9_999_is_medium() {
        let recs = analyze_ec2_downsize(&[ec2("t3.medium", "running")], &[metric(14, 9.999)]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].confidence, Confidence::Medium);
    }

    #[test]
    fn ec2_avg_cpu_4_999_is_high() {
        let recs = analyze_ec2_downsize(&[ec2("t3.medium", "running")], &[metric(14, 4.999)]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].confidence, Confidence::High);
    }

    #[test]
    fn ec2_stopped_instance_is_skipped() {
        let recs = analyze_ec2_downsize(&[ec2("t3.medium", "stopped")], &[metric(30, 1.0)]);
        assert!(recs.is_empty());
    }

    fn ebs(age_days: i64) -> EbsVolume {
        EbsVolume {
            volume_id: "vol-test".into(),
            volume_type: "gp2".into(),
            size_gib: 10.0,
            state: "available".into(),
            attachments: vec![],
            create_time: Utc::now() - chrono::Duration::days(age_days),
        }
    }

    #[test]
    fn ebs_exactly_7_days_emits_nothing() {
        let recs = analyze_ebs_orphan(&[ebs(7)], Utc::now());
        assert!(recs.is_empty());
    }

    #[test]
    fn ebs_8_days_emits_recommendation() {
        let recs = analyze_ebs_orphan(&[ebs(8)], Utc::now());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].confidence, Confidence::High);
    }

    #[test]
    fn ebs_attached_volume_is_skipped() {
        let mut volume = ebs(30);
        volume.attachments.push("i-abc".into());
        let recs = analyze_ebs_orphan(&[volume], Utc::now());
        assert!(recs.is_empty());
    }

    #[test]
    fn lambda_zero_invocations_and_zero_duration_emits_unused() {
        let functions = vec![LambdaFunction {
            function_name: "idle-fn".into(),
            memory_mb: 256,
            timeout_sec: 30,
            avg_invocations_per_day: 0.0,
            avg_duration_ms: 0.0,
        }];
        let recs = analyze_lambda(&functions);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].recommendation_type, RecommendationType::LambdaUnused);
    }

    #[test]
    fn lambda_oversized_only_above_fifty_cents() {
        let functions = vec![LambdaFunction {
            function_name: "fast-fn".into(),
            memory_mb: 3008,
            timeout_sec: 30,
            avg_invocations_per_day: 500_000.0,
            avg_duration_ms: 20.0,
        }];
        let recs = analyze_lambda(&functions);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].recommendation_type, RecommendationType::LambdaOversized);
        assert!(recs[0].estimated_monthly_savings > 0.50);
    }

    #[test]
    fn elb_provisioning_state_emits_nothing() {
        let lbs = vec![LoadBalancer {
            load_balancer_name: "lb-1".into(),
            load_balancer_type: LoadBalancerType::Alb,
            state: "provisioning".into(),
            total_target_count: 0,
            request_count_per_day: 0.0,
        }];
        assert!(analyze_elb(&lbs).is_empty());
    }

    #[test]
    fn elb_no_targets_is_high_confidence() {
        let lbs = vec![LoadBalancer {
            load_balancer_name: "lb-1".into(),
            load_balancer_type: LoadBalancerType::Alb,
            state: "active".into(),
            total_target_count: 0,
            request_count_per_day: 0.0,
        }];
        let recs = analyze_elb(&lbs);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].recommendation_type, RecommendationType::ElbNoTargets);
        assert_eq!(recs[0].confidence, Confidence::High);
    }

    #[test]
    fn elb_no_traffic_is_medium_confidence() {
        let lbs = vec![LoadBalancer {
            load_balancer_name: "lb-1".into(),
            load_balancer_type: LoadBalancerType::Nlb,
            state: "active".into(),
            total_target_count: 2,
            request_count_per_day: 0.0,
        }];
        let recs = analyze_elb(&lbs);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].recommendation_type, RecommendationType::ElbNoTraffic);
        assert_eq!(recs[0].confidence, Confidence::Medium);
    }

    #[test]
    fn eip_associated_emits_nothing() {
        let eips = vec![ElasticIp {
            allocation_id: "eipalloc-1".into(),
            association_id: Some("eipassoc-1".into()),
        }];
        assert!(analyze_eip_unassociated(&eips).is_empty());
    }

    #[test]
    fn nat_gateway_idle_below_one_gib_emits() {
        let nats = vec![NatGateway {
            nat_gateway_id: "nat-1".into(),
            state: "available".into(),
            bytes_processed_per_day: (cost::GIB_BYTES * 0.5) as u64,
        }];
        let recs = analyze_nat_gateway_idle(&nats);
        assert_eq!(recs.len(), 1);
    }

    #[test]
    fn analyzers_never_emit_negative_savings() {
        let recs = analyze_eip_unassociated(&[ElasticIp {
            allocation_id: "eipalloc-2".into(),
            association_id: None,
        }]);
        assert!(recs.iter().all(|r| r.estimated_monthly_savings >= 0.0));
    }
}
