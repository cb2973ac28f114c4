//! Deterministic in-memory [`CloudClient`]. Used in `FINOPS_MOCK_MODE` and
//! by every integration test — same shape as the live client, but every
//! list is a fixed fixture rather than a service call.
//!
//! Modeled on the teacher's `generate_mock_*` fixture generators
//! (`pricing-collector/src/providers/aws.rs`), but deterministic: no RNG,
//! no wall-clock reads. The only inputs that can move a result are the
//! `seed` (currently just carried for interface parity with a future
//! fixture-variant selector) and the `now` passed in at construction,
//! which every relative timestamp below is computed from.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use domain_finops::descriptors::{
    CostData, Ec2CpuMetric, Ec2Instance, EbsVolume, ElasticIp, LambdaFunction, LoadBalancer,
    LoadBalancerType, NatGateway, RdsInstance, S3Bucket,
};

use super::CloudClientResult;

#[derive(Debug, Clone, Copy)]
struct CpuFixture {
    period_days: u32,
    avg_cpu_percent: f64,
    max_cpu_percent: f64,
}

pub struct MockCloudClient {
    #[allow(dead_code)]
    seed: u64,
    now: DateTime<Utc>,
}

impl MockCloudClient {
    pub fn new(seed: u64, now: DateTime<Utc>) -> Self {
        Self { seed, now }
    }

    fn ec2_fixtures() -> Vec<Ec2Instance> {
        vec![
            Ec2Instance {
                instance_id: "i-0a1b2c3d4e5f00001".to_string(),
                instance_type: "t3.micro".to_string(),
                state: "running".to_string(),
                name: Some("bastion".to_string()),
            },
            Ec2Instance {
                instance_id: "i-0a1b2c3d4e5f00002".to_string(),
                instance_type: "t3.small".to_string(),
                state: "stopped".to_string(),
                name: Some("batch-worker".to_string()),
            },
            Ec2Instance {
                instance_id: "i-0a1b2c3d4e5f00003".to_string(),
                instance_type: "m5.large".to_string(),
                state: "running".to_string(),
                name: Some("web-frontend".to_string()),
            },
            Ec2Instance {
                instance_id: "i-0a1b2c3d4e5f00004".to_string(),
                instance_type: "t3.medium".to_string(),
                state: "running".to_string(),
                name: Some("api-backend".to_string()),
            },
        ]
    }

    fn cpu_fixtures() -> HashMap<&'static str, CpuFixture> {
        HashMap::from([
            (
                "i-0a1b2c3d4e5f00001",
                CpuFixture {
                    period_days: 14,
                    avg_cpu_percent: 2.3,
                    max_cpu_percent: 6.0,
                },
            ),
            (
                "i-0a1b2c3d4e5f00003",
                CpuFixture {
                    period_days: 14,
                    avg_cpu_percent: 62.0,
                    max_cpu_percent: 91.0,
                },
            ),
            (
                "i-0a1b2c3d4e5f00004",
                CpuFixture {
                    period_days: 14,
                    avg_cpu_percent: 8.0,
                    max_cpu_percent: 19.0,
                },
            ),
        ])
    }
}

#[async_trait]
impl super::CloudClient for MockCloudClient {
    async fn list_ec2_instances(&self) -> CloudClientResult<Vec<Ec2Instance>> {
        Ok(Self::ec2_fixtures())
    }

    async fn get_ec2_cpu_metrics(
        &self,
        instance_ids: &[String],
    ) -> CloudClientResult<Vec<Ec2CpuMetric>> {
        let fixtures = Self::cpu_fixtures();
        Ok(instance_ids
            .iter()
            .map(|id| {
                let fixture = fixtures.get(id.as_str()).copied().unwrap_or(CpuFixture {
                    period_days: 14,
                    avg_cpu_percent: 35.0,
                    max_cpu_percent: 50.0,
                });
                Ec2CpuMetric {
                    period_days: fixture.period_days,
                    avg_cpu_percent: fixture.avg_cpu_percent,
                    max_cpu_percent: fixture.max_cpu_percent,
                }
            })
            .collect())
    }

    async fn list_ebs_volumes(&self) -> CloudClientResult<Vec<EbsVolume>> {
        Ok(vec![
            EbsVolume {
                volume_id: "vol-0a1b2c3d4e5f00001".to_string(),
                volume_type: "gp3".to_string(),
                size_gib: 100.0,
                state: "in-use".to_string(),
                attachments: vec!["i-0a1b2c3d4e5f00004".to_string()],
                create_time: self.now - Duration::days(180),
            },
            EbsVolume {
                volume_id: "vol-0a1b2c3d4e5f00002".to_string(),
                volume_type: "gp2".to_string(),
                size_gib: 500.0,
                state: "available".to_string(),
                attachments: vec![],
                create_time: self.now - Duration::days(30),
            },
            EbsVolume {
                volume_id: "vol-0a1b2c3d4e5f00003".to_string(),
                volume_type: "io1".to_string(),
                size_gib: 50.0,
                state: "in-use".to_string(),
                attachments: vec!["i-0a1b2c3d4e5f00003".to_string()],
                create_time: self.now - Duration::days(400),
            },
        ])
    }

    async fn list_s3_buckets(&self) -> CloudClientResult<Vec<S3Bucket>> {
        Ok(vec![
            S3Bucket {
                bucket_name: "company-logs-archive".to_string(),
                size_bytes: 1_200_000_000_000,
                storage_class: "STANDARD".to_string(),
                last_accessed_days: Some(120),
            },
            S3Bucket {
                bucket_name: "app-assets-prod".to_string(),
                size_bytes: 500_000_000_000,
                storage_class: "STANDARD".to_string(),
                last_accessed_days: Some(2),
            },
        ])
    }

    async fn list_rds_instances(&self) -> CloudClientResult<Vec<RdsInstance>> {
        Ok(vec![
            RdsInstance {
                instance_id: "db-prod-primary".to_string(),
                instance_class: "db.m5.large".to_string(),
                status: "available".to_string(),
                avg_cpu_percent: 45.0,
                avg_connections: 120.0,
            },
            RdsInstance {
                instance_id: "db-analytics-replica".to_string(),
                instance_class: "db.t3.medium".to_string(),
                status: "available".to_string(),
                avg_cpu_percent: 3.0,
                avg_connections: 1.0,
            },
        ])
    }

    async fn list_lambda_functions(&self) -> CloudClientResult<Vec<LambdaFunction>> {
        Ok(vec![
            LambdaFunction {
                function_name: "process-images".to_string(),
                memory_mb: 256,
                timeout_sec: 30,
                avg_invocations_per_day: 500.0,
                avg_duration_ms: 80.0,
            },
            LambdaFunction {
                function_name: "legacy-batch-job".to_string(),
                memory_mb: 1024,
                timeout_sec: 300,
                avg_invocations_per_day: 0.0,
                avg_duration_ms: 0.0,
            },
            LambdaFunction {
                function_name: "webhook-handler".to_string(),
                memory_mb: 1024,
                timeout_sec: 10,
                avg_invocations_per_day: 1000.0,
                avg_duration_ms: 50.0,
            },
        ])
    }

    async fn list_load_balancers(&self) -> CloudClientResult<Vec<LoadBalancer>> {
        Ok(vec![
            LoadBalancer {
                load_balancer_name: "web-frontend-alb".to_string(),
                load_balancer_type: LoadBalancerType::Alb,
                state: "active".to_string(),
                total_target_count: 3,
                request_count_per_day: 50_000.0,
            },
            LoadBalancer {
                load_balancer_name: "staging-alb".to_string(),
                load_balancer_type: LoadBalancerType::Alb,
                state: "active".to_string(),
                total_target_count: 0,
                request_count_per_day: 0.0,
            },
            LoadBalancer {
                load_balancer_name: "internal-nlb".to_string(),
                load_balancer_type: LoadBalancerType::Nlb,
                state: "active".to_string(),
                total_target_count: 2,
                request_count_per_day: 0.0,
            },
        ])
    }

    async fn list_nat_gateways(&self) -> CloudClientResult<Vec<NatGateway>> {
        Ok(vec![
            NatGateway {
                nat_gateway_id: "nat-0a1b2c3d4e5f00001".to_string(),
                state: "available".to_string(),
                bytes_processed_per_day: 500_000_000,
            },
            NatGateway {
                nat_gateway_id: "nat-0a1b2c3d4e5f00002".to_string(),
                state: "available".to_string(),
                bytes_processed_per_day: 50_000_000_000,
            },
        ])
    }

    async fn list_elastic_ips(&self) -> CloudClientResult<Vec<ElasticIp>> {
        Ok(vec![
            ElasticIp {
                allocation_id: "eipalloc-0a1b2c3d4e5f00001".to_string(),
                association_id: None,
            },
            ElasticIp {
                allocation_id: "eipalloc-0a1b2c3d4e5f00002".to_string(),
                association_id: Some("eipassoc-0a1b2c3d4e5f00001".to_string()),
            },
        ])
    }

    async fn get_cost_data(&self) -> CloudClientResult<CostData> {
        // by_service first, total derived by summing it.
        let by_service = HashMap::from([
            ("EC2".to_string(), 1_200.50),
            ("S3".to_string(), 340.20),
            ("RDS".to_string(), 890.00),
            ("Lambda".to_string(), 45.30),
            ("NAT Gateway".to_string(), 65.00),
        ]);
        let total_monthly = by_service.values().sum();

        Ok(CostData {
            total_monthly,
            by_service,
        })
    }

    async fn test_connection(&self) -> CloudClientResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud_client::CloudClient;

    fn client() -> MockCloudClient {
        MockCloudClient::new(42, Utc::now())
    }

    #[tokio::test]
    async fn same_seed_and_now_produce_identical_fixtures() {
        let now = Utc::now();
        let a = MockCloudClient::new(7, now);
        let b = MockCloudClient::new(7, now);

        assert_eq!(
            a.list_ec2_instances().await.unwrap(),
            b.list_ec2_instances().await.unwrap()
        );
        assert_eq!(
            a.list_ebs_volumes().await.unwrap(),
            b.list_ebs_volumes().await.unwrap()
        );
    }

    #[tokio::test]
    async fn cost_data_total_is_the_sum_of_by_service() {
        let data = client().get_cost_data().await.unwrap();
        let sum: f64 = data.by_service.values().sum();
        assert!((data.total_monthly - sum).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn cpu_metrics_preserve_requested_id_order() {
        let ids = vec![
            "i-0a1b2c3d4e5f00004".to_string(),
            "i-0a1b2c3d4e5f00001".to_string(),
            "i-unknown".to_string(),
        ];
        let metrics = client().get_ec2_cpu_metrics(&ids).await.unwrap();
        assert_eq!(metrics.len(), 3);
        assert_eq!(metrics[0].avg_cpu_percent, 8.0);
        assert_eq!(metrics[1].avg_cpu_percent, 2.3);
    }
}
