//! AWS-backed [`CloudClient`]. One instance is scoped to exactly one
//! workspace's cross-account role; the credential cache below is never
//! shared across workspaces.
//!
//! Role assumption happens at most once per instance, guarded by a
//! [`tokio::sync::OnceCell`]: the first caller to reach [`Self::credentials`]
//! pays the `AssumeRole` round-trip, every later caller (including ones
//! racing on the same tick) observes the cached value. No explicit lock is
//! taken; `OnceCell` already serializes the one initializing future.

use std::time::SystemTime;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;
use chrono::{DateTime, Datelike, Utc};
use tokio::sync::OnceCell;

use domain_finops::descriptors::{
    CostData, Ec2CpuMetric, Ec2Instance, EbsVolume, ElasticIp, LambdaFunction, LoadBalancer,
    LoadBalancerType, NatGateway, RdsInstance, S3Bucket,
};

use super::{CloudClientError, CloudClientResult};

const SESSION_NAME: &str = "finops-dashboard";
const SESSION_DURATION_SECS: i32 = 3600;
const CPU_METRIC_WINDOW_DAYS: i64 = 14;

fn to_chrono(dt: &aws_smithy_types::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()).unwrap_or_else(Utc::now)
}

pub struct LiveCloudClient {
    role_arn: String,
    region: String,
    sts_client: aws_sdk_sts::Client,
    credentials: OnceCell<Credentials>,
}

impl LiveCloudClient {
    pub async fn new(role_arn: String, region: String) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region.clone()))
            .load()
            .await;

        Self {
            role_arn,
            region,
            sts_client: aws_sdk_sts::Client::new(&sdk_config),
            credentials: OnceCell::new(),
        }
    }

    async fn credentials(&self) -> CloudClientResult<Credentials> {
        self.credentials
            .get_or_try_init(|| async {
                let output = self
                    .sts_client
                    .assume_role()
                    .role_arn(&self.role_arn)
                    .role_session_name(SESSION_NAME)
                    .duration_seconds(SESSION_DURATION_SECS)
                    .send()
                    .await
                    .map_err(|err| CloudClientError::AssumeRole {
                        role_arn: self.role_arn.clone(),
                        details: err.to_string(),
                    })?;

                let creds =
                    output
                        .credentials()
                        .ok_or_else(|| CloudClientError::AssumeRole {
                            role_arn: self.role_arn.clone(),
                            details: "assume-role response carried no credentials".to_string(),
                        })?;

                let expiration: SystemTime =
                    creds.expiration().clone().try_into().map_err(|_| {
                        CloudClientError::AssumeRole {
                            role_arn: self.role_arn.clone(),
                            details: "assumed credentials carried an unrepresentable expiration"
                                .to_string(),
                        }
                    })?;

                Ok(Credentials::new(
                    creds.access_key_id(),
                    creds.secret_access_key(),
                    Some(creds.session_token().to_string()),
                    Some(expiration),
                    "finops-assumed-role",
                ))
            })
            .await
            .cloned()
    }

    /// Per-service SDK config scoped to the assumed role. Cheap: no network
    /// I/O, just wraps the already-cached credentials.
    async fn scoped_config(&self) -> CloudClientResult<aws_config::SdkConfig> {
        let creds = self.credentials().await?;
        Ok(aws_config::SdkConfig::builder()
            .region(aws_config::Region::new(self.region.clone()))
            .credentials_provider(SharedCredentialsProvider::new(creds))
            .behavior_version(BehaviorVersion::latest())
            .build())
    }

    async fn cloudwatch_average(
        &self,
        namespace: &str,
        metric_name: &str,
        dimension_name: &str,
        dimension_value: &str,
        stat: aws_sdk_cloudwatch::types::Statistic,
        window_days: i64,
    ) -> CloudClientResult<f64> {
        let config = self.scoped_config().await?;
        let client = aws_sdk_cloudwatch::Client::new(&config);
        let now = Utc::now();
        let start = now - chrono::Duration::days(window_days);

        let output = client
            .get_metric_statistics()
            .namespace(namespace)
            .metric_name(metric_name)
            .dimensions(
                aws_sdk_cloudwatch::types::Dimension::builder()
                    .name(dimension_name)
                    .value(dimension_value)
                    .build(),
            )
            .start_time(aws_smithy_types::DateTime::from_secs(start.timestamp()))
            .end_time(aws_smithy_types::DateTime::from_secs(now.timestamp()))
            .period((window_days * 86_400) as i32)
            .statistics(stat)
            .send()
            .await
            .map_err(|err| CloudClientError::Request {
                service: "CloudWatch",
                source: Box::new(err),
            })
            .ok();

        Ok(output
            .and_then(|out| out.datapoints().first().cloned())
            .and_then(|point| point.average().or(point.sum()).or(point.maximum()))
            .unwrap_or(0.0))
    }
}

#[async_trait]
impl super::CloudClient for LiveCloudClient {
    async fn list_ec2_instances(&self) -> CloudClientResult<Vec<Ec2Instance>> {
        let config = self.scoped_config().await?;
        let client = aws_sdk_ec2::Client::new(&config);
        let mut out = Vec::new();

        let mut pages = client.describe_instances().into_paginator().send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| CloudClientError::Request {
                service: "EC2",
                source: Box::new(err),
            })?;
            for reservation in page.reservations() {
                for instance in reservation.instances() {
                    let name = instance
                        .tags()
                        .iter()
                        .find(|tag| tag.key() == Some("Name"))
                        .and_then(|tag| tag.value())
                        .map(str::to_string);
                    out.push(Ec2Instance {
                        instance_id: instance.instance_id().unwrap_or_default().to_string(),
                        instance_type: instance
                            .instance_type()
                            .map(|t| t.as_str().to_string())
                            .unwrap_or_default(),
                        state: instance
                            .state()
                            .and_then(|s| s.name())
                            .map(|n| n.as_str().to_string())
                            .unwrap_or_default(),
                        name,
                    });
                }
            }
        }

        Ok(out)
    }

    async fn get_ec2_cpu_metrics(
        &self,
        instance_ids: &[String],
    ) -> CloudClientResult<Vec<Ec2CpuMetric>> {
        let mut out = Vec::with_capacity(instance_ids.len());
        for id in instance_ids {
            let avg = self
                .cloudwatch_average(
                    "AWS/EC2",
                    "CPUUtilization",
                    "InstanceId",
                    id,
                    aws_sdk_cloudwatch::types::Statistic::Average,
                    CPU_METRIC_WINDOW_DAYS,
                )
                .await?;
            let max = self
                .cloudwatch_average(
                    "AWS/EC2",
                    "CPUUtilization",
                    "InstanceId",
                    id,
                    aws_sdk_cloudwatch::types::Statistic::Maximum,
                    CPU_METRIC_WINDOW_DAYS,
                )
                .await?;
            out.push(Ec2CpuMetric {
                period_days: CPU_METRIC_WINDOW_DAYS as u32,
                avg_cpu_percent: avg,
                max_cpu_percent: max,
            });
        }
        Ok(out)
    }

    async fn list_ebs_volumes(&self) -> CloudClientResult<Vec<EbsVolume>> {
        let config = self.scoped_config().await?;
        let client = aws_sdk_ec2::Client::new(&config);
        let mut out = Vec::new();

        let mut pages = client.describe_volumes().into_paginator().send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| CloudClientError::Request {
                service: "EBS",
                source: Box::new(err),
            })?;
            for volume in page.volumes() {
                out.push(EbsVolume {
                    volume_id: volume.volume_id().unwrap_or_default().to_string(),
                    volume_type: volume
                        .volume_type()
                        .map(|t| t.as_str().to_string())
                        .unwrap_or_default(),
                    size_gib: volume.size().unwrap_or_default() as f64,
                    state: volume
                        .state()
                        .map(|s| s.as_str().to_string())
                        .unwrap_or_default(),
                    attachments: volume
                        .attachments()
                        .iter()
                        .filter_map(|a| a.instance_id())
                        .map(str::to_string)
                        .collect(),
                    create_time: volume
                        .create_time()
                        .map(to_chrono)
                        .unwrap_or_else(Utc::now),
                });
            }
        }

        Ok(out)
    }

    async fn list_s3_buckets(&self) -> CloudClientResult<Vec<S3Bucket>> {
        let config = self.scoped_config().await?;
        let client = aws_sdk_s3::Client::new(&config);

        let output = client
            .list_buckets()
            .send()
            .await
            .map_err(|err| CloudClientError::Request {
                service: "S3",
                source: Box::new(err),
            })?;

        let mut out = Vec::new();
        for bucket in output.buckets() {
            let Some(name) = bucket.name() else {
                continue;
            };

            // Size is an enrichment call (CloudWatch storage metrics lag up
            // to a day); a failure here falls back to 0 rather than
            // dropping the bucket from the inventory.
            let size_bytes = self
                .cloudwatch_average(
                    "AWS/S3",
                    "BucketSizeBytes",
                    "BucketName",
                    name,
                    aws_sdk_cloudwatch::types::Statistic::Average,
                    1,
                )
                .await
                .unwrap_or(0.0);

            out.push(S3Bucket {
                bucket_name: name.to_string(),
                size_bytes: size_bytes as u64,
                storage_class: "STANDARD".to_string(),
                // Last-access tracking requires S3 Storage Lens / inventory
                // reports that are not universally enabled; left unknown
                // rather than guessed.
                last_accessed_days: None,
            });
        }

        Ok(out)
    }

    async fn list_rds_instances(&self) -> CloudClientResult<Vec<RdsInstance>> {
        let config = self.scoped_config().await?;
        let client = aws_sdk_rds::Client::new(&config);
        let mut out = Vec::new();

        let mut pages = client.describe_db_instances().into_paginator().send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| CloudClientError::Request {
                service: "RDS",
                source: Box::new(err),
            })?;
            for db in page.db_instances() {
                let instance_id = db
                    .db_instance_identifier()
                    .unwrap_or_default()
                    .to_string();

                let avg_cpu = self
                    .cloudwatch_average(
                        "AWS/RDS",
                        "CPUUtilization",
                        "DBInstanceIdentifier",
                        &instance_id,
                        aws_sdk_cloudwatch::types::Statistic::Average,
                        CPU_METRIC_WINDOW_DAYS,
                    )
                    .await
                    .unwrap_or(0.0);
                let avg_connections = self
                    .cloudwatch_average(
                        "AWS/RDS",
                        "DatabaseConnections",
                        "DBInstanceIdentifier",
                        &instance_id,
                        aws_sdk_cloudwatch::types::Statistic::Average,
                        CPU_METRIC_WINDOW_DAYS,
                    )
                    .await
                    .unwrap_or(0.0);

                out.push(RdsInstance {
                    instance_id,
                    instance_class: db.db_instance_class().unwrap_or_default().to_string(),
                    status: db.db_instance_status().unwrap_or_default().to_string(),
                    avg_cpu_percent: avg_cpu,
                    avg_connections,
                });
            }
        }

        Ok(out)
    }

    async fn list_lambda_functions(&self) -> CloudClientResult<Vec<LambdaFunction>> {
        let config = self.scoped_config().await?;
        let client = aws_sdk_lambda::Client::new(&config);
        let mut out = Vec::new();

        let mut pages = client.list_functions().into_paginator().send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| CloudClientError::Request {
                service: "Lambda",
                source: Box::new(err),
            })?;
            for function in page.functions() {
                let function_name = function.function_name().unwrap_or_default().to_string();

                let invocations = self
                    .cloudwatch_average(
                        "AWS/Lambda",
                        "Invocations",
                        "FunctionName",
                        &function_name,
                        aws_sdk_cloudwatch::types::Statistic::Sum,
                        CPU_METRIC_WINDOW_DAYS,
                    )
                    .await
                    .unwrap_or(0.0);
                let avg_duration = self
                    .cloudwatch_average(
                        "AWS/Lambda",
                        "Duration",
                        "FunctionName",
                        &function_name,
                        aws_sdk_cloudwatch::types::Statistic::Average,
                        CPU_METRIC_WINDOW_DAYS,
                    )
                    .await
                    .unwrap_or(0.0);

                out.push(LambdaFunction {
                    function_name,
                    memory_mb: function.memory_size().unwrap_or_default() as u32,
                    timeout_sec: function.timeout().unwrap_or_default() as u32,
                    avg_invocations_per_day: invocations / CPU_METRIC_WINDOW_DAYS as f64,
                    avg_duration_ms: avg_duration,
                });
            }
        }

        Ok(out)
    }

    async fn list_load_balancers(&self) -> CloudClientResult<Vec<LoadBalancer>> {
        let config = self.scoped_config().await?;
        let client = aws_sdk_elasticloadbalancingv2::Client::new(&config);
        let mut out = Vec::new();

        let mut pages = client.describe_load_balancers().into_paginator().send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| CloudClientError::Request {
                service: "ELB",
                source: Box::new(err),
            })?;
            for lb in page.load_balancers() {
                let name = lb.load_balancer_name().unwrap_or_default().to_string();
                let arn = lb.load_balancer_arn().unwrap_or_default().to_string();

                let lb_type = match lb.r#type() {
                    Some(aws_sdk_elasticloadbalancingv2::types::LoadBalancerTypeEnum::Network) => {
                        LoadBalancerType::Nlb
                    }
                    _ => LoadBalancerType::Alb,
                };

                // Target-group enumeration is best-effort enrichment: a
                // failure here falls back to zero targets rather than
                // dropping the load balancer.
                let total_target_count = client
                    .describe_target_groups()
                    .load_balancer_arn(&arn)
                    .send()
                    .await
                    .ok()
                    .map(|out| out.target_groups().len() as u32)
                    .unwrap_or(0);

                let request_count = self
                    .cloudwatch_average(
                        "AWS/ApplicationELB",
                        "RequestCount",
                        "LoadBalancer",
                        &name,
                        aws_sdk_cloudwatch::types::Statistic::Sum,
                        1,
                    )
                    .await
                    .unwrap_or(0.0);

                out.push(LoadBalancer {
                    load_balancer_name: name,
                    load_balancer_type: lb_type,
                    state: lb
                        .state()
                        .and_then(|s| s.code())
                        .map(|c| c.as_str().to_string())
                        .unwrap_or_default(),
                    total_target_count,
                    request_count_per_day: request_count,
                });
            }
        }

        Ok(out)
    }

    async fn list_nat_gateways(&self) -> CloudClientResult<Vec<NatGateway>> {
        let config = self.scoped_config().await?;
        let client = aws_sdk_ec2::Client::new(&config);
        let mut out = Vec::new();

        let mut pages = client.describe_nat_gateways().into_paginator().send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| CloudClientError::Request {
                service: "NAT Gateway",
                source: Box::new(err),
            })?;
            for gw in page.nat_gateways() {
                let id = gw.nat_gateway_id().unwrap_or_default().to_string();

                let bytes_out = self
                    .cloudwatch_average(
                        "AWS/NATGateway",
                        "BytesOutToDestination",
                        "NatGatewayId",
                        &id,
                        aws_sdk_cloudwatch::types::Statistic::Sum,
                        1,
                    )
                    .await
                    .unwrap_or(0.0);
                let bytes_in = self
                    .cloudwatch_average(
                        "AWS/NATGateway",
                        "BytesInFromSource",
                        "NatGatewayId",
                        &id,
                        aws_sdk_cloudwatch::types::Statistic::Sum,
                        1,
                    )
                    .await
                    .unwrap_or(0.0);

                out.push(NatGateway {
                    nat_gateway_id: id,
                    state: gw
                        .state()
                        .map(|s| s.as_str().to_string())
                        .unwrap_or_default(),
                    bytes_processed_per_day: (bytes_out + bytes_in) as u64,
                });
            }
        }

        Ok(out)
    }

    async fn list_elastic_ips(&self) -> CloudClientResult<Vec<ElasticIp>> {
        let config = self.scoped_config().await?;
        let client = aws_sdk_ec2::Client::new(&config);

        let output = client
            .describe_addresses()
            .send()
            .await
            .map_err(|err| CloudClientError::Request {
                service: "Elastic IP",
                source: Box::new(err),
            })?;

        Ok(output
            .addresses()
            .iter()
            .map(|addr| ElasticIp {
                allocation_id: addr.allocation_id().unwrap_or_default().to_string(),
                association_id: addr.association_id().map(str::to_string),
            })
            .collect())
    }

    async fn get_cost_data(&self) -> CloudClientResult<CostData> {
        let config = self.scoped_config().await?;
        let client = aws_sdk_costexplorer::Client::new(&config);

        let now = Utc::now();
        let month_start = now
            .with_day(1)
            .unwrap_or(now)
            .format("%Y-%m-%d")
            .to_string();
        let today = now.format("%Y-%m-%d").to_string();

        let output = client
            .get_cost_and_usage()
            .time_period(
                aws_sdk_costexplorer::types::DateInterval::builder()
                    .start(month_start)
                    .end(today)
                    .build()
                    .map_err(|err| CloudClientError::UnexpectedResponse {
                        service: "Cost Explorer",
                        details: err.to_string(),
                    })?,
            )
            .granularity(aws_sdk_costexplorer::types::Granularity::Monthly)
            .metrics("UnblendedCost")
            .group_by(
                aws_sdk_costexplorer::types::GroupDefinition::builder()
                    .r#type(aws_sdk_costexplorer::types::GroupDefinitionType::Dimension)
                    .key("SERVICE")
                    .build(),
            )
            .send()
            .await
            .map_err(|err| CloudClientError::Request {
                service: "Cost Explorer",
                source: Box::new(err),
            })?;

        // by_service is built first, total is the sum — never the other
        // way around.
        let mut by_service = std::collections::HashMap::new();
        for result in output.results_by_time() {
            for group in result.groups() {
                let Some(service_name) = group.keys().first() else {
                    continue;
                };
                let amount = group
                    .metrics()
                    .and_then(|m| m.get("UnblendedCost"))
                    .and_then(|m| m.amount())
                    .and_then(|a| a.parse::<f64>().ok())
                    .unwrap_or(0.0);
                *by_service.entry(service_name.clone()).or_insert(0.0) += amount;
            }
        }
        let total_monthly = by_service.values().sum();

        Ok(CostData {
            total_monthly,
            by_service,
        })
    }

    async fn test_connection(&self) -> CloudClientResult<bool> {
        self.credentials().await?;
        Ok(true)
    }
}
