use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumString};
use uuid::Uuid;
use validator::Validate;

/// Connection state of a workspace's cross-account role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceStatus {
    #[default]
    Pending,
    Connected,
    Error,
}

/// Tenant anchor: one AWS account reachable via a cross-account role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub role_arn: String,
    pub aws_account_id: String,
    pub status: WorkspaceStatus,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateWorkspace {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub role_arn: String,
    #[validate(length(min = 1, max = 64))]
    pub aws_account_id: String,
    pub user_id: Uuid,
}

/// Lifecycle state of one scheduler attempt against one workspace.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobRunStatus {
    #[default]
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRun {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub status: JobRunStatus,
    pub recommendations_found: i32,
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// A resource exactly as surfaced by one of the sixteen service collectors,
/// prior to cost attachment or persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub resource_id: String,
    pub arn: Option<String>,
    pub service: String,
    pub resource_type: Option<String>,
    pub name: Option<String>,
    pub tags: HashMap<String, String>,
    pub state: Option<String>,
    pub estimated_monthly_cost: Option<f64>,
    pub metadata: serde_json::Value,
}

/// A cloud object observed in a workspace. Identity: (workspace_id, resource_id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub resource_id: String,
    pub arn: Option<String>,
    pub service: String,
    pub resource_type: Option<String>,
    pub name: Option<String>,
    pub tags: HashMap<String, String>,
    pub state: Option<String>,
    pub estimated_monthly_cost: Option<f64>,
    pub metadata: serde_json::Value,
    pub last_seen_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A resource is soft-deleted once unseen for this long.
pub const STALE_RESOURCE_AFTER_SECS: i64 = 3600;

/// State written onto a resource by the stale sweep.
pub const NOT_FOUND_STATE: &str = "not-found";

/// Closed set of recommendation categories the analyzer library can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RecommendationType {
    #[default]
    Ec2DownSize,
    EbsOrphan,
    S3Lifecycle,
    RdsDownSize,
    LambdaUnused,
    LambdaOversized,
    ElbNoTargets,
    ElbNoTraffic,
    EipUnassociated,
    NatGwIdle,
}

impl RecommendationType {
    pub const fn as_code(self) -> &'static str {
        match self {
            Self::Ec2DownSize => "EC2_DOWN_SIZE",
            Self::EbsOrphan => "EBS_ORPHAN",
            Self::S3Lifecycle => "S3_LIFECYCLE",
            Self::RdsDownSize => "RDS_DOWN_SIZE",
            Self::LambdaUnused => "LAMBDA_UNUSED",
            Self::LambdaOversized => "LAMBDA_OVERSIZED",
            Self::ElbNoTargets => "ELB_NO_TARGETS",
            Self::ElbNoTraffic => "ELB_NO_TRAFFIC",
            Self::EipUnassociated => "EIP_UNASSOCIATED",
            Self::NatGwIdle => "NAT_GW_IDLE",
        }
    }
}

impl std::fmt::Display for RecommendationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_code())
    }
}

impl std::str::FromStr for RecommendationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EC2_DOWN_SIZE" => Ok(Self::Ec2DownSize),
            "EBS_ORPHAN" => Ok(Self::EbsOrphan),
            "S3_LIFECYCLE" => Ok(Self::S3Lifecycle),
            "RDS_DOWN_SIZE" => Ok(Self::RdsDownSize),
            "LAMBDA_UNUSED" => Ok(Self::LambdaUnused),
            "LAMBDA_OVERSIZED" => Ok(Self::LambdaOversized),
            "ELB_NO_TARGETS" => Ok(Self::ElbNoTargets),
            "ELB_NO_TRAFFIC" => Ok(Self::ElbNoTraffic),
            "EIP_UNASSOCIATED" => Ok(Self::EipUnassociated),
            "NAT_GW_IDLE" => Ok(Self::NatGwIdle),
            other => Err(format!("unknown recommendation type: {other}")),
        }
    }
}

/// Three-level qualitative certainty label surfaced to the end user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecommendationStatus {
    #[default]
    New,
    Acknowledged,
    Dismissed,
}

/// A detected optimization opportunity. Identity: (workspace_id, resource_id, type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub resource_id: String,
    pub recommendation_type: RecommendationType,
    pub description: String,
    pub estimated_monthly_savings: f64,
    pub confidence: Confidence,
    pub status: RecommendationStatus,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upsert input produced by an analyzer, prior to the status-preserving merge.
#[derive(Debug, Clone)]
pub struct RecommendationUpsert {
    pub resource_id: String,
    pub recommendation_type: RecommendationType,
    pub description: String,
    pub estimated_monthly_savings: f64,
    pub confidence: Confidence,
    pub metadata: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn recommendation_type_round_trips_through_its_wire_code() {
        for code in [
            RecommendationType::Ec2DownSize,
            RecommendationType::EbsOrphan,
            RecommendationType::S3Lifecycle,
            RecommendationType::RdsDownSize,
            RecommendationType::LambdaUnused,
            RecommendationType::LambdaOversized,
            RecommendationType::ElbNoTargets,
            RecommendationType::ElbNoTraffic,
            RecommendationType::EipUnassociated,
            RecommendationType::NatGwIdle,
        ] {
            let parsed = RecommendationType::from_str(code.as_code()).unwrap();
            assert_eq!(parsed, code);
        }
    }

    #[test]
    fn unknown_recommendation_code_is_rejected() {
        assert!(RecommendationType::from_str("NOT_A_CODE").is_err());
    }

    #[test]
    fn workspace_status_defaults_to_pending() {
        assert_eq!(WorkspaceStatus::default(), WorkspaceStatus::Pending);
    }
}
