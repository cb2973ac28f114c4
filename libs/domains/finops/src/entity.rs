use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ===== Workspaces Entity =====

pub mod workspaces {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "workspaces")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(column_type = "String(StringLen::N(255))")]
        pub name: String,
        #[sea_orm(column_type = "String(StringLen::N(255))")]
        pub role_arn: String,
        #[sea_orm(column_type = "String(StringLen::N(64))")]
        pub aws_account_id: String,
        #[sea_orm(column_type = "String(StringLen::N(20))")]
        pub status: String,
        pub user_id: Uuid,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::resources::Entity")]
        Resources,
        #[sea_orm(has_many = "super::recommendations::Entity")]
        Recommendations,
        #[sea_orm(has_many = "super::job_runs::Entity")]
        JobRuns,
    }

    impl Related<super::resources::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Resources.def()
        }
    }

    impl Related<super::recommendations::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Recommendations.def()
        }
    }

    impl Related<super::job_runs::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::JobRuns.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::Workspace {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                name: model.name,
                role_arn: model.role_arn,
                aws_account_id: model.aws_account_id,
                status: model.status.parse().unwrap_or_default(),
                user_id: model.user_id,
                created_at: model.created_at.into(),
                updated_at: model.updated_at.into(),
            }
        }
    }

    impl From<crate::models::CreateWorkspace> for ActiveModel {
        fn from(input: crate::models::CreateWorkspace) -> Self {
            let now = chrono::Utc::now();
            ActiveModel {
                id: Set(Uuid::now_v7()),
                name: Set(input.name),
                role_arn: Set(input.role_arn),
                aws_account_id: Set(input.aws_account_id),
                status: Set(crate::models::WorkspaceStatus::default().to_string()),
                user_id: Set(input.user_id),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            }
        }
    }
}

// ===== JobRuns Entity =====

pub mod job_runs {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "job_runs")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub workspace_id: Uuid,
        #[sea_orm(column_type = "String(StringLen::N(20))")]
        pub status: String,
        pub recommendations_found: i32,
        #[sea_orm(column_type = "Text", nullable)]
        pub error_message: Option<String>,
        pub started_at: DateTimeWithTimeZone,
        pub completed_at: Option<DateTimeWithTimeZone>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::workspaces::Entity",
            from = "Column::WorkspaceId",
            to = "super::workspaces::Column::Id"
        )]
        Workspace,
    }

    impl Related<super::workspaces::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Workspace.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::JobRun {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                workspace_id: model.workspace_id,
                status: model.status.parse().unwrap_or_default(),
                recommendations_found: model.recommendations_found,
                error_message: model.error_message,
                started_at: model.started_at.into(),
                completed_at: model.completed_at.map(Into::into),
            }
        }
    }
}

// ===== Resources Entity =====

pub mod resources {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "resources")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub workspace_id: Uuid,
        #[sea_orm(column_type = "String(StringLen::N(255))")]
        pub resource_id: String,
        #[sea_orm(column_type = "String(StringLen::N(512))", nullable)]
        pub arn: Option<String>,
        #[sea_orm(column_type = "String(StringLen::N(50))")]
        pub service: String,
        #[sea_orm(column_type = "String(StringLen::N(100))", nullable)]
        pub resource_type: Option<String>,
        #[sea_orm(column_type = "String(StringLen::N(255))", nullable)]
        pub name: Option<String>,
        #[sea_orm(column_type = "JsonBinary")]
        pub tags: serde_json::Value,
        #[sea_orm(column_type = "String(StringLen::N(50))", nullable)]
        pub state: Option<String>,
        pub estimated_monthly_cost: Option<f64>,
        #[sea_orm(column_type = "JsonBinary")]
        pub metadata: serde_json::Value,
        pub last_seen_at: DateTimeWithTimeZone,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::workspaces::Entity",
            from = "Column::WorkspaceId",
            to = "super::workspaces::Column::Id"
        )]
        Workspace,
        #[sea_orm(has_many = "super::recommendations::Entity")]
        Recommendations,
    }

    impl Related<super::workspaces::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Workspace.def()
        }
    }

    impl Related<super::recommendations::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Recommendations.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::Resource {
        fn from(model: Model) -> Self {
            let tags: HashMap<String, String> =
                serde_json::from_value(model.tags).unwrap_or_default();

            Self {
                id: model.id,
                workspace_id: model.workspace_id,
                resource_id: model.resource_id,
                arn: model.arn,
                service: model.service,
                resource_type: model.resource_type,
                name: model.name,
                tags,
                state: model.state,
                estimated_monthly_cost: model.estimated_monthly_cost,
                metadata: model.metadata,
                last_seen_at: model.last_seen_at.into(),
                created_at: model.created_at.into(),
                updated_at: model.updated_at.into(),
            }
        }
    }
}

// ===== Recommendations Entity =====

pub mod recommendations {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "recommendations")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub workspace_id: Uuid,
        #[sea_orm(column_type = "String(StringLen::N(255))")]
        pub resource_id: String,
        #[sea_orm(column_type = "String(StringLen::N(50))")]
        pub recommendation_type: String,
        #[sea_orm(column_type = "Text")]
        pub description: String,
        pub estimated_monthly_savings: f64,
        #[sea_orm(column_type = "String(StringLen::N(10))")]
        pub confidence: String,
        #[sea_orm(column_type = "String(StringLen::N(20))")]
        pub status: String,
        #[sea_orm(column_type = "JsonBinary")]
        pub metadata: serde_json::Value,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::workspaces::Entity",
            from = "Column::WorkspaceId",
            to = "super::workspaces::Column::Id"
        )]
        Workspace,
    }

    impl Related<super::workspaces::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Workspace.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::Recommendation {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                workspace_id: model.workspace_id,
                resource_id: model.resource_id,
                recommendation_type: model.recommendation_type.parse().unwrap_or_default(),
                description: model.description,
                estimated_monthly_savings: model.estimated_monthly_savings,
                confidence: model.confidence.parse().unwrap_or_default(),
                status: model.status.parse().unwrap_or_default(),
                metadata: model.metadata,
                created_at: model.created_at.into(),
                updated_at: model.updated_at.into(),
            }
        }
    }
}

pub use job_runs::Entity as JobRunsEntity;
pub use recommendations::Entity as RecommendationsEntity;
pub use resources::Entity as ResourcesEntity;
pub use workspaces::Entity as WorkspacesEntity;
