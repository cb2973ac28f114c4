use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Workspaces::Table)
                    .if_not_exists()
                    .col(pk_uuid(Workspaces::Id))
                    .col(string_len(Workspaces::Name, 255))
                    .col(string_len(Workspaces::RoleArn, 255))
                    .col(string_len(Workspaces::AwsAccountId, 64))
                    .col(string_len(Workspaces::Status, 20).default("pending"))
                    .col(uuid(Workspaces::UserId))
                    .col(
                        timestamp_with_time_zone(Workspaces::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Workspaces::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_workspaces_user_id")
                    .table(Workspaces::Table)
                    .col(Workspaces::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER workspaces_touch_updated_at
                    BEFORE UPDATE ON workspaces
                    FOR EACH ROW
                    EXECUTE FUNCTION util.touch_updated_at()
                "#,
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JobRuns::Table)
                    .if_not_exists()
                    .col(pk_uuid(JobRuns::Id))
                    .col(uuid(JobRuns::WorkspaceId))
                    .col(string_len(JobRuns::Status, 20).default("running"))
                    .col(integer(JobRuns::RecommendationsFound).default(0))
                    .col(text_null(JobRuns::ErrorMessage))
                    .col(timestamp_with_time_zone(JobRuns::StartedAt))
                    .col(timestamp_with_time_zone_null(JobRuns::CompletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_job_runs_workspace_id")
                            .from(JobRuns::Table, JobRuns::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_job_runs_workspace_started_at")
                    .table(JobRuns::Table)
                    .col(JobRuns::WorkspaceId)
                    .col(JobRuns::StartedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Resources::Table)
                    .if_not_exists()
                    .col(pk_uuid(Resources::Id))
                    .col(uuid(Resources::WorkspaceId))
                    .col(string_len(Resources::ResourceId, 255))
                    .col(string_len_null(Resources::Arn, 512))
                    .col(string_len(Resources::Service, 50))
                    .col(string_len_null(Resources::ResourceType, 100))
                    .col(string_len_null(Resources::Name, 255))
                    .col(json_binary(Resources::Tags).default("{}"))
                    .col(string_len_null(Resources::State, 50))
                    .col(double_null(Resources::EstimatedMonthlyCost))
                    .col(json_binary(Resources::Metadata).default("{}"))
                    .col(timestamp_with_time_zone(Resources::LastSeenAt))
                    .col(
                        timestamp_with_time_zone(Resources::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Resources::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_resources_workspace_id")
                            .from(Resources::Table, Resources::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("unique_resource_per_workspace")
                    .table(Resources::Table)
                    .col(Resources::WorkspaceId)
                    .col(Resources::ResourceId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_resources_workspace_last_seen_at")
                    .table(Resources::Table)
                    .col(Resources::WorkspaceId)
                    .col(Resources::LastSeenAt)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER resources_touch_updated_at
                    BEFORE UPDATE ON resources
                    FOR EACH ROW
                    EXECUTE FUNCTION util.touch_updated_at()
                "#,
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Recommendations::Table)
                    .if_not_exists()
                    .col(pk_uuid(Recommendations::Id))
                    .col(uuid(Recommendations::WorkspaceId))
                    .col(string_len(Recommendations::ResourceId, 255))
                    .col(string_len(Recommendations::RecommendationType, 50))
                    .col(text(Recommendations::Description))
                    .col(double(Recommendations::EstimatedMonthlySavings))
                    .col(string_len(Recommendations::Confidence, 10))
                    .col(string_len(Recommendations::Status, 20).default("new"))
                    .col(json_binary(Recommendations::Metadata).default("{}"))
                    .col(
                        timestamp_with_time_zone(Recommendations::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Recommendations::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recommendations_workspace_id")
                            .from(Recommendations::Table, Recommendations::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("unique_recommendation_per_resource_type")
                    .table(Recommendations::Table)
                    .col(Recommendations::WorkspaceId)
                    .col(Recommendations::ResourceId)
                    .col(Recommendations::RecommendationType)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER recommendations_touch_updated_at
                    BEFORE UPDATE ON recommendations
                    FOR EACH ROW
                    EXECUTE FUNCTION util.touch_updated_at()
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                "DROP TRIGGER IF EXISTS recommendations_touch_updated_at ON recommendations",
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Recommendations::Table).to_owned())
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP TRIGGER IF EXISTS resources_touch_updated_at ON resources")
            .await?;
        manager
            .drop_table(Table::drop().table(Resources::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(JobRuns::Table).to_owned())
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "DROP TRIGGER IF EXISTS workspaces_touch_updated_at ON workspaces",
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Workspaces::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Workspaces {
    Table,
    Id,
    Name,
    RoleArn,
    AwsAccountId,
    Status,
    UserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum JobRuns {
    Table,
    Id,
    WorkspaceId,
    Status,
    RecommendationsFound,
    ErrorMessage,
    StartedAt,
    CompletedAt,
}

#[derive(DeriveIden)]
enum Resources {
    Table,
    Id,
    WorkspaceId,
    ResourceId,
    Arn,
    Service,
    ResourceType,
    Name,
    Tags,
    State,
    EstimatedMonthlyCost,
    Metadata,
    LastSeenAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Recommendations {
    Table,
    Id,
    WorkspaceId,
    ResourceId,
    RecommendationType,
    Description,
    EstimatedMonthlySavings,
    Confidence,
    Status,
    Metadata,
    CreatedAt,
    UpdatedAt,
}
