//! Repository-level invariant tests for `PgFinopsRepository`, run against
//! a real Postgres via `test_utils::TestDatabase` — the same
//! container-per-test pattern `domains/projects/tests` uses.

use chrono::Utc;
use domain_finops::models::{
    Confidence, CreateWorkspace, RecommendationStatus, RecommendationType, RecommendationUpsert,
    ResourceRecord,
};
use domain_finops::repository::FinopsRepository;
use domain_finops::PgFinopsRepository;
use std::collections::HashMap;
use test_utils::{TestDataBuilder, TestDatabase};

fn resource_record(resource_id: &str, cost: Option<f64>) -> ResourceRecord {
    ResourceRecord {
        resource_id: resource_id.to_string(),
        arn: None,
        service: "EC2".to_string(),
        resource_type: Some("t3.medium".to_string()),
        name: Some("api-backend".to_string()),
        tags: HashMap::new(),
        state: Some("running".to_string()),
        estimated_monthly_cost: cost,
        metadata: serde_json::json!({}),
    }
}

fn recommendation(resource_id: &str, description: &str) -> RecommendationUpsert {
    RecommendationUpsert {
        resource_id: resource_id.to_string(),
        recommendation_type: RecommendationType::Ec2DownSize,
        description: description.to_string(),
        estimated_monthly_savings: 12.34,
        confidence: Confidence::Medium,
        metadata: serde_json::json!({}),
    }
}

#[tokio::test]
async fn upsert_resource_preserves_created_at_and_overwrites_descriptive_fields() {
    let db = TestDatabase::new().await;
    let repo = PgFinopsRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("finops_upsert_resource");

    let workspace = repo
        .create_workspace(CreateWorkspace {
            name: builder.name("workspace", "upsert"),
            role_arn: "arn:aws:iam::123456789012:role/finops".to_string(),
            aws_account_id: "123456789012".to_string(),
            user_id: builder.user_id(),
        })
        .await
        .unwrap();

    let t1 = Utc::now();
    let first = repo
        .upsert_resource(workspace.id, resource_record("i-abc", Some(30.37)), t1)
        .await
        .unwrap();
    assert_eq!(first.created_at, first.last_seen_at);

    let t2 = t1 + chrono::Duration::minutes(5);
    let mut updated_record = resource_record("i-abc", Some(15.0));
    updated_record.name = Some("renamed-instance".to_string());
    let second = repo
        .upsert_resource(workspace.id, updated_record, t2)
        .await
        .unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, first.created_at);
    assert_eq!(second.last_seen_at, t2);
    assert_eq!(second.name.as_deref(), Some("renamed-instance"));
    assert_eq!(second.estimated_monthly_cost, Some(15.0));
}

#[tokio::test]
async fn upsert_resource_keeps_existing_cost_when_new_value_is_none() {
    let db = TestDatabase::new().await;
    let repo = PgFinopsRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("finops_upsert_resource_cost_none");

    let workspace = repo
        .create_workspace(CreateWorkspace {
            name: builder.name("workspace", "cost-none"),
            role_arn: "arn:aws:iam::123456789012:role/finops".to_string(),
            aws_account_id: "123456789012".to_string(),
            user_id: builder.user_id(),
        })
        .await
        .unwrap();

    let now = Utc::now();
    repo.upsert_resource(workspace.id, resource_record("i-def", Some(30.37)), now)
        .await
        .unwrap();

    let second = repo
        .upsert_resource(workspace.id, resource_record("i-def", None), now)
        .await
        .unwrap();

    assert_eq!(second.estimated_monthly_cost, Some(30.37));
}

#[tokio::test]
async fn recommendation_status_survives_a_rerun_with_refreshed_description() {
    let db = TestDatabase::new().await;
    let repo = PgFinopsRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("finops_recommendation_status");

    let workspace = repo
        .create_workspace(CreateWorkspace {
            name: builder.name("workspace", "rec-status"),
            role_arn: "arn:aws:iam::123456789012:role/finops".to_string(),
            aws_account_id: "123456789012".to_string(),
            user_id: builder.user_id(),
        })
        .await
        .unwrap();

    let now = Utc::now();
    let created = repo
        .upsert_recommendation(workspace.id, recommendation("i-abc", "first pass"), now)
        .await
        .unwrap();
    assert_eq!(created.status, RecommendationStatus::New);

    // Simulate a user dismissing it directly (out-of-band of the engine).
    let dismissed = dismiss(&db, created.id).await;
    assert_eq!(dismissed.status, RecommendationStatus::Dismissed);

    let rerun = repo
        .upsert_recommendation(
            workspace.id,
            recommendation("i-abc", "second pass, still cheap to downsize"),
            now + chrono::Duration::minutes(1),
        )
        .await
        .unwrap();

    assert_eq!(rerun.id, created.id);
    assert_eq!(rerun.status, RecommendationStatus::Dismissed);
    assert_eq!(rerun.description, "second pass, still cheap to downsize");
}

#[tokio::test]
async fn stale_sweep_marks_unseen_resources_not_found_without_deleting_them() {
    let db = TestDatabase::new().await;
    let repo = PgFinopsRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("finops_stale_sweep");

    let workspace = repo
        .create_workspace(CreateWorkspace {
            name: builder.name("workspace", "stale"),
            role_arn: "arn:aws:iam::123456789012:role/finops".to_string(),
            aws_account_id: "123456789012".to_string(),
            user_id: builder.user_id(),
        })
        .await
        .unwrap();

    let two_hours_ago = Utc::now() - chrono::Duration::hours(2);
    repo.upsert_resource(workspace.id, resource_record("i-stale", Some(10.0)), two_hours_ago)
        .await
        .unwrap();

    let now = Utc::now();
    let touched = repo
        .sweep_stale_resources(workspace.id, now - chrono::Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(touched, 1);

    let resources = repo.list_resources(workspace.id).await.unwrap();
    assert_eq!(resources.len(), 1, "soft delete must not remove the row");
    assert_eq!(resources[0].state.as_deref(), Some("not-found"));
}

#[tokio::test]
async fn resources_seen_within_the_last_hour_are_not_swept() {
    let db = TestDatabase::new().await;
    let repo = PgFinopsRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("finops_fresh_resource_not_swept");

    let workspace = repo
        .create_workspace(CreateWorkspace {
            name: builder.name("workspace", "fresh"),
            role_arn: "arn:aws:iam::123456789012:role/finops".to_string(),
            aws_account_id: "123456789012".to_string(),
            user_id: builder.user_id(),
        })
        .await
        .unwrap();

    let now = Utc::now();
    repo.upsert_resource(workspace.id, resource_record("i-fresh", Some(10.0)), now)
        .await
        .unwrap();

    let touched = repo
        .sweep_stale_resources(workspace.id, now - chrono::Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(touched, 0);

    let resources = repo.list_resources(workspace.id).await.unwrap();
    assert_eq!(resources[0].state.as_deref(), Some("running"));
}

/// Flips a recommendation's status directly via SQL, bypassing the engine —
/// standing in for the HTTP API's acknowledge/dismiss endpoint, which is out
/// of scope for this crate.
async fn dismiss(db: &TestDatabase, id: uuid::Uuid) -> domain_finops::models::Recommendation {
    use sea_orm::{ActiveModelTrait, EntityTrait, Set};
    let existing = domain_finops::entity::recommendations::Entity::find_by_id(id)
        .one(&db.connection())
        .await
        .unwrap()
        .unwrap();
    let mut active: domain_finops::entity::recommendations::ActiveModel = existing.into();
    active.status = Set(RecommendationStatus::Dismissed.to_string());
    let model = active.update(&db.connection()).await.unwrap();
    model.into()
}
