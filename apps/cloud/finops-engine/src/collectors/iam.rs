//! Roles, users, and customer-managed policies. Roles are bounded at 200
//! records for performance — IAM accounts can carry thousands of
//! service-linked roles that add little FinOps signal.

use domain_finops::models::ResourceRecord;

use super::{blank_record, CollectorContext};

const MAX_ROLES: usize = 200;

pub async fn collect(ctx: CollectorContext) -> Result<Vec<ResourceRecord>, String> {
    let client = aws_sdk_iam::Client::new(&ctx.config);
    let mut out = Vec::new();

    let mut pages = client.list_roles().into_paginator().items().send();
    while let Some(role) = pages.next().await {
        if out.len() >= MAX_ROLES {
            break;
        }
        let role = role.map_err(|err| err.to_string())?;
        out.push(ResourceRecord {
            arn: Some(role.arn.clone()),
            resource_type: Some("Role".to_string()),
            name: Some(role.role_name.clone()),
            state: Some("active".to_string()),
            ..blank_record(role.role_id.clone(), "IAM")
        });
    }

    let mut pages = client.list_users().into_paginator().items().send();
    while let Some(user) = pages.next().await {
        let user = user.map_err(|err| err.to_string())?;
        out.push(ResourceRecord {
            arn: Some(user.arn.clone()),
            resource_type: Some("User".to_string()),
            name: Some(user.user_name.clone()),
            state: Some("active".to_string()),
            ..blank_record(user.user_id.clone(), "IAM")
        });
    }

    let mut pages = client
        .list_policies()
        .scope(aws_sdk_iam::types::PolicyScopeType::Local)
        .into_paginator()
        .items()
        .send();
    while let Some(policy) = pages.next().await {
        let policy = policy.map_err(|err| err.to_string())?;
        let Some(id) = policy.policy_id.clone() else {
            continue;
        };
        out.push(ResourceRecord {
            arn: policy.arn.clone(),
            resource_type: Some("Policy".to_string()),
            name: policy.policy_name.clone(),
            state: Some("active".to_string()),
            ..blank_record(id, "IAM")
        });
    }

    Ok(out)
}
