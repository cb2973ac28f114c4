use domain_finops::models::ResourceRecord;
use serde_json::json;

use super::{blank_record, CollectorContext};

pub async fn collect(ctx: CollectorContext) -> Result<Vec<ResourceRecord>, String> {
    let client = aws_sdk_autoscaling::Client::new(&ctx.config);
    let mut out = Vec::new();

    let mut pages = client
        .describe_auto_scaling_groups()
        .into_paginator()
        .send();
    while let Some(page) = pages.next().await {
        let page = page.map_err(|err| err.to_string())?;
        for group in page.auto_scaling_groups() {
            let name = group.auto_scaling_group_name();

            out.push(ResourceRecord {
                arn: group.auto_scaling_group_arn().map(str::to_string),
                resource_type: Some("AutoScalingGroup".to_string()),
                name: Some(name.to_string()),
                state: Some("active".to_string()),
                metadata: json!({
                    "desired_capacity": group.desired_capacity(),
                    "min_size": group.min_size(),
                    "max_size": group.max_size(),
                }),
                ..blank_record(name, "AutoScaling")
            });
        }
    }

    Ok(out)
}
