use domain_finops::models::ResourceRecord;
use serde_json::json;

use super::{blank_record, CollectorContext};

pub async fn collect(ctx: CollectorContext) -> Result<Vec<ResourceRecord>, String> {
    let client = aws_sdk_elasticloadbalancingv2::Client::new(&ctx.config);
    let mut out = Vec::new();

    let mut pages = client.describe_load_balancers().into_paginator().send();
    while let Some(page) = pages.next().await {
        let page = page.map_err(|err| err.to_string())?;
        for lb in page.load_balancers() {
            let Some(name) = lb.load_balancer_name() else {
                continue;
            };
            let arn = lb.load_balancer_arn();

            // Target group enrichment is per-resource and best-effort.
            let target_count = if let Some(arn) = arn {
                client
                    .describe_target_groups()
                    .load_balancer_arn(arn)
                    .send()
                    .await
                    .ok()
                    .map(|out| out.target_groups().len())
                    .unwrap_or(0)
            } else {
                0
            };

            out.push(ResourceRecord {
                arn: arn.map(str::to_string),
                resource_type: lb.r#type().map(|t| t.as_str().to_string()),
                name: Some(name.to_string()),
                state: lb.state().and_then(|s| s.code()).map(|c| c.as_str().to_string()),
                metadata: json!({ "target_group_count": target_count }),
                ..blank_record(name, "ELB")
            });
        }
    }

    Ok(out)
}
