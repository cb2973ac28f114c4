use domain_finops::models::ResourceRecord;

use super::{blank_record, CollectorContext};

pub async fn collect(ctx: CollectorContext) -> Result<Vec<ResourceRecord>, String> {
    let client = aws_sdk_cloudformation::Client::new(&ctx.config);
    let mut out = Vec::new();

    let mut pages = client.describe_stacks().into_paginator().send();
    while let Some(page) = pages.next().await {
        let page = page.map_err(|err| err.to_string())?;
        for stack in page.stacks() {
            // DELETE_COMPLETE stacks are excluded — they no longer
            // exist from the account owner's point of view.
            if stack.stack_status() == Some(&aws_sdk_cloudformation::types::StackStatus::DeleteComplete) {
                continue;
            }

            out.push(ResourceRecord {
                arn: stack.stack_id().map(str::to_string),
                resource_type: Some("Stack".to_string()),
                name: Some(stack.stack_name().to_string()),
                state: stack.stack_status().map(|s| s.as_str().to_string()),
                ..blank_record(stack.stack_name(), "CloudFormation")
            });
        }
    }

    Ok(out)
}
