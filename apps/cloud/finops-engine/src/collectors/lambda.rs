use domain_finops::models::ResourceRecord;
use serde_json::json;

use super::{blank_record, CollectorContext};

pub async fn collect(ctx: CollectorContext) -> Result<Vec<ResourceRecord>, String> {
    let client = aws_sdk_lambda::Client::new(&ctx.config);
    let mut out = Vec::new();

    let mut pages = client.list_functions().into_paginator().send();
    while let Some(page) = pages.next().await {
        let page = page.map_err(|err| err.to_string())?;
        for function in page.functions() {
            let Some(name) = function.function_name() else {
                continue;
            };

            out.push(ResourceRecord {
                arn: function.function_arn().map(str::to_string),
                resource_type: function.runtime().map(|r| r.as_str().to_string()),
                name: Some(name.to_string()),
                state: function.state().map(|s| s.as_str().to_string()),
                metadata: json!({
                    "memory_mb": function.memory_size().unwrap_or_default(),
                    "timeout_sec": function.timeout().unwrap_or_default(),
                }),
                ..blank_record(name, "Lambda")
            });
        }
    }

    Ok(out)
}
