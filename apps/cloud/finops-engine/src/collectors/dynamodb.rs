use domain_finops::models::ResourceRecord;

use super::{blank_record, CollectorContext};

pub async fn collect(ctx: CollectorContext) -> Result<Vec<ResourceRecord>, String> {
    let client = aws_sdk_dynamodb::Client::new(&ctx.config);
    let mut out = Vec::new();

    let mut pages = client.list_tables().into_paginator().items().send();
    while let Some(name) = pages.next().await {
        let name = name.map_err(|err| err.to_string())?;

        // Billing mode / item count is per-resource enrichment.
        let table = client
            .describe_table()
            .table_name(&name)
            .send()
            .await
            .ok()
            .and_then(|out| out.table);

        out.push(ResourceRecord {
            arn: table.as_ref().and_then(|t| t.table_arn.clone()),
            resource_type: Some("Table".to_string()),
            name: Some(name.clone()),
            state: table
                .as_ref()
                .and_then(|t| t.table_status.as_ref())
                .map(|s| s.as_str().to_string()),
            ..blank_record(name, "DynamoDB")
        });
    }

    Ok(out)
}
