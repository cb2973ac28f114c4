use domain_finops::models::ResourceRecord;

use super::{blank_record, CollectorContext};

pub async fn collect(ctx: CollectorContext) -> Result<Vec<ResourceRecord>, String> {
    let client = aws_sdk_rds::Client::new(&ctx.config);
    let mut out = Vec::new();

    let mut pages = client.describe_db_instances().into_paginator().send();
    while let Some(page) = pages.next().await {
        let page = page.map_err(|err| err.to_string())?;
        for db in page.db_instances() {
            let Some(id) = db.db_instance_identifier() else {
                continue;
            };

            let tags = db
                .tag_list()
                .iter()
                .filter_map(|t| Some((t.key()?.to_string(), t.value().unwrap_or_default().to_string())))
                .collect();

            out.push(ResourceRecord {
                arn: db.db_instance_arn().map(str::to_string),
                resource_type: db.db_instance_class().map(str::to_string),
                name: Some(id.to_string()),
                tags,
                state: db.db_instance_status().map(str::to_string),
                ..blank_record(id, "RDS")
            });
        }
    }

    Ok(out)
}
