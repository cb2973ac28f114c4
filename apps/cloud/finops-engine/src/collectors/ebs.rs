use domain_finops::models::ResourceRecord;
use serde_json::json;

use super::{blank_record, CollectorContext};

pub async fn collect(ctx: CollectorContext) -> Result<Vec<ResourceRecord>, String> {
    let client = aws_sdk_ec2::Client::new(&ctx.config);
    let mut out = Vec::new();

    let mut pages = client.describe_volumes().into_paginator().send();
    while let Some(page) = pages.next().await {
        let page = page.map_err(|err| err.to_string())?;
        for volume in page.volumes() {
            let Some(id) = volume.volume_id() else {
                continue;
            };

            let tags = volume
                .tags()
                .iter()
                .filter_map(|t| Some((t.key()?.to_string(), t.value().unwrap_or_default().to_string())))
                .collect();
            let name = volume
                .tags()
                .iter()
                .find(|t| t.key() == Some("Name"))
                .and_then(|t| t.value())
                .map(str::to_string);

            out.push(ResourceRecord {
                resource_type: volume.volume_type().map(|t| t.as_str().to_string()),
                name,
                tags,
                state: volume.state().map(|s| s.as_str().to_string()),
                metadata: json!({ "size_gib": volume.size().unwrap_or_default() }),
                ..blank_record(id, "EBS")
            });
        }
    }

    Ok(out)
}
