use domain_finops::models::ResourceRecord;
use serde_json::json;

use super::{blank_record, CollectorContext};

pub async fn collect(ctx: CollectorContext) -> Result<Vec<ResourceRecord>, String> {
    let client = aws_sdk_route53::Client::new(&ctx.config);
    let mut out = Vec::new();

    let mut pages = client.list_hosted_zones().into_paginator().items().send();
    while let Some(zone) = pages.next().await {
        let zone = zone.map_err(|err| err.to_string())?;

        out.push(ResourceRecord {
            resource_type: Some("HostedZone".to_string()),
            name: Some(zone.name.clone()),
            state: Some("active".to_string()),
            metadata: json!({ "record_set_count": zone.resource_record_set_count }),
            ..blank_record(zone.id.clone(), "Route53")
        });
    }

    Ok(out)
}
