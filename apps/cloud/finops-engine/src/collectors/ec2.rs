use domain_finops::models::ResourceRecord;

use super::{blank_record, CollectorContext};

pub async fn collect(ctx: CollectorContext) -> Result<Vec<ResourceRecord>, String> {
    let client = aws_sdk_ec2::Client::new(&ctx.config);
    let mut out = Vec::new();

    let mut pages = client.describe_instances().into_paginator().send();
    while let Some(page) = pages.next().await {
        let page = page.map_err(|err| err.to_string())?;
        for reservation in page.reservations() {
            for instance in reservation.instances() {
                let Some(id) = instance.instance_id() else {
                    continue;
                };

                let tags = instance
                    .tags()
                    .iter()
                    .filter_map(|t| Some((t.key()?.to_string(), t.value().unwrap_or_default().to_string())))
                    .collect();
                let name = instance
                    .tags()
                    .iter()
                    .find(|t| t.key() == Some("Name"))
                    .and_then(|t| t.value())
                    .map(str::to_string);

                out.push(ResourceRecord {
                    arn: None,
                    resource_type: instance.instance_type().map(|t| t.as_str().to_string()),
                    name,
                    tags,
                    state: instance
                        .state()
                        .and_then(|s| s.name())
                        .map(|n| n.as_str().to_string()),
                    ..blank_record(id, "EC2")
                });
            }
        }
    }

    Ok(out)
}
