use domain_finops::models::ResourceRecord;

use super::{blank_record, CollectorContext};

pub async fn collect(ctx: CollectorContext) -> Result<Vec<ResourceRecord>, String> {
    let client = aws_sdk_sns::Client::new(&ctx.config);
    let mut out = Vec::new();

    let mut pages = client.list_topics().into_paginator().items().send();
    while let Some(topic) = pages.next().await {
        let topic = topic.map_err(|err| err.to_string())?;
        let Some(arn) = topic.topic_arn else { continue };
        let name = arn.rsplit(':').next().unwrap_or(&arn).to_string();

        out.push(ResourceRecord {
            arn: Some(arn.clone()),
            resource_type: Some("Topic".to_string()),
            name: Some(name.clone()),
            state: Some("active".to_string()),
            ..blank_record(name, "SNS")
        });
    }

    Ok(out)
}
