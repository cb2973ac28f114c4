use domain_finops::models::ResourceRecord;

use super::{blank_record, CollectorContext};

pub async fn collect(ctx: CollectorContext) -> Result<Vec<ResourceRecord>, String> {
    let client = aws_sdk_sqs::Client::new(&ctx.config);

    let output = client
        .list_queues()
        .send()
        .await
        .map_err(|err| err.to_string())?;

    let mut out = Vec::new();
    for url in output.queue_urls() {
        let name = url.rsplit('/').next().unwrap_or(url).to_string();

        // Attribute enrichment (visibility timeout, message count) is
        // per-resource and best-effort.
        let message_count = client
            .get_queue_attributes()
            .queue_url(url)
            .attribute_names(aws_sdk_sqs::types::QueueAttributeName::ApproximateNumberOfMessages)
            .send()
            .await
            .ok()
            .and_then(|out| {
                out.attributes()
                    .get(&aws_sdk_sqs::types::QueueAttributeName::ApproximateNumberOfMessages)
                    .and_then(|v| v.parse::<u64>().ok())
            })
            .unwrap_or(0);

        out.push(ResourceRecord {
            resource_type: Some("Queue".to_string()),
            name: Some(name.clone()),
            state: Some("active".to_string()),
            metadata: serde_json::json!({ "approximate_message_count": message_count }),
            ..blank_record(name, "SQS")
        });
    }

    Ok(out)
}
