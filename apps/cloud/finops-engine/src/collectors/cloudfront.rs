use domain_finops::models::ResourceRecord;

use super::{blank_record, CollectorContext};

pub async fn collect(ctx: CollectorContext) -> Result<Vec<ResourceRecord>, String> {
    let client = aws_sdk_cloudfront::Client::new(&ctx.config);

    let output = client
        .list_distributions()
        .send()
        .await
        .map_err(|err| err.to_string())?;

    let mut out = Vec::new();
    if let Some(list) = output.distribution_list() {
        for item in list.items() {
            let id = item.id();

            out.push(ResourceRecord {
                arn: item.arn().map(str::to_string),
                resource_type: Some("Distribution".to_string()),
                name: item.domain_name().map(str::to_string),
                state: Some(if item.enabled() { "enabled" } else { "disabled" }.to_string()),
                ..blank_record(id, "CloudFront")
            });
        }
    }

    Ok(out)
}
