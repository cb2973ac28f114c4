use domain_finops::models::ResourceRecord;
use serde_json::json;

use super::{blank_record, CollectorContext};

pub async fn collect(ctx: CollectorContext) -> Result<Vec<ResourceRecord>, String> {
    let client = aws_sdk_s3::Client::new(&ctx.config);

    let output = client
        .list_buckets()
        .send()
        .await
        .map_err(|err| err.to_string())?;

    let mut out = Vec::new();
    for bucket in output.buckets() {
        let Some(name) = bucket.name() else {
            continue;
        };

        // Region/location is best-effort enrichment; a failure falls back
        // to "unknown" rather than dropping the bucket from the sweep.
        let region = client
            .get_bucket_location()
            .bucket(name)
            .send()
            .await
            .ok()
            .and_then(|out| out.location_constraint())
            .map(|r| r.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        out.push(ResourceRecord {
            resource_type: Some("Bucket".to_string()),
            name: Some(name.to_string()),
            state: Some("active".to_string()),
            metadata: json!({ "region": region }),
            ..blank_record(name, "S3")
        });
    }

    Ok(out)
}
