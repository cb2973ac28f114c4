use domain_finops::models::ResourceRecord;

use super::{blank_record, CollectorContext};

pub async fn collect(ctx: CollectorContext) -> Result<Vec<ResourceRecord>, String> {
    let client = aws_sdk_elasticbeanstalk::Client::new(&ctx.config);
    let mut out = Vec::new();

    let applications = client
        .describe_applications()
        .send()
        .await
        .map_err(|err| err.to_string())?;
    for app in applications.applications() {
        let Some(name) = app.application_name() else {
            continue;
        };
        out.push(ResourceRecord {
            resource_type: Some("Application".to_string()),
            name: Some(name.to_string()),
            state: Some("active".to_string()),
            ..blank_record(name, "ElasticBeanstalk")
        });
    }

    let environments = client
        .describe_environments()
        .send()
        .await
        .map_err(|err| err.to_string())?;
    for env in environments.environments() {
        let Some(id) = env.environment_id() else {
            continue;
        };
        out.push(ResourceRecord {
            arn: env.environment_arn().map(str::to_string),
            resource_type: Some("Environment".to_string()),
            name: env.environment_name().map(str::to_string),
            state: env.status().map(|s| s.as_str().to_string()),
            ..blank_record(id, "ElasticBeanstalk")
        });
    }

    Ok(out)
}
