//! Emits VPCs, subnets, security groups, NAT gateways, internet gateways,
//! and elastic IPs as distinct records sharing `service=VPC`.

use domain_finops::models::ResourceRecord;
use serde_json::json;

use super::{blank_record, CollectorContext};

pub async fn collect(ctx: CollectorContext) -> Result<Vec<ResourceRecord>, String> {
    let client = aws_sdk_ec2::Client::new(&ctx.config);
    let mut out = Vec::new();

    let vpcs = client
        .describe_vpcs()
        .send()
        .await
        .map_err(|err| err.to_string())?;
    for vpc in vpcs.vpcs() {
        let Some(id) = vpc.vpc_id() else { continue };
        out.push(ResourceRecord {
            resource_type: Some("Vpc".to_string()),
            state: vpc.state().map(|s| s.as_str().to_string()),
            metadata: json!({ "cidr_block": vpc.cidr_block() }),
            ..blank_record(id, "VPC")
        });
    }

    let subnets = client
        .describe_subnets()
        .send()
        .await
        .map_err(|err| err.to_string())?;
    for subnet in subnets.subnets() {
        let Some(id) = subnet.subnet_id() else { continue };
        out.push(ResourceRecord {
            resource_type: Some("Subnet".to_string()),
            state: subnet.state().map(|s| s.as_str().to_string()),
            metadata: json!({ "cidr_block": subnet.cidr_block() }),
            ..blank_record(id, "VPC")
        });
    }

    let groups = client
        .describe_security_groups()
        .send()
        .await
        .map_err(|err| err.to_string())?;
    for group in groups.security_groups() {
        let Some(id) = group.group_id() else { continue };
        out.push(ResourceRecord {
            resource_type: Some("SecurityGroup".to_string()),
            name: group.group_name().map(str::to_string),
            state: Some("active".to_string()),
            ..blank_record(id, "VPC")
        });
    }

    let nat_gateways = client
        .describe_nat_gateways()
        .send()
        .await
        .map_err(|err| err.to_string())?;
    for gw in nat_gateways.nat_gateways() {
        let Some(id) = gw.nat_gateway_id() else { continue };
        out.push(ResourceRecord {
            resource_type: Some("NatGateway".to_string()),
            state: gw.state().map(|s| s.as_str().to_string()),
            ..blank_record(id, "VPC")
        });
    }

    let igws = client
        .describe_internet_gateways()
        .send()
        .await
        .map_err(|err| err.to_string())?;
    for igw in igws.internet_gateways() {
        let Some(id) = igw.internet_gateway_id() else {
            continue;
        };
        out.push(ResourceRecord {
            resource_type: Some("InternetGateway".to_string()),
            state: Some("attached".to_string()),
            ..blank_record(id, "VPC")
        });
    }

    let addresses = client
        .describe_addresses()
        .send()
        .await
        .map_err(|err| err.to_string())?;
    for address in addresses.addresses() {
        let Some(id) = address.allocation_id() else {
            continue;
        };
        out.push(ResourceRecord {
            resource_type: Some("ElasticIp".to_string()),
            state: Some(if address.association_id().is_some() {
                "associated"
            } else {
                "unassociated"
            }.to_string()),
            metadata: json!({ "public_ip": address.public_ip() }),
            ..blank_record(id, "VPC")
        });
    }

    Ok(out)
}
