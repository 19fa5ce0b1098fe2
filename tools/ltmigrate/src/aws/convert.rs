//! Conversions between SDK types and our model.  Launch configurations pass through a
//! serializable record so they can be stored as attribute maps; launch template data passes
//! through a strict record so that only fields the EC2 API accepts reach the request.

use crate::model::{
    DeletedVersion, DeletedVersions, FailedVersion, LaunchConfiguration, LaunchTemplate,
    LaunchTemplateData, MixedInstancesPolicy, TagSpecification,
};
use aws_sdk_autoscaling::types as asg;
use aws_sdk_ec2::operation::delete_launch_template_versions::DeleteLaunchTemplateVersionsOutput;
use aws_sdk_ec2::types as ec2;
use aws_smithy_types::date_time::{DateTime, Format};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Records =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

/// A launch configuration as documented by the Auto Scaling API.  Absent fields are left out of
/// the resulting document.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ConfigurationRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    launch_configuration_name: Option<String>,
    #[serde(rename = "LaunchConfigurationARN", skip_serializing_if = "Option::is_none")]
    launch_configuration_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    security_groups: Option<Vec<String>>,
    #[serde(rename = "ClassicLinkVPCId", skip_serializing_if = "Option::is_none")]
    classic_link_vpc_id: Option<String>,
    #[serde(
        rename = "ClassicLinkVPCSecurityGroups",
        skip_serializing_if = "Option::is_none"
    )]
    classic_link_vpc_security_groups: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instance_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kernel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ramdisk_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    block_device_mappings: Option<Vec<BlockDeviceMappingRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instance_monitoring: Option<InstanceMonitoringRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    spot_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    iam_instance_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ebs_optimized: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    associate_public_ip_address: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    placement_tenancy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata_options: Option<MetadataOptionsRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct InstanceMonitoringRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
}

/// The subset of launch template data fields that share a name and shape with launch
/// configuration fields.  Anything else has no counterpart in `RequestLaunchTemplateData`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
struct TemplateDataRecord {
    image_id: Option<String>,
    key_name: Option<String>,
    security_groups: Option<Vec<String>>,
    security_group_ids: Option<Vec<String>>,
    user_data: Option<String>,
    instance_type: Option<String>,
    block_device_mappings: Option<Vec<BlockDeviceMappingRecord>>,
    iam_instance_profile: Option<InstanceProfileRecord>,
    ebs_optimized: Option<bool>,
    metadata_options: Option<MetadataOptionsRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
struct InstanceProfileRecord {
    arn: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
struct BlockDeviceMappingRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    virtual_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    device_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ebs: Option<EbsRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    no_device: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
struct EbsRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    volume_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    volume_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delete_on_termination: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    iops: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    encrypted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    throughput: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kms_key_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
struct MetadataOptionsRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    http_tokens: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    http_put_response_hop_limit: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    http_endpoint: Option<String>,
}

// Auto Scaling -> model   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

fn owned_list(value: Option<&[String]>) -> Option<Vec<String>> {
    value.map(<[String]>::to_vec)
}

fn timestamp(value: Option<&DateTime>) -> Option<String> {
    value.and_then(|time| time.fmt(Format::DateTime).ok())
}

/// Builds the attribute document for a launch configuration returned by Auto Scaling.
pub(super) fn launch_configuration(
    config: &asg::LaunchConfiguration,
) -> serde_json::Result<LaunchConfiguration> {
    let record = ConfigurationRecord {
        launch_configuration_name: owned(config.launch_configuration_name()),
        launch_configuration_arn: owned(config.launch_configuration_arn()),
        image_id: owned(config.image_id()),
        key_name: owned(config.key_name()),
        security_groups: owned_list(config.security_groups()),
        classic_link_vpc_id: owned(config.classic_link_vpc_id()),
        classic_link_vpc_security_groups: owned_list(config.classic_link_vpc_security_groups()),
        user_data: owned(config.user_data()),
        instance_type: owned(config.instance_type()),
        kernel_id: owned(config.kernel_id()),
        ramdisk_id: owned(config.ramdisk_id()),
        block_device_mappings: config
            .block_device_mappings()
            .map(|mappings| mappings.iter().map(block_device_mapping).collect()),
        instance_monitoring: config
            .instance_monitoring()
            .map(|monitoring| InstanceMonitoringRecord {
                enabled: monitoring.enabled(),
            }),
        spot_price: owned(config.spot_price()),
        iam_instance_profile: owned(config.iam_instance_profile()),
        created_time: timestamp(config.created_time()),
        ebs_optimized: config.ebs_optimized(),
        associate_public_ip_address: config.associate_public_ip_address(),
        placement_tenancy: owned(config.placement_tenancy()),
        metadata_options: config.metadata_options().map(|options| MetadataOptionsRecord {
            http_tokens: options.http_tokens().map(|t| t.as_str().to_string()),
            http_put_response_hop_limit: options.http_put_response_hop_limit(),
            http_endpoint: options.http_endpoint().map(|e| e.as_str().to_string()),
        }),
    };

    match serde_json::to_value(record)? {
        Value::Object(attributes) => Ok(LaunchConfiguration::new(attributes)),
        _ => Ok(LaunchConfiguration::default()),
    }
}

fn block_device_mapping(mapping: &asg::BlockDeviceMapping) -> BlockDeviceMappingRecord {
    BlockDeviceMappingRecord {
        virtual_name: owned(mapping.virtual_name()),
        device_name: owned(mapping.device_name()),
        ebs: mapping.ebs().map(|ebs| EbsRecord {
            snapshot_id: owned(ebs.snapshot_id()),
            volume_size: ebs.volume_size(),
            volume_type: owned(ebs.volume_type()),
            delete_on_termination: ebs.delete_on_termination(),
            iops: ebs.iops(),
            encrypted: ebs.encrypted(),
            throughput: ebs.throughput(),
            kms_key_id: None,
        }),
        no_device: mapping.no_device(),
    }
}

// model -> EC2   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

/// Builds the EC2 request shape for launch template data, rejecting fields EC2 doesn't accept.
pub(super) fn request_launch_template_data(
    data: LaunchTemplateData,
) -> serde_json::Result<ec2::RequestLaunchTemplateData> {
    let record: TemplateDataRecord =
        serde_json::from_value(Value::Object(data.into_attributes()))?;

    Ok(ec2::RequestLaunchTemplateData::builder()
        .set_image_id(record.image_id)
        .set_key_name(record.key_name)
        .set_security_groups(record.security_groups)
        .set_security_group_ids(record.security_group_ids)
        .set_user_data(record.user_data)
        .set_instance_type(record.instance_type.as_deref().map(ec2::InstanceType::from))
        .set_block_device_mappings(
            record
                .block_device_mappings
                .map(|mappings| mappings.into_iter().map(template_block_device).collect()),
        )
        .set_iam_instance_profile(record.iam_instance_profile.map(|profile| {
            ec2::LaunchTemplateIamInstanceProfileSpecificationRequest::builder()
                .set_arn(profile.arn)
                .set_name(profile.name)
                .build()
        }))
        .set_ebs_optimized(record.ebs_optimized)
        .set_metadata_options(record.metadata_options.map(|options| {
            ec2::LaunchTemplateInstanceMetadataOptionsRequest::builder()
                .set_http_tokens(
                    options
                        .http_tokens
                        .as_deref()
                        .map(ec2::LaunchTemplateHttpTokensState::from),
                )
                .set_http_put_response_hop_limit(options.http_put_response_hop_limit)
                .set_http_endpoint(
                    options
                        .http_endpoint
                        .as_deref()
                        .map(ec2::LaunchTemplateInstanceMetadataEndpointState::from),
                )
                .build()
        }))
        .build())
}

fn template_block_device(
    mapping: BlockDeviceMappingRecord,
) -> ec2::LaunchTemplateBlockDeviceMappingRequest {
    // Auto Scaling models NoDevice as a flag, EC2 as an empty string.
    let no_device = mapping.no_device.filter(|no_device| *no_device).map(|_| String::new());
    ec2::LaunchTemplateBlockDeviceMappingRequest::builder()
        .set_device_name(mapping.device_name)
        .set_virtual_name(mapping.virtual_name)
        .set_no_device(no_device)
        .set_ebs(mapping.ebs.map(|ebs| {
            ec2::LaunchTemplateEbsBlockDeviceRequest::builder()
                .set_snapshot_id(ebs.snapshot_id)
                .set_volume_size(ebs.volume_size)
                .set_volume_type(ebs.volume_type.as_deref().map(ec2::VolumeType::from))
                .set_delete_on_termination(ebs.delete_on_termination)
                .set_iops(ebs.iops)
                .set_encrypted(ebs.encrypted)
                .set_throughput(ebs.throughput)
                .set_kms_key_id(ebs.kms_key_id)
                .build()
        }))
        .build()
}

pub(super) fn tag_specification(spec: &TagSpecification) -> ec2::TagSpecification {
    ec2::TagSpecification::builder()
        .resource_type(ec2::ResourceType::from(spec.resource_type.as_str()))
        .set_tags(Some(
            spec.tags
                .iter()
                .map(|tag| ec2::Tag::builder().key(&tag.key).value(&tag.value).build())
                .collect(),
        ))
        .build()
}

// EC2 -> model   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

pub(super) fn launch_template(template: &ec2::LaunchTemplate) -> LaunchTemplate {
    LaunchTemplate {
        launch_template_id: owned(template.launch_template_id()),
        launch_template_name: owned(template.launch_template_name()),
        default_version_number: template.default_version_number(),
        latest_version_number: template.latest_version_number(),
        created_by: owned(template.created_by()),
        create_time: timestamp(template.create_time()),
    }
}

pub(super) fn deleted_versions(output: &DeleteLaunchTemplateVersionsOutput) -> DeletedVersions {
    DeletedVersions {
        successfully_deleted: output
            .successfully_deleted_launch_template_versions()
            .unwrap_or_default()
            .iter()
            .map(|item| DeletedVersion {
                launch_template_id: owned(item.launch_template_id()),
                launch_template_name: owned(item.launch_template_name()),
                version_number: item.version_number(),
            })
            .collect(),
        unsuccessfully_deleted: output
            .unsuccessfully_deleted_launch_template_versions()
            .unwrap_or_default()
            .iter()
            .map(|item| FailedVersion {
                launch_template_id: owned(item.launch_template_id()),
                launch_template_name: owned(item.launch_template_name()),
                version_number: item.version_number(),
                code: item
                    .response_error()
                    .and_then(|e| e.code())
                    .map(|code| code.as_str().to_string()),
                message: item
                    .response_error()
                    .and_then(|e| owned(e.message())),
            })
            .collect(),
    }
}

// model -> Auto Scaling   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

pub(super) fn mixed_instances_policy(policy: &MixedInstancesPolicy) -> asg::MixedInstancesPolicy {
    let launch_template = policy.launch_template.as_ref().map(|template| {
        asg::LaunchTemplate::builder()
            .set_launch_template_specification(template.launch_template_specification.as_ref().map(
                |spec| {
                    asg::LaunchTemplateSpecification::builder()
                        .set_launch_template_id(spec.launch_template_id.clone())
                        .set_launch_template_name(spec.launch_template_name.clone())
                        .set_version(spec.version.clone())
                        .build()
                },
            ))
            .set_overrides(template.overrides.as_ref().map(|overrides| {
                overrides
                    .iter()
                    .map(|o| {
                        asg::LaunchTemplateOverrides::builder()
                            .set_instance_type(o.instance_type.clone())
                            .set_weighted_capacity(o.weighted_capacity.clone())
                            .build()
                    })
                    .collect()
            }))
            .build()
    });

    let distribution = policy.instances_distribution.as_ref().map(|d| {
        asg::InstancesDistribution::builder()
            .set_on_demand_allocation_strategy(d.on_demand_allocation_strategy.clone())
            .set_on_demand_base_capacity(d.on_demand_base_capacity)
            .set_on_demand_percentage_above_base_capacity(
                d.on_demand_percentage_above_base_capacity,
            )
            .set_spot_allocation_strategy(d.spot_allocation_strategy.clone())
            .set_spot_instance_pools(d.spot_instance_pools)
            .set_spot_max_price(d.spot_max_price.clone())
            .build()
    });

    asg::MixedInstancesPolicy::builder()
        .set_launch_template(launch_template)
        .set_instances_distribution(distribution)
        .build()
}
