//! The model module defines the documents and requests passed between the migration helper and
//! the provider.  Launch configurations and launch template data are kept as attribute maps keyed
//! by the provider's PascalCase field names, so fields we don't know about survive the trip from
//! one API to the other.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute name holding a launch configuration's name.
pub(crate) const LAUNCH_CONFIGURATION_NAME: &str = "LaunchConfigurationName";

/// Attribute name holding the instance profile reference.
pub(crate) const IAM_INSTANCE_PROFILE: &str = "IamInstanceProfile";

/// A launch configuration as returned by the Auto Scaling API.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub(crate) struct LaunchConfiguration(Map<String, Value>);

impl LaunchConfiguration {
    pub(crate) fn new(attributes: Map<String, Value>) -> Self {
        Self(attributes)
    }

    pub(crate) fn attributes(&self) -> &Map<String, Value> {
        &self.0
    }

    pub(crate) fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// The configuration's name, if the record carries one.
    pub(crate) fn name(&self) -> Option<&str> {
        self.get(LAUNCH_CONFIGURATION_NAME).and_then(Value::as_str)
    }
}

/// The `LaunchTemplateData` sent when creating a launch template.  Only the filter in
/// `migrate::filter` builds these from launch configurations.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub(crate) struct LaunchTemplateData(Map<String, Value>);

impl LaunchTemplateData {
    pub(crate) fn new(attributes: Map<String, Value>) -> Self {
        Self(attributes)
    }

    pub(crate) fn into_attributes(self) -> Map<String, Value> {
        self.0
    }
}

/// An IAM instance profile, as far as we care about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct InstanceProfile {
    pub(crate) instance_profile_name: String,
    pub(crate) arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub(crate) struct Tag {
    pub(crate) key: String,
    pub(crate) value: String,
}

/// Tags to apply to a resource type when the launch template is created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub(crate) struct TagSpecification {
    pub(crate) resource_type: String,
    #[serde(default)]
    pub(crate) tags: Vec<Tag>,
}

/// Describes a launch template as returned by create and delete calls.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct LaunchTemplate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) launch_template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) launch_template_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) default_version_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) latest_version_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) create_time: Option<String>,
}

/// Input to the `CreateLaunchTemplate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CreateLaunchTemplateRequest {
    pub(crate) launch_template_name: String,
    pub(crate) version_description: Option<String>,
    pub(crate) launch_template_data: LaunchTemplateData,
    pub(crate) tag_specifications: Vec<TagSpecification>,
}

/// Caller input for creating a launch template from an existing launch configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CreateFromConfigurationRequest {
    pub(crate) launch_configuration_name: String,
    pub(crate) launch_template_name: String,
    pub(crate) description: Option<String>,
    pub(crate) tag_specifications: Vec<TagSpecification>,
}

/// Input to the `DeleteLaunchTemplate` call.  The provider wants either the ID or the name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct DeleteLaunchTemplateRequest {
    pub(crate) launch_template_id: Option<String>,
    pub(crate) launch_template_name: Option<String>,
    pub(crate) dry_run: Option<bool>,
}

/// Input to the `DeleteLaunchTemplateVersions` call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct DeleteLaunchTemplateVersionsRequest {
    pub(crate) launch_template_id: Option<String>,
    pub(crate) launch_template_name: Option<String>,
    pub(crate) versions: Vec<String>,
    pub(crate) dry_run: Option<bool>,
}

/// A launch template version the provider deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct DeletedVersion {
    pub(crate) launch_template_id: Option<String>,
    pub(crate) launch_template_name: Option<String>,
    pub(crate) version_number: Option<i64>,
}

/// A launch template version the provider refused to delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct FailedVersion {
    pub(crate) launch_template_id: Option<String>,
    pub(crate) launch_template_name: Option<String>,
    pub(crate) version_number: Option<i64>,
    pub(crate) code: Option<String>,
    pub(crate) message: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct DeletedVersions {
    pub(crate) successfully_deleted: Vec<DeletedVersion>,
    pub(crate) unsuccessfully_deleted: Vec<FailedVersion>,
}

/// Identifies the launch template an Auto Scaling group should use.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub(crate) struct LaunchTemplateSpecification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) launch_template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) launch_template_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) version: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub(crate) struct LaunchTemplateOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) instance_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) weighted_capacity: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub(crate) struct MixedInstancesLaunchTemplate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) launch_template_specification: Option<LaunchTemplateSpecification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) overrides: Option<Vec<LaunchTemplateOverride>>,
}

/// The on-demand/spot split of a mixed instances policy.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub(crate) struct InstancesDistribution {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) on_demand_allocation_strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) on_demand_base_capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) on_demand_percentage_above_base_capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) spot_allocation_strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) spot_instance_pools: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) spot_max_price: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub(crate) struct MixedInstancesPolicy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) launch_template: Option<MixedInstancesLaunchTemplate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) instances_distribution: Option<InstancesDistribution>,
}

/// Input to the `UpdateAutoScalingGroup` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UpdateAutoScalingGroupRequest {
    pub(crate) auto_scaling_group_name: String,
    pub(crate) mixed_instances_policy: MixedInstancesPolicy,
}

/// `UpdateAutoScalingGroup` returns no fields.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct UpdateAutoScalingGroupResponse {}

#[cfg(test)]
mod test {
    use super::{LaunchConfiguration, MixedInstancesPolicy};
    use serde_json::json;

    #[test]
    fn launch_configuration_name() {
        let config: LaunchConfiguration = serde_json::from_value(json!({
            "LaunchConfigurationName": "cfg-1",
            "ImageId": "ami-12345678",
        }))
        .unwrap();
        assert_eq!(config.name(), Some("cfg-1"));
        assert_eq!(config.get("ImageId"), Some(&json!("ami-12345678")));
        assert_eq!(LaunchConfiguration::default().name(), None);
    }

    #[test]
    fn parse_mixed_instances_policy() {
        let policy: MixedInstancesPolicy = serde_json::from_value(json!({
            "LaunchTemplate": {
                "LaunchTemplateSpecification": {
                    "LaunchTemplateId": "lt-abcdef1234567890",
                    "Version": "1"
                },
                "Overrides": [
                    {"InstanceType": "t3.medium"},
                    {"InstanceType": "t3a.medium"}
                ]
            },
            "InstancesDistribution": {
                "OnDemandBaseCapacity": 1,
                "OnDemandPercentageAboveBaseCapacity": 50
            }
        }))
        .unwrap();

        let launch_template = policy.launch_template.as_ref().unwrap();
        let spec = launch_template.launch_template_specification.as_ref().unwrap();
        assert_eq!(spec.launch_template_id.as_deref(), Some("lt-abcdef1234567890"));
        assert_eq!(spec.version.as_deref(), Some("1"));
        assert_eq!(launch_template.overrides.as_ref().unwrap().len(), 2);
        let distribution = policy.instances_distribution.as_ref().unwrap();
        assert_eq!(distribution.on_demand_base_capacity, Some(1));
        assert_eq!(distribution.on_demand_percentage_above_base_capacity, Some(50));
        assert_eq!(distribution.spot_allocation_strategy, None);
    }

    #[test]
    fn mixed_instances_policy_rejects_typos() {
        let result = serde_json::from_value::<MixedInstancesPolicy>(json!({
            "InstanceDistribution": {"OnDemandBaseCapacity": 1}
        }));
        assert!(result.is_err());
    }
}
