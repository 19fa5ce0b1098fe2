//! Turns a launch configuration into launch template data.

use crate::model::{LaunchConfiguration, LaunchTemplateData, IAM_INSTANCE_PROFILE};
use serde_json::{json, Map, Value};
use snafu::OptionExt;

/// Launch configuration fields that have no place in launch template data.  They're dropped
/// whether or not they're present.
pub(crate) const CONFIGURATION_ONLY_FIELDS: &[&str] = &[
    "LaunchConfigurationName",
    "LaunchConfigurationARN",
    "ClassicLinkVPCSecurityGroups",
    "RamdiskId",
    "InstanceMonitoring",
    "CreatedTime",
    "KernelId",
];

/// Returns the name of the instance profile the configuration references.
pub(crate) fn instance_profile_name(config: &LaunchConfiguration) -> Result<&str> {
    let configuration = config.name().unwrap_or("<unnamed>");
    let value = config
        .get(IAM_INSTANCE_PROFILE)
        .context(error::MissingInstanceProfileSnafu { configuration })?;
    value.as_str().context(error::InstanceProfileNotNameSnafu {
        configuration,
        found: value.to_string(),
    })
}

/// Copies every field of the configuration except the configuration-only ones, and references
/// the instance profile by ARN instead of by name.
pub(crate) fn to_template_data(
    config: &LaunchConfiguration,
    instance_profile_arn: &str,
) -> LaunchTemplateData {
    let mut attributes: Map<String, Value> = config
        .attributes()
        .iter()
        .filter(|(field, _)| !CONFIGURATION_ONLY_FIELDS.contains(&field.as_str()))
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect();
    attributes.insert(
        IAM_INSTANCE_PROFILE.to_string(),
        json!({ "Arn": instance_profile_arn }),
    );
    LaunchTemplateData::new(attributes)
}

mod error {
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)))]
    pub(crate) enum Error {
        #[snafu(display("Launch configuration '{}' has no IamInstanceProfile", configuration))]
        MissingInstanceProfile { configuration: String },

        #[snafu(display(
            "IamInstanceProfile of launch configuration '{}' should be a profile name, found {}",
            configuration,
            found
        ))]
        InstanceProfileNotName {
            configuration: String,
            found: String,
        },
    }
}
pub(crate) use error::Error;
type Result<T> = std::result::Result<T, error::Error>;

#[cfg(test)]
mod test {
    use super::{instance_profile_name, to_template_data, Error, CONFIGURATION_ONLY_FIELDS};
    use crate::model::LaunchConfiguration;
    use serde_json::{json, Value};

    const PROFILE_ARN: &str = "arn:aws:iam::123456789012:instance-profile/web-profile";

    fn config(value: Value) -> LaunchConfiguration {
        serde_json::from_value(value).unwrap()
    }

    fn full_config() -> LaunchConfiguration {
        config(json!({
            "LaunchConfigurationName": "cfg-1",
            "LaunchConfigurationARN": "arn:aws:autoscaling:us-west-2:123456789012:launchConfiguration:cfg-1",
            "ImageId": "ami-12345678",
            "KeyName": "ops",
            "SecurityGroups": ["sg-11111111"],
            "ClassicLinkVPCSecurityGroups": [],
            "UserData": "IyEvYmluL2Jhc2g=",
            "InstanceType": "t3.medium",
            "KernelId": "",
            "RamdiskId": "",
            "BlockDeviceMappings": [],
            "InstanceMonitoring": {"Enabled": true},
            "IamInstanceProfile": "web-profile",
            "CreatedTime": "2021-03-01T12:00:00Z",
            "EbsOptimized": false
        }))
    }

    #[test]
    fn drops_configuration_only_fields() {
        let data = to_template_data(&full_config(), PROFILE_ARN).into_attributes();
        for field in CONFIGURATION_ONLY_FIELDS {
            assert!(!data.contains_key(*field), "{} survived filtering", field);
        }
    }

    #[test]
    fn absent_fields_are_ignored() {
        let data = to_template_data(
            &config(json!({"ImageId": "ami-12345678", "IamInstanceProfile": "web-profile"})),
            PROFILE_ARN,
        );
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({"ImageId": "ami-12345678", "IamInstanceProfile": {"Arn": PROFILE_ARN}})
        );
    }

    #[test]
    fn keeps_shared_fields() {
        let data = to_template_data(&full_config(), PROFILE_ARN);
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({
                "ImageId": "ami-12345678",
                "KeyName": "ops",
                "SecurityGroups": ["sg-11111111"],
                "UserData": "IyEvYmluL2Jhc2g=",
                "InstanceType": "t3.medium",
                "BlockDeviceMappings": [],
                "IamInstanceProfile": {"Arn": PROFILE_ARN},
                "EbsOptimized": false
            })
        );
    }

    #[test]
    fn instance_profile_referenced_by_arn_only() {
        let data = to_template_data(&full_config(), PROFILE_ARN).into_attributes();
        let profile = data.get("IamInstanceProfile").unwrap().as_object().unwrap();
        assert_eq!(profile.len(), 1);
        assert_eq!(profile.get("Arn"), Some(&json!(PROFILE_ARN)));
        assert!(profile.get("Name").is_none());
    }

    #[test]
    fn input_is_not_modified() {
        let original = full_config();
        let _ = to_template_data(&original, PROFILE_ARN);
        assert_eq!(original, full_config());
    }

    #[test]
    fn profile_name() {
        assert_eq!(instance_profile_name(&full_config()).unwrap(), "web-profile");
    }

    #[test]
    fn missing_profile() {
        let cfg = config(json!({
            "LaunchConfigurationName": "cfg-1",
            "ImageId": "ami-12345678"
        }));
        let result = instance_profile_name(&cfg);
        assert!(matches!(
            result,
            Err(Error::MissingInstanceProfile { configuration }) if configuration == "cfg-1"
        ));
    }

    #[test]
    fn profile_not_a_name() {
        let cfg = config(json!({
            "IamInstanceProfile": {"Arn": PROFILE_ARN}
        }));
        let result = instance_profile_name(&cfg);
        assert!(matches!(result, Err(Error::InstanceProfileNotName { .. })));
    }
}
