//! The aws module implements the provider seam against the Auto Scaling, EC2 and IAM APIs.

pub(crate) mod client;
mod convert;

use crate::model::{
    CreateLaunchTemplateRequest, DeleteLaunchTemplateRequest, DeleteLaunchTemplateVersionsRequest,
    DeletedVersions, InstanceProfile, LaunchConfiguration, LaunchTemplate,
    UpdateAutoScalingGroupRequest, UpdateAutoScalingGroupResponse,
};
use crate::provider::{
    BoxedError, ConvertSnafu, MissingInResponseSnafu, Provider, RequestSnafu, Result,
};
use async_trait::async_trait;
use aws_sdk_autoscaling::Client as AutoScalingClient;
use aws_sdk_ec2::Client as Ec2Client;
use aws_sdk_iam::Client as IamClient;
use aws_types::SdkConfig;
use log::debug;
use snafu::{OptionExt, ResultExt};

/// Talks to AWS.  A new service client is built for each call from the shared SDK config.
pub(crate) struct AwsProvider {
    config: SdkConfig,
}

impl AwsProvider {
    pub(crate) fn new(config: SdkConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Provider for AwsProvider {
    async fn describe_launch_configurations(
        &self,
        names: &[String],
    ) -> Result<Vec<LaunchConfiguration>> {
        let operation = "DescribeLaunchConfigurations";
        debug!("Calling {} for {:?}", operation, names);
        let client = AutoScalingClient::new(&self.config);
        let response = client
            .describe_launch_configurations()
            .set_launch_configuration_names(Some(names.to_vec()))
            .send()
            .await
            .map_err(BoxedError::from)
            .context(RequestSnafu { operation })?;

        response
            .launch_configurations()
            .unwrap_or_default()
            .iter()
            .map(|config| {
                convert::launch_configuration(config).context(ConvertSnafu {
                    operation,
                    what: "launch configuration",
                })
            })
            .collect()
    }

    async fn get_instance_profile(&self, name: &str) -> Result<InstanceProfile> {
        let operation = "GetInstanceProfile";
        debug!("Calling {} for {}", operation, name);
        let client = IamClient::new(&self.config);
        let response = client
            .get_instance_profile()
            .instance_profile_name(name)
            .send()
            .await
            .map_err(BoxedError::from)
            .context(RequestSnafu { operation })?;

        let profile = response.instance_profile().context(MissingInResponseSnafu {
            operation,
            missing: "InstanceProfile",
        })?;
        let arn = profile.arn().context(MissingInResponseSnafu {
            operation,
            missing: "InstanceProfile.Arn",
        })?;
        Ok(InstanceProfile {
            instance_profile_name: profile.instance_profile_name().unwrap_or(name).to_string(),
            arn: arn.to_string(),
        })
    }

    async fn create_launch_template(
        &self,
        request: &CreateLaunchTemplateRequest,
    ) -> Result<LaunchTemplate> {
        let operation = "CreateLaunchTemplate";
        debug!(
            "Calling {} for {}",
            operation, request.launch_template_name
        );
        let data = convert::request_launch_template_data(request.launch_template_data.clone())
            .context(ConvertSnafu {
                operation,
                what: "launch template data",
            })?;
        let tag_specifications = (!request.tag_specifications.is_empty()).then(|| {
            request
                .tag_specifications
                .iter()
                .map(convert::tag_specification)
                .collect()
        });

        let client = Ec2Client::new(&self.config);
        let response = client
            .create_launch_template()
            .launch_template_name(&request.launch_template_name)
            .set_version_description(request.version_description.clone())
            .launch_template_data(data)
            .set_tag_specifications(tag_specifications)
            .send()
            .await
            .map_err(BoxedError::from)
            .context(RequestSnafu { operation })?;

        let template = response.launch_template().context(MissingInResponseSnafu {
            operation,
            missing: "LaunchTemplate",
        })?;
        Ok(convert::launch_template(template))
    }

    async fn delete_launch_template(
        &self,
        request: &DeleteLaunchTemplateRequest,
    ) -> Result<LaunchTemplate> {
        let operation = "DeleteLaunchTemplate";
        debug!("Calling {} with {:?}", operation, request);
        let client = Ec2Client::new(&self.config);
        let response = client
            .delete_launch_template()
            .set_launch_template_id(request.launch_template_id.clone())
            .set_launch_template_name(request.launch_template_name.clone())
            .set_dry_run(request.dry_run)
            .send()
            .await
            .map_err(BoxedError::from)
            .context(RequestSnafu { operation })?;

        let template = response.launch_template().context(MissingInResponseSnafu {
            operation,
            missing: "LaunchTemplate",
        })?;
        Ok(convert::launch_template(template))
    }

    async fn delete_launch_template_versions(
        &self,
        request: &DeleteLaunchTemplateVersionsRequest,
    ) -> Result<DeletedVersions> {
        let operation = "DeleteLaunchTemplateVersions";
        debug!("Calling {} with {:?}", operation, request);
        let client = Ec2Client::new(&self.config);
        let response = client
            .delete_launch_template_versions()
            .set_launch_template_id(request.launch_template_id.clone())
            .set_launch_template_name(request.launch_template_name.clone())
            .set_versions(Some(request.versions.clone()))
            .set_dry_run(request.dry_run)
            .send()
            .await
            .map_err(BoxedError::from)
            .context(RequestSnafu { operation })?;

        Ok(convert::deleted_versions(&response))
    }

    async fn update_auto_scaling_group(
        &self,
        request: &UpdateAutoScalingGroupRequest,
    ) -> Result<UpdateAutoScalingGroupResponse> {
        let operation = "UpdateAutoScalingGroup";
        debug!(
            "Calling {} for {}",
            operation, request.auto_scaling_group_name
        );
        let client = AutoScalingClient::new(&self.config);
        client
            .update_auto_scaling_group()
            .auto_scaling_group_name(&request.auto_scaling_group_name)
            .mixed_instances_policy(convert::mixed_instances_policy(
                &request.mixed_instances_policy,
            ))
            .send()
            .await
            .map_err(BoxedError::from)
            .context(RequestSnafu { operation })?;

        Ok(UpdateAutoScalingGroupResponse {})
    }
}
