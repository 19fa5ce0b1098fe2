//! The migrate module owns the migration helper, which moves Auto Scaling groups from launch
//! configurations to launch templates.  Each operation makes one or two provider calls in order
//! and returns as soon as one fails; nothing is retried or rolled back.

pub(crate) mod filter;

use crate::model::{
    CreateFromConfigurationRequest, CreateLaunchTemplateRequest, DeleteLaunchTemplateRequest,
    DeleteLaunchTemplateVersionsRequest, DeletedVersions, LaunchConfiguration, LaunchTemplate,
    LaunchTemplateData, UpdateAutoScalingGroupRequest, UpdateAutoScalingGroupResponse,
};
use crate::provider::Provider;
use log::info;
use snafu::{ensure, OptionExt, ResultExt};
use std::fmt::Debug;

/// Log target for call arguments and raw provider responses.  The logger admits it at INFO
/// whenever verbose output is requested, whatever the chosen log level.
pub(crate) const DIAGNOSTIC_TARGET: &str = "ltmigrate::diagnostics";

pub(crate) struct MigrationHelper<P> {
    provider: P,
    verbose: bool,
}

impl<P> MigrationHelper<P>
where
    P: Provider + Send + Sync,
{
    /// Verbosity is fixed here for the life of the helper.
    pub(crate) fn new(provider: P, verbose: bool) -> Self {
        Self { provider, verbose }
    }

    #[cfg(test)]
    pub(crate) fn provider(&self) -> &P {
        &self.provider
    }

    fn diagnostic<T: Debug>(&self, label: &str, value: &T) {
        if self.verbose {
            info!(target: DIAGNOSTIC_TARGET, "{}: {:?}", label, value);
        }
    }

    /// Fetches the launch configuration with the given name.
    pub(crate) async fn describe_launch_configuration(
        &self,
        name: &str,
    ) -> Result<LaunchConfiguration> {
        self.diagnostic("describe_launch_configuration args", &name);
        ensure!(!name.is_empty(), error::EmptyNameSnafu);

        let mut configs = self
            .provider
            .describe_launch_configurations(&[name.to_string()])
            .await
            .context(error::DescribeLaunchConfigurationSnafu { name })?;
        self.diagnostic("DescribeLaunchConfigurations response", &configs);

        // Names are unique within a region, so more than one match means the provider matched
        // something other than what we asked for.
        ensure!(
            configs.len() <= 1,
            error::TooManyLaunchConfigurationsSnafu {
                name,
                count: configs.len(),
            }
        );
        configs
            .pop()
            .context(error::LaunchConfigurationNotFoundSnafu { name })
    }

    /// Builds launch template data from a launch configuration, resolving its instance profile
    /// name to an ARN.
    pub(crate) async fn filter_launch_configuration(
        &self,
        config: &LaunchConfiguration,
    ) -> Result<LaunchTemplateData> {
        self.diagnostic("filter_launch_configuration args", config);
        let profile_name = filter::instance_profile_name(config).context(error::FilterSnafu)?;

        let profile = self
            .provider
            .get_instance_profile(profile_name)
            .await
            .context(error::GetInstanceProfileSnafu { name: profile_name })?;
        self.diagnostic("GetInstanceProfile response", &profile);

        Ok(filter::to_template_data(config, &profile.arn))
    }

    /// Creates a launch template whose first version matches the named launch configuration.
    pub(crate) async fn create_launch_template_from_configuration(
        &self,
        request: &CreateFromConfigurationRequest,
    ) -> Result<LaunchTemplate> {
        self.diagnostic("create_launch_template_from_configuration args", request);
        let config = self
            .describe_launch_configuration(&request.launch_configuration_name)
            .await?;
        let launch_template_data = self.filter_launch_configuration(&config).await?;

        let create_request = CreateLaunchTemplateRequest {
            launch_template_name: request.launch_template_name.clone(),
            version_description: request.description.clone(),
            launch_template_data,
            tag_specifications: request.tag_specifications.clone(),
        };
        let template = self
            .provider
            .create_launch_template(&create_request)
            .await
            .context(error::CreateLaunchTemplateSnafu {
                name: &request.launch_template_name,
            })?;
        self.diagnostic("CreateLaunchTemplate response", &template);
        Ok(template)
    }

    /// Deletes a launch template, with all of its versions.
    pub(crate) async fn delete_launch_template(
        &self,
        request: &DeleteLaunchTemplateRequest,
    ) -> Result<LaunchTemplate> {
        self.diagnostic("delete_launch_template args", request);
        let template = self
            .provider
            .delete_launch_template(request)
            .await
            .context(error::DeleteLaunchTemplateSnafu {
                template: template_label(
                    request.launch_template_id.as_deref(),
                    request.launch_template_name.as_deref(),
                ),
            })?;
        self.diagnostic("DeleteLaunchTemplate response", &template);
        Ok(template)
    }

    /// Deletes specific versions of a launch template.
    pub(crate) async fn delete_launch_template_versions(
        &self,
        request: &DeleteLaunchTemplateVersionsRequest,
    ) -> Result<DeletedVersions> {
        self.diagnostic("delete_launch_template_versions args", request);
        let deleted = self
            .provider
            .delete_launch_template_versions(request)
            .await
            .context(error::DeleteLaunchTemplateVersionsSnafu {
                template: template_label(
                    request.launch_template_id.as_deref(),
                    request.launch_template_name.as_deref(),
                ),
            })?;
        self.diagnostic("DeleteLaunchTemplateVersions response", &deleted);
        Ok(deleted)
    }

    /// Points an Auto Scaling group at a mixed instances policy.
    pub(crate) async fn update_auto_scaling_group(
        &self,
        request: &UpdateAutoScalingGroupRequest,
    ) -> Result<UpdateAutoScalingGroupResponse> {
        self.diagnostic("update_auto_scaling_group args", request);
        let response = self
            .provider
            .update_auto_scaling_group(request)
            .await
            .context(error::UpdateAutoScalingGroupSnafu {
                name: &request.auto_scaling_group_name,
            })?;
        self.diagnostic("UpdateAutoScalingGroup response", &response);
        Ok(response)
    }
}

/// Names a launch template by whichever identifiers the caller gave.
fn template_label(id: Option<&str>, name: Option<&str>) -> String {
    match (id, name) {
        (Some(id), Some(name)) => format!("{} ({})", name, id),
        (Some(label), None) | (None, Some(label)) => label.to_string(),
        (None, None) => "<unspecified>".to_string(),
    }
}

mod error {
    use crate::provider;
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)))]
    pub(crate) enum Error {
        #[snafu(display("Failed to create launch template '{}': {}", name, source))]
        CreateLaunchTemplate {
            name: String,
            source: provider::Error,
        },

        #[snafu(display("Failed to delete launch template {}: {}", template, source))]
        DeleteLaunchTemplate {
            template: String,
            source: provider::Error,
        },

        #[snafu(display("Failed to delete versions of launch template {}: {}", template, source))]
        DeleteLaunchTemplateVersions {
            template: String,
            source: provider::Error,
        },

        #[snafu(display("Failed to describe launch configuration '{}': {}", name, source))]
        DescribeLaunchConfiguration {
            name: String,
            source: provider::Error,
        },

        #[snafu(display("Launch configuration name must not be empty"))]
        EmptyName,

        #[snafu(display("Malformed launch configuration: {}", source))]
        Filter { source: super::filter::Error },

        #[snafu(display("Failed to get instance profile '{}': {}", name, source))]
        GetInstanceProfile {
            name: String,
            source: provider::Error,
        },

        #[snafu(display("Launch configuration '{}' not found", name))]
        LaunchConfigurationNotFound { name: String },

        #[snafu(display("Found {} launch configurations named '{}'", count, name))]
        TooManyLaunchConfigurations { name: String, count: usize },

        #[snafu(display("Failed to update auto scaling group '{}': {}", name, source))]
        UpdateAutoScalingGroup {
            name: String,
            source: provider::Error,
        },
    }
}
pub(crate) use error::Error;
type Result<T> = std::result::Result<T, error::Error>;
