//! The provider module defines the seam between the migration helper and the cloud control plane.
//! Each method maps to exactly one provider API call.

use crate::model::{
    CreateLaunchTemplateRequest, DeleteLaunchTemplateRequest, DeleteLaunchTemplateVersionsRequest,
    DeletedVersions, InstanceProfile, LaunchConfiguration, LaunchTemplate,
    UpdateAutoScalingGroupRequest, UpdateAutoScalingGroupResponse,
};
use async_trait::async_trait;

#[cfg(test)]
pub(crate) mod recording;

/// Errors raised by a provider implementation are kept opaque to the helper.
pub(crate) type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[async_trait]
pub(crate) trait Provider {
    /// `DescribeLaunchConfigurations`, returning every record matching the given names.
    async fn describe_launch_configurations(
        &self,
        names: &[String],
    ) -> Result<Vec<LaunchConfiguration>>;

    /// `GetInstanceProfile`
    async fn get_instance_profile(&self, name: &str) -> Result<InstanceProfile>;

    /// `CreateLaunchTemplate`
    async fn create_launch_template(
        &self,
        request: &CreateLaunchTemplateRequest,
    ) -> Result<LaunchTemplate>;

    /// `DeleteLaunchTemplate`
    async fn delete_launch_template(
        &self,
        request: &DeleteLaunchTemplateRequest,
    ) -> Result<LaunchTemplate>;

    /// `DeleteLaunchTemplateVersions`
    async fn delete_launch_template_versions(
        &self,
        request: &DeleteLaunchTemplateVersionsRequest,
    ) -> Result<DeletedVersions>;

    /// `UpdateAutoScalingGroup`
    async fn update_auto_scaling_group(
        &self,
        request: &UpdateAutoScalingGroupRequest,
    ) -> Result<UpdateAutoScalingGroupResponse>;
}

mod error {
    use super::BoxedError;
    use aws_smithy_types::error::display::DisplayErrorContext;
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(crate)))]
    pub(crate) enum Error {
        #[snafu(display("{} request failed: {}", operation, DisplayErrorContext(source.as_ref())))]
        Request {
            operation: &'static str,
            source: BoxedError,
        },

        #[snafu(display("Response to {} missing {}", operation, missing))]
        MissingInResponse {
            operation: &'static str,
            missing: &'static str,
        },

        #[snafu(display("Failed to convert {} for {}: {}", what, operation, source))]
        Convert {
            operation: &'static str,
            what: &'static str,
            source: serde_json::Error,
        },
    }
}
pub(crate) use error::Error;
pub(crate) use error::{ConvertSnafu, MissingInResponseSnafu, RequestSnafu};
pub(crate) type Result<T> = std::result::Result<T, error::Error>;
