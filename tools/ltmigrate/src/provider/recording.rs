//! A provider that answers from canned data and remembers every call it was given.

use super::{Provider, RequestSnafu, Result};
use crate::model::{
    CreateLaunchTemplateRequest, DeleteLaunchTemplateRequest, DeleteLaunchTemplateVersionsRequest,
    DeletedVersion, DeletedVersions, InstanceProfile, LaunchConfiguration, LaunchTemplate,
    UpdateAutoScalingGroupRequest, UpdateAutoScalingGroupResponse,
};
use async_trait::async_trait;
use snafu::IntoError;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    DescribeLaunchConfigurations(Vec<String>),
    GetInstanceProfile(String),
    CreateLaunchTemplate(CreateLaunchTemplateRequest),
    DeleteLaunchTemplate(DeleteLaunchTemplateRequest),
    DeleteLaunchTemplateVersions(DeleteLaunchTemplateVersionsRequest),
    UpdateAutoScalingGroup(UpdateAutoScalingGroupRequest),
}

#[derive(Default)]
pub(crate) struct RecordingProvider {
    pub(crate) configs: Vec<LaunchConfiguration>,
    /// Instance profile name to ARN.
    pub(crate) profiles: HashMap<String, String>,
    pub(crate) fail_create: bool,
    pub(crate) calls: Mutex<Vec<Call>>,
}

impl RecordingProvider {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

pub(crate) fn rejected(operation: &'static str, message: &str) -> super::Error {
    RequestSnafu { operation }.into_error(message.into())
}

pub(crate) fn template(name: &str) -> LaunchTemplate {
    LaunchTemplate {
        launch_template_id: Some("lt-0123456789abcdef0".to_string()),
        launch_template_name: Some(name.to_string()),
        default_version_number: Some(1),
        latest_version_number: Some(1),
        ..Default::default()
    }
}

#[async_trait]
impl Provider for RecordingProvider {
    async fn describe_launch_configurations(
        &self,
        names: &[String],
    ) -> Result<Vec<LaunchConfiguration>> {
        self.record(Call::DescribeLaunchConfigurations(names.to_vec()));
        Ok(self
            .configs
            .iter()
            .filter(|config| config.name().map_or(false, |n| names.iter().any(|m| m == n)))
            .cloned()
            .collect())
    }

    async fn get_instance_profile(&self, name: &str) -> Result<InstanceProfile> {
        self.record(Call::GetInstanceProfile(name.to_string()));
        match self.profiles.get(name) {
            Some(arn) => Ok(InstanceProfile {
                instance_profile_name: name.to_string(),
                arn: arn.clone(),
            }),
            None => Err(rejected(
                "GetInstanceProfile",
                "NoSuchEntity: Instance Profile cannot be found",
            )),
        }
    }

    async fn create_launch_template(
        &self,
        request: &CreateLaunchTemplateRequest,
    ) -> Result<LaunchTemplate> {
        self.record(Call::CreateLaunchTemplate(request.clone()));
        if self.fail_create {
            return Err(rejected(
                "CreateLaunchTemplate",
                "InvalidLaunchTemplateName.AlreadyExistsException",
            ));
        }
        Ok(template(&request.launch_template_name))
    }

    async fn delete_launch_template(
        &self,
        request: &DeleteLaunchTemplateRequest,
    ) -> Result<LaunchTemplate> {
        self.record(Call::DeleteLaunchTemplate(request.clone()));
        Ok(template("tmpl-1"))
    }

    async fn delete_launch_template_versions(
        &self,
        request: &DeleteLaunchTemplateVersionsRequest,
    ) -> Result<DeletedVersions> {
        self.record(Call::DeleteLaunchTemplateVersions(request.clone()));
        Ok(DeletedVersions {
            successfully_deleted: vec![DeletedVersion {
                launch_template_id: request.launch_template_id.clone(),
                launch_template_name: request.launch_template_name.clone(),
                version_number: Some(2),
            }],
            unsuccessfully_deleted: vec![],
        })
    }

    async fn update_auto_scaling_group(
        &self,
        request: &UpdateAutoScalingGroupRequest,
    ) -> Result<UpdateAutoScalingGroupResponse> {
        self.record(Call::UpdateAutoScalingGroup(request.clone()));
        Ok(UpdateAutoScalingGroupResponse {})
    }
}
