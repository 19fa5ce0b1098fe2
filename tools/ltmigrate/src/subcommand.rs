//! The subcommand module owns the arguments of each ltmigrate subcommand and turns them into
//! migration helper requests.  Results are written to stdout as JSON.

use crate::migrate::MigrationHelper;
use crate::model::{
    CreateFromConfigurationRequest, DeleteLaunchTemplateRequest,
    DeleteLaunchTemplateVersionsRequest, LaunchConfiguration, MixedInstancesPolicy,
    TagSpecification, UpdateAutoScalingGroupRequest,
};
use crate::provider::Provider;
use clap::{ArgGroup, Parser};
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;
use snafu::ResultExt;
use std::fs;
use std::path::{Path, PathBuf};

/// Prints an existing launch configuration
#[derive(Debug, Parser)]
pub(crate) struct DescribeArgs {
    /// Name of the launch configuration
    #[arg(long)]
    name: String,
}

/// Prints the launch template data a launch configuration document converts to
#[derive(Debug, Parser)]
pub(crate) struct FilterArgs {
    /// Path to a JSON launch configuration, e.g. saved from describe-launch-configuration
    #[arg(long)]
    input: PathBuf,
}

/// Creates a launch template from an existing launch configuration
#[derive(Debug, Parser)]
pub(crate) struct CreateArgs {
    /// Name of the launch configuration to copy
    #[arg(long)]
    launch_configuration_name: String,

    /// Name of the new launch template
    #[arg(long)]
    launch_template_name: String,

    /// Description of the template's first version
    #[arg(long)]
    description: Option<String>,

    /// Path to a JSON list of tag specifications to apply
    #[arg(long)]
    tag_specifications: Option<PathBuf>,
}

/// Deletes a launch template, or only some of its versions
#[derive(Debug, Parser)]
#[command(group(
    ArgGroup::new("template")
        .required(true)
        .args(["launch_template_id", "launch_template_name"])
))]
pub(crate) struct DeleteArgs {
    /// ID of the launch template
    #[arg(long)]
    launch_template_id: Option<String>,

    /// Name of the launch template
    #[arg(long)]
    launch_template_name: Option<String>,

    /// Comma-separated list of versions to delete instead of the whole template
    #[arg(long, value_delimiter = ',')]
    versions: Vec<String>,

    /// Check permissions without deleting anything
    #[arg(long)]
    dry_run: bool,
}

/// Sets the mixed instances policy of an Auto Scaling group
#[derive(Debug, Parser)]
pub(crate) struct UpdateArgs {
    /// Name of the Auto Scaling group
    #[arg(long)]
    auto_scaling_group_name: String,

    /// Path to a JSON mixed instances policy
    #[arg(long)]
    mixed_instances_policy: PathBuf,
}

pub(crate) async fn describe<P>(helper: &MigrationHelper<P>, args: &DescribeArgs) -> Result<()>
where
    P: Provider + Send + Sync,
{
    let config = helper
        .describe_launch_configuration(&args.name)
        .await
        .context(error::MigrateSnafu)?;
    write_json(&config)
}

pub(crate) async fn filter<P>(helper: &MigrationHelper<P>, args: &FilterArgs) -> Result<()>
where
    P: Provider + Send + Sync,
{
    let config: LaunchConfiguration = read_json(&args.input)?;
    let data = helper
        .filter_launch_configuration(&config)
        .await
        .context(error::MigrateSnafu)?;
    write_json(&data)
}

pub(crate) async fn create<P>(helper: &MigrationHelper<P>, args: &CreateArgs) -> Result<()>
where
    P: Provider + Send + Sync,
{
    let tag_specifications: Vec<TagSpecification> = match &args.tag_specifications {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };
    let request = CreateFromConfigurationRequest {
        launch_configuration_name: args.launch_configuration_name.clone(),
        launch_template_name: args.launch_template_name.clone(),
        description: args.description.clone(),
        tag_specifications,
    };

    let template = helper
        .create_launch_template_from_configuration(&request)
        .await
        .context(error::MigrateSnafu)?;
    info!(
        "Created launch template '{}' from '{}'",
        args.launch_template_name, args.launch_configuration_name
    );
    write_json(&template)
}

pub(crate) async fn delete<P>(helper: &MigrationHelper<P>, args: &DeleteArgs) -> Result<()>
where
    P: Provider + Send + Sync,
{
    // The provider omits DryRun when it's unset, so only send it when asked.
    let dry_run = args.dry_run.then_some(true);

    if args.versions.is_empty() {
        let request = DeleteLaunchTemplateRequest {
            launch_template_id: args.launch_template_id.clone(),
            launch_template_name: args.launch_template_name.clone(),
            dry_run,
        };
        let template = helper
            .delete_launch_template(&request)
            .await
            .context(error::MigrateSnafu)?;
        write_json(&template)
    } else {
        let request = DeleteLaunchTemplateVersionsRequest {
            launch_template_id: args.launch_template_id.clone(),
            launch_template_name: args.launch_template_name.clone(),
            versions: args.versions.clone(),
            dry_run,
        };
        let deleted = helper
            .delete_launch_template_versions(&request)
            .await
            .context(error::MigrateSnafu)?;
        write_json(&deleted)
    }
}

pub(crate) async fn update<P>(helper: &MigrationHelper<P>, args: &UpdateArgs) -> Result<()>
where
    P: Provider + Send + Sync,
{
    let mixed_instances_policy: MixedInstancesPolicy = read_json(&args.mixed_instances_policy)?;
    let request = UpdateAutoScalingGroupRequest {
        auto_scaling_group_name: args.auto_scaling_group_name.clone(),
        mixed_instances_policy,
    };
    let response = helper
        .update_auto_scaling_group(&request)
        .await
        .context(error::MigrateSnafu)?;
    info!(
        "Updated mixed instances policy of '{}'",
        args.auto_scaling_group_name
    );
    write_json(&response)
}

/// Deserializes a JSON document from the given path.
fn read_json<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let input = fs::read_to_string(path).context(error::ReadInputSnafu { path })?;
    serde_json::from_str(&input).context(error::ParseInputSnafu { path })
}

fn write_json<T: Serialize>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value).context(error::SerializeSnafu)?;
    println!("{}", output);
    Ok(())
}

mod error {
    use snafu::Snafu;
    use std::io;
    use std::path::PathBuf;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)))]
    pub(crate) enum Error {
        #[snafu(display("{}", source))]
        Migrate { source: crate::migrate::Error },

        #[snafu(display("Invalid JSON in '{}': {}", path.display(), source))]
        ParseInput {
            path: PathBuf,
            source: serde_json::Error,
        },

        #[snafu(display("Failed to read '{}': {}", path.display(), source))]
        ReadInput { path: PathBuf, source: io::Error },

        #[snafu(display("Failed to serialize output: {}", source))]
        Serialize { source: serde_json::Error },
    }
}
pub(crate) use error::Error;
type Result<T> = std::result::Result<T, error::Error>;

#[cfg(test)]
mod test {
    use super::{delete, read_json, DeleteArgs, Error};
    use crate::migrate::MigrationHelper;
    use crate::model::{
        DeleteLaunchTemplateRequest, DeleteLaunchTemplateVersionsRequest, MixedInstancesPolicy,
        TagSpecification,
    };
    use crate::provider::recording::{Call, RecordingProvider};
    use std::io::Write;

    fn delete_args(versions: &[&str], dry_run: bool) -> DeleteArgs {
        DeleteArgs {
            launch_template_id: None,
            launch_template_name: Some("tmpl-1".to_string()),
            versions: versions.iter().map(|v| v.to_string()).collect(),
            dry_run,
        }
    }

    async fn delete_calls(args: &DeleteArgs) -> Vec<Call> {
        let helper = MigrationHelper::new(RecordingProvider::default(), false);
        delete(&helper, args).await.unwrap();
        helper.provider().calls()
    }

    #[tokio::test]
    async fn delete_without_versions_deletes_template() {
        assert_eq!(
            delete_calls(&delete_args(&[], false)).await,
            vec![Call::DeleteLaunchTemplate(DeleteLaunchTemplateRequest {
                launch_template_id: None,
                launch_template_name: Some("tmpl-1".to_string()),
                dry_run: None,
            })]
        );
    }

    #[tokio::test]
    async fn delete_with_versions_deletes_only_those() {
        assert_eq!(
            delete_calls(&delete_args(&["2", "3"], false)).await,
            vec![Call::DeleteLaunchTemplateVersions(
                DeleteLaunchTemplateVersionsRequest {
                    launch_template_id: None,
                    launch_template_name: Some("tmpl-1".to_string()),
                    versions: vec!["2".to_string(), "3".to_string()],
                    dry_run: None,
                }
            )]
        );
    }

    #[tokio::test]
    async fn delete_sends_dry_run_only_when_asked() {
        let calls = delete_calls(&delete_args(&[], true)).await;
        assert!(matches!(
            calls.as_slice(),
            [Call::DeleteLaunchTemplate(DeleteLaunchTemplateRequest {
                dry_run: Some(true),
                ..
            })]
        ));

        let calls = delete_calls(&delete_args(&["2"], true)).await;
        assert!(matches!(
            calls.as_slice(),
            [Call::DeleteLaunchTemplateVersions(DeleteLaunchTemplateVersionsRequest {
                dry_run: Some(true),
                ..
            })]
        ));
    }

    fn json_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn read_tag_specifications() {
        let file = json_file(
            r#"[{"ResourceType": "launch-template", "Tags": [{"Key": "team", "Value": "platform"}]}]"#,
        );
        let specs: Vec<TagSpecification> = read_json(file.path()).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].resource_type, "launch-template");
        assert_eq!(specs[0].tags[0].key, "team");
    }

    #[test]
    fn read_mixed_instances_policy() {
        let file = json_file(
            r#"{
              "LaunchTemplate": {
                "LaunchTemplateSpecification": {"LaunchTemplateId": "lt-abcdef1234567890", "Version": "1"},
                "Overrides": [{"InstanceType": "t3.medium"}, {"InstanceType": "t3a.medium"}]
              },
              "InstancesDistribution": {"OnDemandBaseCapacity": 1, "OnDemandPercentageAboveBaseCapacity": 50}
            }"#,
        );
        let policy: MixedInstancesPolicy = read_json(file.path()).unwrap();
        assert_eq!(
            policy
                .instances_distribution
                .and_then(|d| d.on_demand_percentage_above_base_capacity),
            Some(50)
        );
    }

    #[test]
    fn read_invalid_json() {
        let file = json_file("{not json");
        let result = read_json::<MixedInstancesPolicy, _>(file.path());
        assert!(matches!(result, Err(Error::ParseInput { .. })));
    }

    #[test]
    fn read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_json::<MixedInstancesPolicy, _>(dir.path().join("policy.json"));
        assert!(matches!(result, Err(Error::ReadInput { .. })));
    }
}
