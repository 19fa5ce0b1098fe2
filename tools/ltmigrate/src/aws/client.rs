use aws_config::default_provider::credentials::DefaultCredentialsChain;
use aws_config::sts::AssumeRoleProvider;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_types::region::Region;
use aws_types::SdkConfig;
use log::debug;
use ltmigrate_config::AwsConfig;

/// Session name used when assuming the configured role.
const SESSION_NAME: &str = "ltmigrate";

/// Loads the SDK configuration every service client is built from.  If `region` is `None` the SDK's
/// own region chain (environment, profile, IMDS) decides.
///
/// If a role is configured, credentials come from assuming it, talking to STS in `sts_region` (or
/// `region` when unset).  This is needed because you may be assuming a role in an opt-in region
/// from an account that has not opted-in to that region.
pub(crate) async fn build_client_config(region: Option<&Region>, aws: &AwsConfig) -> SdkConfig {
    let base_provider = base_provider(&aws.profile, region).await;
    let sts_region = aws
        .sts_region
        .clone()
        .map(Region::new)
        .or_else(|| region.cloned());

    let provider = match &aws.role {
        None => base_provider,
        Some(role) => {
            debug!("Assuming role {}", role);
            let mut builder = AssumeRoleProvider::builder(role).session_name(SESSION_NAME);
            if let Some(sts_region) = sts_region {
                builder = builder.region(sts_region);
            }
            SharedCredentialsProvider::new(builder.build(base_provider))
        }
    };

    let mut loader = aws_config::from_env().credentials_provider(provider);
    if let Some(region) = region {
        loader = loader.region(region.clone());
    }
    loader.load().await
}

/// If the user specified a profile, use that, otherwise use the default credentials mechanisms.
async fn base_provider(
    maybe_profile: &Option<String>,
    region: Option<&Region>,
) -> SharedCredentialsProvider {
    let mut base_provider = DefaultCredentialsChain::builder();
    if let Some(profile) = maybe_profile {
        base_provider = base_provider.profile_name(profile);
    }
    if let Some(region) = region {
        base_provider = base_provider.region(region.clone());
    }
    SharedCredentialsProvider::new(base_provider.build().await)
}
