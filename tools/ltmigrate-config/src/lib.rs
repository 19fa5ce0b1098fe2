//! The config module owns the definition and loading process for our configuration sources.
use lazy_static::lazy_static;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use std::fs;
use std::path::{Path, PathBuf};

lazy_static! {
    /// Determine the default path to Migrate.toml at runtime.  This is an Option because it is
    /// possible (however unlikely) that `home_dir()` is unable to find the home directory of the
    /// current user
    pub static ref DEFAULT_CONFIG_PATH: Option<PathBuf> = home::home_dir().map(|home| home
        .join(".config")
        .join("ltmigrate")
        .join("Migrate.toml"));
}

/// Configuration shared by every ltmigrate subcommand
#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Eq, Clone)]
#[serde(deny_unknown_fields)]
pub struct MigrateConfig {
    // Config for talking to AWS
    pub aws: Option<AwsConfig>,

    // Log raw call arguments and provider responses at INFO
    pub verbose: Option<bool>,
}

impl MigrateConfig {
    /// Deserializes a MigrateConfig from a given path
    pub fn from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path).context(error::FileSnafu { path })?;
        toml::from_str(&config_str).context(error::InvalidTomlSnafu { path })
    }

    /// Deserializes a MigrateConfig from a given path, if it exists, otherwise builds a default
    /// config
    pub fn from_path_or_default<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        if path.as_ref().exists() {
            info!("Found migrate config at path: {}", path.as_ref().display());
            Self::from_path(path)
        } else {
            debug!(
                "No migrate config at {}, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    /// Loads the config from the given path, or from the default location if no path is given.
    /// An explicitly requested file must exist; the default location may be missing.
    pub fn load(maybe_path: Option<&Path>) -> Result<Self> {
        match (maybe_path, DEFAULT_CONFIG_PATH.as_ref()) {
            (Some(path), _) => Self::from_path(path),
            (None, Some(default_path)) => Self::from_path_or_default(default_path),
            (None, None) => Ok(Self::default()),
        }
    }
}

/// AWS-specific configuration
#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Eq, Clone)]
#[serde(deny_unknown_fields)]
pub struct AwsConfig {
    /// Region to send Auto Scaling, EC2 and IAM requests to
    pub region: Option<String>,
    /// Named profile from the shared AWS config files
    pub profile: Option<String>,
    /// Role to assume before making any request
    pub role: Option<String>,
    /// Region used to talk to STS when assuming `role`; defaults to `region`
    pub sts_region: Option<String>,
}

mod error {
    use snafu::Snafu;
    use std::io;
    use std::path::PathBuf;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)))]
    pub enum Error {
        #[snafu(display("Failed to read '{}': {}", path.display(), source))]
        File { path: PathBuf, source: io::Error },

        #[snafu(display("Invalid config file at '{}': {}", path.display(), source))]
        InvalidToml {
            path: PathBuf,
            source: toml::de::Error,
        },
    }
}
pub use error::Error;
pub type Result<T> = std::result::Result<T, error::Error>;

#[cfg(test)]
mod test {
    use super::{AwsConfig, MigrateConfig};
    use std::io::Write;

    #[test]
    fn parse_full_config() {
        let config: MigrateConfig = toml::from_str(
            r#"
            verbose = true

            [aws]
            region = "us-west-2"
            profile = "migration"
            role = "arn:aws:iam::123456789012:role/migrate"
            sts_region = "us-east-1"
            "#,
        )
        .unwrap();
        assert_eq!(
            config,
            MigrateConfig {
                aws: Some(AwsConfig {
                    region: Some("us-west-2".to_string()),
                    profile: Some("migration".to_string()),
                    role: Some("arn:aws:iam::123456789012:role/migrate".to_string()),
                    sts_region: Some("us-east-1".to_string()),
                }),
                verbose: Some(true),
            }
        );
    }

    #[test]
    fn parse_empty_config() {
        let config: MigrateConfig = toml::from_str("").unwrap();
        assert_eq!(config, MigrateConfig::default());
    }

    #[test]
    fn reject_unknown_fields() {
        assert!(toml::from_str::<MigrateConfig>("[aws]\nregions = [\"us-west-2\"]\n").is_err());
        assert!(toml::from_str::<MigrateConfig>("log_level = \"debug\"\n").is_err());
    }

    #[test]
    fn from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[aws]\nregion = \"eu-west-1\"").unwrap();
        let config = MigrateConfig::from_path(file.path()).unwrap();
        assert_eq!(
            config.aws.and_then(|aws| aws.region),
            Some("eu-west-1".to_string())
        );
    }

    #[test]
    fn from_path_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = MigrateConfig::from_path_or_default(dir.path().join("Migrate.toml")).unwrap();
        assert_eq!(config, MigrateConfig::default());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("Migrate.toml");
        assert!(MigrateConfig::load(Some(&missing)).is_err());
    }
}
