/*!
`ltmigrate` moves EC2 Auto Scaling groups from launch configurations to launch templates.

Currently implemented:
* describing an existing launch configuration
* converting a launch configuration into launch template data, referencing its instance profile
  by ARN
* creating a launch template from an existing launch configuration
* deleting a launch template, or specific versions of one
* pointing an Auto Scaling group at a launch template through a mixed instances policy

Configuration comes from:
* command-line parameters, to specify basic options and paths to JSON inputs
* Migrate.toml, for the AWS region, profile and role to use
* the `VERBOSE` environment variable; "1" logs call arguments and raw responses at INFO
*/

mod aws;
mod migrate;
mod model;
mod provider;
mod subcommand;

use aws::client::build_client_config;
use aws::AwsProvider;
use aws_types::region::Region;
use clap::{Parser, Subcommand};
use ltmigrate_config::MigrateConfig;
use migrate::{MigrationHelper, DIAGNOSTIC_TARGET};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode,
};
use snafu::ResultExt;
use std::path::PathBuf;
use std::{env, process};
use tokio::runtime::Runtime;

/// Environment variable that turns on verbose diagnostics.
const VERBOSE_ENV: &str = "VERBOSE";

fn run() -> Result<()> {
    // Parse and store the args passed to the program
    let args = Args::parse();

    let config = MigrateConfig::load(args.config_path.as_deref()).context(error::ConfigSnafu)?;
    let aws = config.aws.clone().unwrap_or_default();

    // Verbosity is decided once, here, and handed to both the logger and the helper.
    let verbose = args.verbose
        || verbose_from_env(env::var(VERBOSE_ENV).ok().as_deref())
        || config.verbose.unwrap_or(false);

    init_logger(args.log_level, verbose)?;

    // The command line overrides the configured region.
    let region = args
        .region
        .clone()
        .or_else(|| aws.region.clone())
        .map(Region::new);

    let rt = Runtime::new().context(error::RuntimeSnafu)?;
    rt.block_on(async {
        let client_config = build_client_config(region.as_ref(), &aws).await;
        let helper = MigrationHelper::new(AwsProvider::new(client_config), verbose);

        match args.subcommand {
            SubCommands::DescribeLaunchConfiguration(ref describe_args) => {
                subcommand::describe(&helper, describe_args)
                    .await
                    .context(error::DescribeSnafu)
            }
            SubCommands::FilterLaunchConfiguration(ref filter_args) => {
                subcommand::filter(&helper, filter_args)
                    .await
                    .context(error::FilterSnafu)
            }
            SubCommands::CreateLaunchTemplate(ref create_args) => {
                subcommand::create(&helper, create_args)
                    .await
                    .context(error::CreateSnafu)
            }
            SubCommands::DeleteLaunchTemplate(ref delete_args) => {
                subcommand::delete(&helper, delete_args)
                    .await
                    .context(error::DeleteSnafu)
            }
            SubCommands::UpdateAutoScalingGroup(ref update_args) => {
                subcommand::update(&helper, update_args)
                    .await
                    .context(error::UpdateSnafu)
            }
        }
    })
}

/// Log records go to stderr so stdout only carries JSON results.
fn init_logger(log_level: LevelFilter, verbose: bool) -> Result<()> {
    CombinedLogger::init(loggers(log_level, verbose)).context(error::LoggerSnafu)
}

fn loggers(log_level: LevelFilter, verbose: bool) -> Vec<Box<dyn SharedLogger>> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = match log_level {
        // To reduce verbosity of messages related to the AWS SDK for Rust we need to spin up two
        // loggers, setting different levels for each.
        LevelFilter::Info => vec![
            TermLogger::new(
                LevelFilter::Info,
                ConfigBuilder::new()
                    .add_filter_ignore_str("aws_config")
                    .add_filter_ignore_str("aws_credential_types")
                    .add_filter_ignore_str("aws_smithy")
                    .add_filter_ignore_str("tracing::span")
                    .add_filter_ignore_str(DIAGNOSTIC_TARGET)
                    .build(),
                TerminalMode::Stderr,
                ColorChoice::Auto,
            ),
            TermLogger::new(
                LevelFilter::Warn,
                ConfigBuilder::new()
                    .add_filter_allow_str("aws_config")
                    .add_filter_allow_str("aws_credential_types")
                    .add_filter_allow_str("aws_smithy")
                    .add_filter_allow_str("tracing::span")
                    .build(),
                TerminalMode::Stderr,
                ColorChoice::Auto,
            ),
        ],
        _ => vec![TermLogger::new(
            log_level,
            ConfigBuilder::new()
                .add_filter_ignore_str(DIAGNOSTIC_TARGET)
                .build(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        )],
    };

    // Diagnostics get their own logger so verbose output shows at any log level.
    if verbose {
        loggers.push(TermLogger::new(
            LevelFilter::Info,
            ConfigBuilder::new()
                .add_filter_allow_str(DIAGNOSTIC_TARGET)
                .build(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }
    loggers
}

/// Only "1" turns verbose diagnostics on; anything else, or nothing, leaves them off.
fn verbose_from_env(value: Option<&str>) -> bool {
    value == Some("1")
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        process::exit(1);
    }
}

/// Migrates Auto Scaling groups from launch configurations to launch templates
#[derive(Debug, Parser)]
pub struct Args {
    #[arg(global = true, long, default_value = "INFO")]
    /// How much detail to log; from least to most: ERROR, WARN, INFO, DEBUG, TRACE
    log_level: LevelFilter,

    #[arg(global = true, long)]
    /// Path to Migrate.toml; defaults to ~/.config/ltmigrate/Migrate.toml if present
    config_path: Option<PathBuf>,

    #[arg(global = true, long)]
    /// AWS region to use, overriding Migrate.toml
    region: Option<String>,

    #[arg(global = true, long)]
    /// Log call arguments and raw responses at INFO
    verbose: bool,

    #[command(subcommand)]
    subcommand: SubCommands,
}

#[derive(Debug, Subcommand)]
enum SubCommands {
    DescribeLaunchConfiguration(subcommand::DescribeArgs),
    FilterLaunchConfiguration(subcommand::FilterArgs),
    CreateLaunchTemplate(subcommand::CreateArgs),
    DeleteLaunchTemplate(subcommand::DeleteArgs),
    UpdateAutoScalingGroup(subcommand::UpdateArgs),
}

mod error {
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)))]
    pub(super) enum Error {
        #[snafu(display("Failed to load config: {}", source))]
        Config { source: ltmigrate_config::Error },

        #[snafu(display("Failed to create launch template: {}", source))]
        Create { source: crate::subcommand::Error },

        #[snafu(display("Failed to delete launch template: {}", source))]
        Delete { source: crate::subcommand::Error },

        #[snafu(display("Failed to describe launch configuration: {}", source))]
        Describe { source: crate::subcommand::Error },

        #[snafu(display("Failed to filter launch configuration: {}", source))]
        Filter { source: crate::subcommand::Error },

        #[snafu(display("Logger setup error: {}", source))]
        Logger { source: log::SetLoggerError },

        #[snafu(display("Failed to create async runtime: {}", source))]
        Runtime { source: std::io::Error },

        #[snafu(display("Failed to update auto scaling group: {}", source))]
        Update { source: crate::subcommand::Error },
    }
}
type Result<T> = std::result::Result<T, error::Error>;
