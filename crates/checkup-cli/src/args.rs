use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

use checkup_core::api::endpoint::DEFAULT_BASE_URL;
use checkup_core::rules::catalog::{FailOn, SeverityThreshold};
use checkup_core::workflow::StepConfig;

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Upload a build artifact to the Checks API and gate CI on the report"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload an artifact and wait for its report
    Upload(UploadArgs),
    /// Continue polling an upload recorded in a state file
    Resume(ResumeArgs),
}

#[derive(Debug, ClapArgs)]
pub struct UploadArgs {
    /// Cloud project billed for the API calls
    #[arg(long, env = "CHECKUP_PROJECT_ID")]
    pub project_id: String,

    #[arg(long, env = "CHECKUP_ACCOUNT_ID")]
    pub account_id: String,

    #[arg(long, env = "CHECKUP_APP_ID")]
    pub app_id: String,

    /// Path to the artifact to upload
    #[arg(long, env = "CHECKUP_BINARY_PATH")]
    pub binary_path: PathBuf,

    /// Id of the secret holding the bearer token
    #[arg(long, env = "CHECKUP_CREDENTIAL_ID")]
    pub credential_id: Option<String>,

    /// Only verify credentials by listing apps
    #[arg(long, env = "CHECKUP_NO_GENERATE_REPORT")]
    pub no_generate_report: bool,

    /// Return right after the upload
    #[arg(long, env = "CHECKUP_NO_WAIT")]
    pub no_wait: bool,

    #[arg(long, env = "CHECKUP_SEVERITY_THRESHOLD", default_value = "priority")]
    pub severity_threshold: ThresholdArg,

    #[arg(long, env = "CHECKUP_FAIL_ON", default_value = "none")]
    pub fail_on: FailOnArg,

    #[arg(long, env = "CHECKUP_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Persist poll state here so `resume` can pick the run up again
    #[arg(long, env = "CHECKUP_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, ClapArgs)]
pub struct ResumeArgs {
    #[arg(long, env = "CHECKUP_STATE_FILE")]
    pub state_file: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, ClapArgs)]
pub struct CommonArgs {
    /// Read secrets from files in this directory instead of the environment
    #[arg(long, env = "CHECKUP_SECRETS_DIR")]
    pub secrets_dir: Option<PathBuf>,

    /// Summary format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThresholdArg {
    Priority,
    Potential,
    Opportunity,
}

impl From<ThresholdArg> for SeverityThreshold {
    fn from(arg: ThresholdArg) -> Self {
        match arg {
            ThresholdArg::Priority => SeverityThreshold::Priority,
            ThresholdArg::Potential => SeverityThreshold::Potential,
            ThresholdArg::Opportunity => SeverityThreshold::Opportunity,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FailOnArg {
    None,
    All,
}

impl From<FailOnArg> for FailOn {
    fn from(arg: FailOnArg) -> Self {
        match arg {
            FailOnArg::None => FailOn::None,
            FailOnArg::All => FailOn::All,
        }
    }
}

impl UploadArgs {
    pub fn step_config(&self) -> StepConfig {
        let mut config = StepConfig::new(
            &self.project_id,
            &self.account_id,
            &self.app_id,
            &self.binary_path,
        );
        config.credential_id = self.credential_id.clone();
        config.generate_report = !self.no_generate_report;
        config.wait_for_report = !self.no_wait;
        config.severity_threshold = self.severity_threshold.into();
        config.fail_on = self.fail_on.into();
        config.base_url = self.base_url.clone();
        config
    }
}
